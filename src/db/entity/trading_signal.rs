use sea_orm::entity::prelude::*;
use serde::{ Deserialize, Serialize };

/// Immutable record of one engine decision. At most one row per
/// `(trading_asset_id, action)` within any rolling 4-hour window.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "trading_signals")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub trading_asset_id: Uuid,
    pub action: String, // "BUY", "SELL", "HOLD"
    pub confidence: String, // "low", "medium", "high"
    #[sea_orm(column_type = "Text")]
    pub reason: String,
    pub price_at_signal: Decimal,
    /// Snapshot of the indicator inputs the decision was scored from.
    #[sea_orm(column_type = "JsonBinary")]
    pub criteria: Json,
    pub notified: bool,
    pub executed: bool,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
