use sea_orm::entity::prelude::*;
use serde::{ Deserialize, Serialize };

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "trading_suggestions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub profile_id: Uuid,
    pub asset_id: Uuid,
    pub status: String, // "pending", "accepted", "dismissed"
    #[sea_orm(column_type = "Text")]
    pub reason: String,
    pub confidence: String,
    pub risk_level: String,
    pub expected_profit_pct: Decimal,
    /// Categories and score terms that produced this suggestion.
    #[sea_orm(column_type = "JsonBinary")]
    pub criteria: Json,
    pub responded_at: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
