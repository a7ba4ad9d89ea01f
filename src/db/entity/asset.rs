use sea_orm::entity::prelude::*;
use serde::{ Deserialize, Serialize };

/// Cached quote row for a monitored asset. Refreshed best-effort by the
/// market data feed; executors must re-fetch a live quote before moving
/// money (a stale row here is tolerated everywhere else).
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "assets")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub symbol: String,
    pub name: String,
    /// ISO code of the currency the asset is quoted in at its exchange.
    pub currency: String,
    pub sector: Option<String>,
    pub current_price: Option<Decimal>,
    pub previous_close: Option<Decimal>,
    pub change_percent: Option<Decimal>,
    pub volume: Option<Decimal>,
    pub quoted_at: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
