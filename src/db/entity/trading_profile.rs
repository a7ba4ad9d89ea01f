use sea_orm::entity::prelude::*;
use serde::{ Deserialize, Serialize };

/// Per-user trading configuration. `cash_balance` (EUR) is the single
/// source of truth for spendable funds and is mutated only by the trade
/// executor.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "trading_profiles")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub user_id: String,
    pub horizon: String, // "short", "medium", "long"
    pub risk_tolerance: String, // "conservative", "moderate", "aggressive"
    pub trading_style: String, // "value", "growth", "momentum", "balanced"
    pub target_profit_pct: Decimal,
    pub max_loss_pct: Decimal,
    /// Preferred sectors as a JSON array of names; empty means no filter.
    #[sea_orm(column_type = "JsonBinary")]
    pub preferred_sectors: Json,
    /// Days before a dismissed suggestion may be regenerated (0 = always).
    pub resuggest_dismissed_after_days: i32,
    pub cash_balance: Decimal,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
