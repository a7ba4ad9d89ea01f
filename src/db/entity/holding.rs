use sea_orm::entity::prelude::*;
use serde::{ Deserialize, Serialize };

/// A position in a portfolio. When linked to a trading asset,
/// `avg_buy_price` is the quantity-weighted average across all BUY
/// executions and is recomputed, never overwritten, on each additional buy.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "holdings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub portfolio_id: Uuid,
    pub asset_id: Uuid,
    pub quantity: Decimal,
    pub avg_buy_price: Decimal,
    pub trading_asset_id: Option<Uuid>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
