use sea_orm::entity::prelude::*;
use serde::{ Deserialize, Serialize };

/// An asset a profile is tracking through the watching → bought → sold
/// lifecycle. Entry fields are set iff bought, exit fields iff sold;
/// target/stop are EUR thresholds derived from the profile's percentages.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "trading_assets")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub profile_id: Uuid,
    pub asset_id: Uuid,
    pub status: String, // "watching", "bought", "sold"
    pub entry_price: Option<Decimal>,
    pub entry_price_native: Option<Decimal>,
    pub entry_date: Option<DateTimeUtc>,
    pub quantity: Option<Decimal>,
    pub target_price: Decimal,
    pub stop_loss_price: Decimal,
    pub exit_price: Option<Decimal>,
    pub exit_date: Option<DateTimeUtc>,
    pub realized_profit_pct: Option<Decimal>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
