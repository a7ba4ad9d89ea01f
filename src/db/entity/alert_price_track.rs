use sea_orm::entity::prelude::*;
use serde::{ Deserialize, Serialize };

/// Append-only price sample written once per evaluation pass while an
/// alert is tracking. Readers take the most recent 500 rows.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "alert_price_tracks")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub alert_id: Uuid,
    pub price: Decimal,
    pub threshold: Decimal,
    pub recorded_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
