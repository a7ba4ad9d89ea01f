use sea_orm::entity::prelude::*;
use serde::{ Deserialize, Serialize };

/// One row per trigger event (IDLE→TRACKING transition), never per pass.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "alert_history")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub alert_id: Uuid,
    pub price_at_trigger: Decimal,
    #[sea_orm(column_type = "Text")]
    pub message: String,
    pub notified: bool,
    pub triggered_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
