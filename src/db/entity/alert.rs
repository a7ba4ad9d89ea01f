use sea_orm::entity::prelude::*;
use serde::{ Deserialize, Serialize };

/// A user-defined alert. `threshold` is always denominated in EUR,
/// whatever currency the asset itself is quoted in. `is_tracking = true`
/// implies `status = "active"`.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "alerts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: String,
    pub asset_id: Uuid,
    pub kind: String, // "price_above", "price_below", "percent_change", "volume_spike"
    pub threshold: Decimal,
    pub status: String, // "active", "paused", "expired", "triggered"
    /// Notification channels as a JSON array of channel names.
    #[sea_orm(column_type = "JsonBinary")]
    pub channels: Json,
    pub is_tracking: bool,
    pub tracking_started_at: Option<DateTimeUtc>,
    pub last_triggered_at: Option<DateTimeUtc>,
    pub trigger_count: i32,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
