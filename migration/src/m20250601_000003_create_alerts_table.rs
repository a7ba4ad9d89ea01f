use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.create_table(
            Table::create()
                .table(Alerts::Table)
                .if_not_exists()
                .col(ColumnDef::new(Alerts::Id).uuid().not_null().primary_key())
                .col(ColumnDef::new(Alerts::UserId).string().not_null())
                .col(ColumnDef::new(Alerts::AssetId).uuid().not_null())
                .col(ColumnDef::new(Alerts::Kind).string().not_null())
                .col(ColumnDef::new(Alerts::Threshold).decimal().not_null())
                .col(ColumnDef::new(Alerts::Status).string().not_null().default("active"))
                .col(ColumnDef::new(Alerts::Channels).json_binary().not_null())
                .col(ColumnDef::new(Alerts::IsTracking).boolean().not_null().default(false))
                .col(ColumnDef::new(Alerts::TrackingStartedAt).timestamp_with_time_zone())
                .col(ColumnDef::new(Alerts::LastTriggeredAt).timestamp_with_time_zone())
                .col(ColumnDef::new(Alerts::TriggerCount).integer().not_null().default(0))
                .col(ColumnDef::new(Alerts::CreatedAt).timestamp_with_time_zone().not_null())
                .col(ColumnDef::new(Alerts::UpdatedAt).timestamp_with_time_zone().not_null())
                .to_owned()
        ).await?;

        manager.create_index(
            Index::create()
                .if_not_exists()
                .name("idx_alerts_user_id")
                .table(Alerts::Table)
                .col(Alerts::UserId)
                .to_owned()
        ).await?;

        manager.create_index(
            Index::create()
                .if_not_exists()
                .name("idx_alerts_status")
                .table(Alerts::Table)
                .col(Alerts::Status)
                .to_owned()
        ).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Alerts::Table).to_owned()).await
    }
}

#[derive(Iden)]
enum Alerts {
    Table,
    Id,
    UserId,
    AssetId,
    Kind,
    Threshold,
    Status,
    Channels,
    IsTracking,
    TrackingStartedAt,
    LastTriggeredAt,
    TriggerCount,
    CreatedAt,
    UpdatedAt,
}
