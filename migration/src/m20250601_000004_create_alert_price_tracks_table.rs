use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.create_table(
            Table::create()
                .table(AlertPriceTracks::Table)
                .if_not_exists()
                .col(ColumnDef::new(AlertPriceTracks::Id).uuid().not_null().primary_key())
                .col(ColumnDef::new(AlertPriceTracks::AlertId).uuid().not_null())
                .col(ColumnDef::new(AlertPriceTracks::Price).decimal().not_null())
                .col(ColumnDef::new(AlertPriceTracks::Threshold).decimal().not_null())
                .col(
                    ColumnDef::new(AlertPriceTracks::RecordedAt)
                        .timestamp_with_time_zone()
                        .not_null()
                )
                .to_owned()
        ).await?;

        manager.create_index(
            Index::create()
                .if_not_exists()
                .name("idx_alert_price_tracks_alert_id_recorded_at")
                .table(AlertPriceTracks::Table)
                .col(AlertPriceTracks::AlertId)
                .col(AlertPriceTracks::RecordedAt)
                .to_owned()
        ).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(AlertPriceTracks::Table).to_owned()).await
    }
}

#[derive(Iden)]
enum AlertPriceTracks {
    Table,
    Id,
    AlertId,
    Price,
    Threshold,
    RecordedAt,
}
