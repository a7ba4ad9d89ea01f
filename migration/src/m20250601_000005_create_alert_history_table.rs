use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.create_table(
            Table::create()
                .table(AlertHistory::Table)
                .if_not_exists()
                .col(ColumnDef::new(AlertHistory::Id).uuid().not_null().primary_key())
                .col(ColumnDef::new(AlertHistory::AlertId).uuid().not_null())
                .col(ColumnDef::new(AlertHistory::PriceAtTrigger).decimal().not_null())
                .col(ColumnDef::new(AlertHistory::Message).text().not_null())
                .col(ColumnDef::new(AlertHistory::Notified).boolean().not_null().default(false))
                .col(
                    ColumnDef::new(AlertHistory::TriggeredAt)
                        .timestamp_with_time_zone()
                        .not_null()
                )
                .to_owned()
        ).await?;

        manager.create_index(
            Index::create()
                .if_not_exists()
                .name("idx_alert_history_alert_id")
                .table(AlertHistory::Table)
                .col(AlertHistory::AlertId)
                .to_owned()
        ).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(AlertHistory::Table).to_owned()).await
    }
}

#[derive(Iden)]
enum AlertHistory {
    Table,
    Id,
    AlertId,
    PriceAtTrigger,
    Message,
    Notified,
    TriggeredAt,
}
