use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.create_table(
            Table::create()
                .table(TradingSignals::Table)
                .if_not_exists()
                .col(ColumnDef::new(TradingSignals::Id).uuid().not_null().primary_key())
                .col(ColumnDef::new(TradingSignals::TradingAssetId).uuid().not_null())
                .col(ColumnDef::new(TradingSignals::Action).string().not_null())
                .col(ColumnDef::new(TradingSignals::Confidence).string().not_null())
                .col(ColumnDef::new(TradingSignals::Reason).text().not_null())
                .col(ColumnDef::new(TradingSignals::PriceAtSignal).decimal().not_null())
                .col(ColumnDef::new(TradingSignals::Criteria).json_binary().not_null())
                .col(ColumnDef::new(TradingSignals::Notified).boolean().not_null().default(false))
                .col(ColumnDef::new(TradingSignals::Executed).boolean().not_null().default(false))
                .col(
                    ColumnDef::new(TradingSignals::CreatedAt)
                        .timestamp_with_time_zone()
                        .not_null()
                )
                .to_owned()
        ).await?;

        // The 4-hour dedup query filters on (trading_asset_id, action, created_at).
        manager.create_index(
            Index::create()
                .if_not_exists()
                .name("idx_trading_signals_asset_action_created_at")
                .table(TradingSignals::Table)
                .col(TradingSignals::TradingAssetId)
                .col(TradingSignals::Action)
                .col(TradingSignals::CreatedAt)
                .to_owned()
        ).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(TradingSignals::Table).to_owned()).await
    }
}

#[derive(Iden)]
enum TradingSignals {
    Table,
    Id,
    TradingAssetId,
    Action,
    Confidence,
    Reason,
    PriceAtSignal,
    Criteria,
    Notified,
    Executed,
    CreatedAt,
}
