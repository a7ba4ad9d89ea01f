use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.create_table(
            Table::create()
                .table(TradingAssets::Table)
                .if_not_exists()
                .col(ColumnDef::new(TradingAssets::Id).uuid().not_null().primary_key())
                .col(ColumnDef::new(TradingAssets::ProfileId).uuid().not_null())
                .col(ColumnDef::new(TradingAssets::AssetId).uuid().not_null())
                .col(ColumnDef::new(TradingAssets::Status).string().not_null().default("watching"))
                .col(ColumnDef::new(TradingAssets::EntryPrice).decimal())
                .col(ColumnDef::new(TradingAssets::EntryPriceNative).decimal())
                .col(ColumnDef::new(TradingAssets::EntryDate).timestamp_with_time_zone())
                .col(ColumnDef::new(TradingAssets::Quantity).decimal())
                .col(ColumnDef::new(TradingAssets::TargetPrice).decimal().not_null())
                .col(ColumnDef::new(TradingAssets::StopLossPrice).decimal().not_null())
                .col(ColumnDef::new(TradingAssets::ExitPrice).decimal())
                .col(ColumnDef::new(TradingAssets::ExitDate).timestamp_with_time_zone())
                .col(ColumnDef::new(TradingAssets::RealizedProfitPct).decimal())
                .col(ColumnDef::new(TradingAssets::CreatedAt).timestamp_with_time_zone().not_null())
                .col(ColumnDef::new(TradingAssets::UpdatedAt).timestamp_with_time_zone().not_null())
                .to_owned()
        ).await?;

        manager.create_index(
            Index::create()
                .if_not_exists()
                .name("idx_trading_assets_profile_id")
                .table(TradingAssets::Table)
                .col(TradingAssets::ProfileId)
                .to_owned()
        ).await?;

        manager.create_index(
            Index::create()
                .if_not_exists()
                .name("idx_trading_assets_status")
                .table(TradingAssets::Table)
                .col(TradingAssets::Status)
                .to_owned()
        ).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(TradingAssets::Table).to_owned()).await
    }
}

#[derive(Iden)]
enum TradingAssets {
    Table,
    Id,
    ProfileId,
    AssetId,
    Status,
    EntryPrice,
    EntryPriceNative,
    EntryDate,
    Quantity,
    TargetPrice,
    StopLossPrice,
    ExitPrice,
    ExitDate,
    RealizedProfitPct,
    CreatedAt,
    UpdatedAt,
}
