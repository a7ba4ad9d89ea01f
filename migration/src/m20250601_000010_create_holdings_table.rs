use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.create_table(
            Table::create()
                .table(Holdings::Table)
                .if_not_exists()
                .col(ColumnDef::new(Holdings::Id).uuid().not_null().primary_key())
                .col(ColumnDef::new(Holdings::PortfolioId).uuid().not_null())
                .col(ColumnDef::new(Holdings::AssetId).uuid().not_null())
                .col(ColumnDef::new(Holdings::Quantity).decimal().not_null())
                .col(ColumnDef::new(Holdings::AvgBuyPrice).decimal().not_null())
                .col(ColumnDef::new(Holdings::TradingAssetId).uuid())
                .col(ColumnDef::new(Holdings::CreatedAt).timestamp_with_time_zone().not_null())
                .col(ColumnDef::new(Holdings::UpdatedAt).timestamp_with_time_zone().not_null())
                .to_owned()
        ).await?;

        manager.create_index(
            Index::create()
                .if_not_exists()
                .name("idx_holdings_portfolio_id_asset_id")
                .table(Holdings::Table)
                .col(Holdings::PortfolioId)
                .col(Holdings::AssetId)
                .to_owned()
        ).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Holdings::Table).to_owned()).await
    }
}

#[derive(Iden)]
enum Holdings {
    Table,
    Id,
    PortfolioId,
    AssetId,
    Quantity,
    AvgBuyPrice,
    TradingAssetId,
    CreatedAt,
    UpdatedAt,
}
