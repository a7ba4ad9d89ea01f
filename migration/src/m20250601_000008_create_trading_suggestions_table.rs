use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.create_table(
            Table::create()
                .table(TradingSuggestions::Table)
                .if_not_exists()
                .col(ColumnDef::new(TradingSuggestions::Id).uuid().not_null().primary_key())
                .col(ColumnDef::new(TradingSuggestions::ProfileId).uuid().not_null())
                .col(ColumnDef::new(TradingSuggestions::AssetId).uuid().not_null())
                .col(ColumnDef::new(TradingSuggestions::Status).string().not_null().default("pending"))
                .col(ColumnDef::new(TradingSuggestions::Reason).text().not_null())
                .col(ColumnDef::new(TradingSuggestions::Confidence).string().not_null())
                .col(ColumnDef::new(TradingSuggestions::RiskLevel).string().not_null())
                .col(ColumnDef::new(TradingSuggestions::ExpectedProfitPct).decimal().not_null())
                .col(ColumnDef::new(TradingSuggestions::Criteria).json_binary().not_null())
                .col(ColumnDef::new(TradingSuggestions::RespondedAt).timestamp_with_time_zone())
                .col(
                    ColumnDef::new(TradingSuggestions::CreatedAt)
                        .timestamp_with_time_zone()
                        .not_null()
                )
                .to_owned()
        ).await?;

        manager.create_index(
            Index::create()
                .if_not_exists()
                .name("idx_trading_suggestions_profile_id_status")
                .table(TradingSuggestions::Table)
                .col(TradingSuggestions::ProfileId)
                .col(TradingSuggestions::Status)
                .to_owned()
        ).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(TradingSuggestions::Table).to_owned()).await
    }
}

#[derive(Iden)]
enum TradingSuggestions {
    Table,
    Id,
    ProfileId,
    AssetId,
    Status,
    Reason,
    Confidence,
    RiskLevel,
    ExpectedProfitPct,
    Criteria,
    RespondedAt,
    CreatedAt,
}
