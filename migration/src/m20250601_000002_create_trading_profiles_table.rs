use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.create_table(
            Table::create()
                .table(TradingProfiles::Table)
                .if_not_exists()
                .col(ColumnDef::new(TradingProfiles::Id).uuid().not_null().primary_key())
                .col(ColumnDef::new(TradingProfiles::UserId).string().not_null().unique_key())
                .col(ColumnDef::new(TradingProfiles::Horizon).string().not_null())
                .col(ColumnDef::new(TradingProfiles::RiskTolerance).string().not_null())
                .col(ColumnDef::new(TradingProfiles::TradingStyle).string().not_null())
                .col(ColumnDef::new(TradingProfiles::TargetProfitPct).decimal().not_null())
                .col(ColumnDef::new(TradingProfiles::MaxLossPct).decimal().not_null())
                .col(ColumnDef::new(TradingProfiles::PreferredSectors).json_binary().not_null())
                .col(
                    ColumnDef::new(TradingProfiles::ResuggestDismissedAfterDays)
                        .integer()
                        .not_null()
                        .default(7)
                )
                .col(ColumnDef::new(TradingProfiles::CashBalance).decimal().not_null())
                .col(ColumnDef::new(TradingProfiles::CreatedAt).timestamp_with_time_zone().not_null())
                .col(ColumnDef::new(TradingProfiles::UpdatedAt).timestamp_with_time_zone().not_null())
                .to_owned()
        ).await?;

        manager.create_index(
            Index::create()
                .if_not_exists()
                .name("idx_trading_profiles_user_id")
                .table(TradingProfiles::Table)
                .col(TradingProfiles::UserId)
                .to_owned()
        ).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(TradingProfiles::Table).to_owned()).await
    }
}

#[derive(Iden)]
enum TradingProfiles {
    Table,
    Id,
    UserId,
    Horizon,
    RiskTolerance,
    TradingStyle,
    TargetProfitPct,
    MaxLossPct,
    PreferredSectors,
    ResuggestDismissedAfterDays,
    CashBalance,
    CreatedAt,
    UpdatedAt,
}
