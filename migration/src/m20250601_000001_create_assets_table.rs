use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.create_table(
            Table::create()
                .table(Assets::Table)
                .if_not_exists()
                .col(ColumnDef::new(Assets::Id).uuid().not_null().primary_key())
                .col(ColumnDef::new(Assets::Symbol).string().not_null().unique_key())
                .col(ColumnDef::new(Assets::Name).string().not_null())
                .col(ColumnDef::new(Assets::Currency).string().not_null())
                .col(ColumnDef::new(Assets::Sector).string())
                .col(ColumnDef::new(Assets::CurrentPrice).decimal())
                .col(ColumnDef::new(Assets::PreviousClose).decimal())
                .col(ColumnDef::new(Assets::ChangePercent).decimal())
                .col(ColumnDef::new(Assets::Volume).decimal())
                .col(ColumnDef::new(Assets::QuotedAt).timestamp_with_time_zone())
                .col(ColumnDef::new(Assets::CreatedAt).timestamp_with_time_zone().not_null())
                .col(ColumnDef::new(Assets::UpdatedAt).timestamp_with_time_zone().not_null())
                .to_owned()
        ).await?;

        manager.create_index(
            Index::create()
                .if_not_exists()
                .name("idx_assets_symbol")
                .table(Assets::Table)
                .col(Assets::Symbol)
                .to_owned()
        ).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Assets::Table).to_owned()).await
    }
}

#[derive(Iden)]
enum Assets {
    Table,
    Id,
    Symbol,
    Name,
    Currency,
    Sector,
    CurrentPrice,
    PreviousClose,
    ChangePercent,
    Volume,
    QuotedAt,
    CreatedAt,
    UpdatedAt,
}
