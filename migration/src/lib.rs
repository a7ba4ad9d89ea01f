pub use sea_orm_migration::prelude::*;

mod m20250601_000001_create_assets_table;
mod m20250601_000002_create_trading_profiles_table;
mod m20250601_000003_create_alerts_table;
mod m20250601_000004_create_alert_price_tracks_table;
mod m20250601_000005_create_alert_history_table;
mod m20250601_000006_create_trading_assets_table;
mod m20250601_000007_create_trading_signals_table;
mod m20250601_000008_create_trading_suggestions_table;
mod m20250601_000009_create_portfolios_table;
mod m20250601_000010_create_holdings_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250601_000001_create_assets_table::Migration),
            Box::new(m20250601_000002_create_trading_profiles_table::Migration),
            Box::new(m20250601_000003_create_alerts_table::Migration),
            Box::new(m20250601_000004_create_alert_price_tracks_table::Migration),
            Box::new(m20250601_000005_create_alert_history_table::Migration),
            Box::new(m20250601_000006_create_trading_assets_table::Migration),
            Box::new(m20250601_000007_create_trading_signals_table::Migration),
            Box::new(m20250601_000008_create_trading_suggestions_table::Migration),
            Box::new(m20250601_000009_create_portfolios_table::Migration),
            Box::new(m20250601_000010_create_holdings_table::Migration)
        ]
    }
}
