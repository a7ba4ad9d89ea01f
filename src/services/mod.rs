pub mod alert_service;
pub mod asset_service;
pub mod fx_service;
pub mod indicator_service;
pub mod market_data_service;
pub mod notification_service;
pub mod portfolio_service;
pub mod profile_service;
pub mod signal_engine;
pub mod signal_service;
pub mod suggestion_service;
pub mod trade_service;

pub use alert_service::AlertService;
pub use asset_service::AssetService;
pub use fx_service::FxService;
pub use indicator_service::IndicatorService;
pub use market_data_service::MarketDataService;
pub use notification_service::NotificationService;
pub use portfolio_service::PortfolioService;
pub use profile_service::ProfileService;
pub use signal_service::SignalService;
pub use suggestion_service::SuggestionService;
pub use trade_service::TradeService;
