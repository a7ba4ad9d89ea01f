pub mod asset;
pub mod alert;
pub mod alert_price_track;
pub mod alert_history;
pub mod trading_profile;
pub mod trading_asset;
pub mod trading_signal;
pub mod trading_suggestion;
pub mod portfolio;
pub mod holding;

pub use asset::Entity as Asset;
pub use alert::Entity as Alert;
pub use alert_price_track::Entity as AlertPriceTrack;
pub use alert_history::Entity as AlertHistory;
pub use trading_profile::Entity as TradingProfile;
pub use trading_asset::Entity as TradingAsset;
pub use trading_signal::Entity as TradingSignal;
pub use trading_suggestion::Entity as TradingSuggestion;
pub use portfolio::Entity as Portfolio;
pub use holding::Entity as Holding;
