pub mod config;
pub mod enums;
pub mod error;
pub mod money;
pub mod db;
pub mod services;
pub mod api;
pub mod alert_checker;
pub mod scheduler;

pub use config::Config;
pub use enums::{
    AlertKind,
    AlertStatus,
    AssetStatus,
    Confidence,
    Horizon,
    MoverCategory,
    NotificationChannel,
    RiskTolerance,
    SignalAction,
    SuggestionStatus,
    TradingStyle,
};
pub use error::{ AppError, Result };
pub use money::{ FxRates, Money };
