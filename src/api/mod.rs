use std::sync::Arc;

pub mod alert;
pub mod suggestion;
pub mod trading;

use crate::alert_checker::AlertChecker;
use crate::services::{
    AlertService,
    AssetService,
    PortfolioService,
    ProfileService,
    SignalService,
    SuggestionService,
    TradeService,
};

#[derive(Clone)]
pub struct AppState {
    pub alert_service: Arc<AlertService>,
    pub asset_service: Arc<AssetService>,
    pub profile_service: Arc<ProfileService>,
    pub trade_service: Arc<TradeService>,
    pub signal_service: Arc<SignalService>,
    pub suggestion_service: Arc<SuggestionService>,
    pub portfolio_service: Arc<PortfolioService>,
    pub alert_checker: Arc<AlertChecker>,
}
