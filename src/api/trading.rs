use axum::{ extract::{ Path, State }, Json };
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use crate::db::entity::{ trading_asset, trading_profile, trading_signal };
use crate::error::Result;
use crate::services::portfolio_service::PortfolioOverview;
use crate::services::profile_service::CreateProfileRequest;
use crate::services::signal_engine::SignalDecision;

use super::AppState;

#[derive(Deserialize)]
pub struct CreateProfileBody {
    pub user_id: String,
    pub horizon: String,
    pub risk_tolerance: String,
    pub trading_style: String,
    pub target_profit_pct: Decimal,
    pub max_loss_pct: Decimal,
    #[serde(default)]
    pub preferred_sectors: Vec<String>,
    #[serde(default)]
    pub resuggest_dismissed_after_days: Option<i32>,
    #[serde(default)]
    pub initial_cash: Option<Decimal>,
}

pub async fn create_profile(
    State(state): State<AppState>,
    Json(body): Json<CreateProfileBody>
) -> Result<Json<trading_profile::Model>> {
    let profile = state.profile_service.create_profile(CreateProfileRequest {
        user_id: body.user_id,
        horizon: body.horizon.parse()?,
        risk_tolerance: body.risk_tolerance.parse()?,
        trading_style: body.trading_style.parse()?,
        target_profit_pct: body.target_profit_pct,
        max_loss_pct: body.max_loss_pct,
        preferred_sectors: body.preferred_sectors,
        resuggest_dismissed_after_days: body.resuggest_dismissed_after_days,
        initial_cash: body.initial_cash,
    }).await?;

    Ok(Json(profile))
}

pub async fn get_profile(
    State(state): State<AppState>,
    Path(profile_id): Path<Uuid>
) -> Result<Json<trading_profile::Model>> {
    let profile = state.profile_service.get_profile(profile_id).await?;
    Ok(Json(profile))
}

#[derive(Deserialize)]
pub struct AddTradingAssetBody {
    pub symbol: String,
}

pub async fn add_trading_asset(
    State(state): State<AppState>,
    Path(profile_id): Path<Uuid>,
    Json(body): Json<AddTradingAssetBody>
) -> Result<Json<trading_asset::Model>> {
    let asset = state.asset_service
        .find_by_symbol(&body.symbol).await?
        .ok_or(crate::error::AppError::AssetNotFound)?;

    let ta = state.trade_service.add_to_trading(profile_id, asset.id).await?;
    Ok(Json(ta))
}

pub async fn list_trading_assets(
    State(state): State<AppState>,
    Path(profile_id): Path<Uuid>
) -> Result<Json<Vec<trading_asset::Model>>> {
    let assets = state.trade_service.list_for_profile(profile_id).await?;
    Ok(Json(assets))
}

/// On-demand analysis. Returns the live decision even when the dedup
/// window suppressed a new signal row.
pub async fn analyze_trading_asset(
    State(state): State<AppState>,
    Path(trading_asset_id): Path<Uuid>
) -> Result<Json<SignalDecision>> {
    let decision = state.signal_service.analyze(trading_asset_id).await?;
    Ok(Json(decision))
}

pub async fn list_signals(
    State(state): State<AppState>,
    Path(trading_asset_id): Path<Uuid>
) -> Result<Json<Vec<trading_signal::Model>>> {
    let signals = state.signal_service.list_signals(trading_asset_id).await?;
    Ok(Json(signals))
}

#[derive(Deserialize)]
pub struct BuyBody {
    pub quantity: Decimal,
}

pub async fn execute_buy(
    State(state): State<AppState>,
    Path(trading_asset_id): Path<Uuid>,
    Json(body): Json<BuyBody>
) -> Result<Json<trading_asset::Model>> {
    let ta = state.trade_service.buy(trading_asset_id, body.quantity).await?;
    Ok(Json(ta))
}

pub async fn execute_sell(
    State(state): State<AppState>,
    Path(trading_asset_id): Path<Uuid>
) -> Result<Json<trading_asset::Model>> {
    let ta = state.trade_service.sell(trading_asset_id).await?;
    Ok(Json(ta))
}

pub async fn get_portfolio(
    State(state): State<AppState>,
    Path(user_id): Path<String>
) -> Result<Json<PortfolioOverview>> {
    let overview = state.portfolio_service.get_overview(&user_id).await?;
    Ok(Json(overview))
}
