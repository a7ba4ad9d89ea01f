use std::sync::Arc;

use chrono::{ DateTime, Duration, Utc };
use sea_orm::{
    ActiveModelTrait,
    ActiveValue,
    ColumnTrait,
    DatabaseConnection,
    EntityTrait,
    PaginatorTrait,
    QueryFilter,
};
use serde_json::json;
use uuid::Uuid;

use crate::db::entity::{ trading_asset, trading_profile, trading_signal };
use crate::enums::{ AssetStatus, NotificationChannel, SignalAction };
use crate::error::{ AppError, Result };
use crate::money::{ FxRates, Money };
use crate::services::asset_service::AssetService;
use crate::services::fx_service::FxService;
use crate::services::indicator_service::IndicatorService;
use crate::services::market_data_service::MarketDataService;
use crate::services::notification_service::NotificationService;
use crate::services::signal_engine::{ self, SignalContext, SignalDecision };

/// At most one persisted signal per (trading asset, action) within this
/// rolling window.
pub const SIGNAL_DEDUP_WINDOW_HOURS: i64 = 4;

/// Signals notify over telegram; per-signal channel preferences live with
/// the out-of-scope settings surface.
const SIGNAL_CHANNELS: &[NotificationChannel] = &[NotificationChannel::Telegram];

pub struct SignalService {
    db: DatabaseConnection,
    market: Arc<MarketDataService>,
    fx: Arc<FxService>,
    indicators: Arc<IndicatorService>,
    notifier: Arc<NotificationService>,
    assets: AssetService,
}

impl SignalService {
    pub fn new(
        db: DatabaseConnection,
        market: Arc<MarketDataService>,
        fx: Arc<FxService>,
        indicators: Arc<IndicatorService>,
        notifier: Arc<NotificationService>
    ) -> Self {
        let assets = AssetService::new(db.clone());
        Self { db, market, fx, indicators, notifier, assets }
    }

    /// Analyze one trading asset on demand. Fetches its own one-off FX
    /// snapshot; the scheduler pass uses [`Self::analyze_with_rates`] so a
    /// whole pass shares a single snapshot.
    pub async fn analyze(&self, trading_asset_id: Uuid) -> Result<SignalDecision> {
        let ta = self.get_trading_asset(trading_asset_id).await?;
        let asset = self.assets.get(ta.asset_id).await?;

        let rates = self.fx.snapshot(&[asset.currency.clone()]).await;
        self.analyze_with_rates(ta, &rates).await
    }

    /// Analyze with a caller-provided rate snapshot. Always returns the
    /// live decision; persistence and notification are suppressed when an
    /// equal (asset, action) signal exists inside the dedup window.
    pub async fn analyze_with_rates(
        &self,
        ta: trading_asset::Model,
        rates: &FxRates
    ) -> Result<SignalDecision> {
        let asset = self.assets.get(ta.asset_id).await?;

        let quote = self.market.get_quote(&asset.symbol).await?;
        let asset = self.assets.apply_quote(asset, &quote).await?;

        let price_eur = Money::new(quote.price, &quote.currency).to_eur(rates)?.amount;

        let status: AssetStatus = ta.status.parse()?;
        let target_reached = status == AssetStatus::Bought && price_eur >= ta.target_price;
        let stop_loss_reached = status == AssetStatus::Bought && price_eur <= ta.stop_loss_price;

        let indicators = self.indicators.get_snapshot(&asset.symbol).await;

        let ctx = SignalContext {
            status,
            price_native: quote.price,
            price_eur,
            entry_price_native: ta.entry_price_native,
            target_reached,
            stop_loss_reached,
            indicators,
        };

        let decision = signal_engine::evaluate(&ctx);

        if decision.action == SignalAction::Hold {
            return Ok(decision);
        }

        let now = Utc::now();
        if self.has_recent_signal(ta.id, decision.action, now).await? {
            tracing::debug!(
                "Suppressing duplicate {} signal for trading asset {} (within {}h window)",
                decision.action,
                ta.id,
                SIGNAL_DEDUP_WINDOW_HOURS
            );
            return Ok(decision);
        }

        let criteria = json!({
            "indicators": ctx.indicators,
            "target_reached": target_reached,
            "stop_loss_reached": stop_loss_reached,
            "price_native": quote.price,
            "currency": quote.currency,
            "sell_score": decision.sell_score,
            "buy_score": decision.buy_score,
        });

        let profile = trading_profile::Entity
            ::find_by_id(ta.profile_id)
            .one(&self.db).await?
            .ok_or(AppError::ProfileNotFound)?;

        let message = format!(
            "Signal: {} {} ({} confidence) at €{}: {}",
            decision.action,
            asset.symbol,
            decision.confidence,
            price_eur,
            decision.reason
        );

        let signal = trading_signal::ActiveModel {
            id: ActiveValue::Set(Uuid::new_v4()),
            trading_asset_id: ActiveValue::Set(ta.id),
            action: ActiveValue::Set(decision.action.to_string()),
            confidence: ActiveValue::Set(decision.confidence.to_string()),
            reason: ActiveValue::Set(decision.reason.clone()),
            price_at_signal: ActiveValue::Set(price_eur),
            criteria: ActiveValue::Set(criteria),
            notified: ActiveValue::Set(false),
            executed: ActiveValue::Set(false),
            created_at: ActiveValue::Set(now),
        };
        let signal = signal.insert(&self.db).await?;

        let delivered = self.notifier.notify(
            &profile.user_id,
            SIGNAL_CHANNELS,
            &message,
            json!({ "trading_asset_id": ta.id, "signal_id": signal.id })
        ).await;

        if delivered {
            let mut active: trading_signal::ActiveModel = signal.into();
            active.notified = ActiveValue::Set(true);
            active.update(&self.db).await?;
        }

        tracing::info!(
            "New {} signal ({}) for {} at €{}",
            decision.action,
            decision.confidence,
            asset.symbol,
            price_eur
        );

        Ok(decision)
    }

    /// The dedup check behind the 4-hour window invariant.
    pub async fn has_recent_signal(
        &self,
        trading_asset_id: Uuid,
        action: SignalAction,
        now: DateTime<Utc>
    ) -> Result<bool> {
        let window_start = now - Duration::hours(SIGNAL_DEDUP_WINDOW_HOURS);

        let count = trading_signal::Entity
            ::find()
            .filter(trading_signal::Column::TradingAssetId.eq(trading_asset_id))
            .filter(trading_signal::Column::Action.eq(action.as_str()))
            .filter(trading_signal::Column::CreatedAt.gt(window_start))
            .count(&self.db).await?;

        Ok(count > 0)
    }

    /// Recent signals for a trading asset, for the host API.
    pub async fn list_signals(&self, trading_asset_id: Uuid) -> Result<Vec<trading_signal::Model>> {
        let signals = trading_signal::Entity
            ::find()
            .filter(trading_signal::Column::TradingAssetId.eq(trading_asset_id))
            .all(&self.db).await?;
        Ok(signals)
    }

    async fn get_trading_asset(&self, id: Uuid) -> Result<trading_asset::Model> {
        trading_asset::Entity
            ::find_by_id(id)
            .one(&self.db).await?
            .ok_or(AppError::TradingAssetNotFound)
    }
}
