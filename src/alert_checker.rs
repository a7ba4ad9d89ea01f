use std::collections::{ HashMap, HashSet };
use std::sync::Arc;

use chrono::Utc;
use futures_util::stream::{ self, StreamExt };
use sea_orm::{ ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter };
use serde_json::json;
use tokio::time::{ interval, Duration };
use uuid::Uuid;

use crate::db::entity::{ alert, asset };
use crate::error::Result;
use crate::money::{ FxRates, Money };
use crate::services::alert_service::{
    format_trigger_message,
    parse_channels,
    plan_transition,
    AlertObservation,
    AlertPlan,
    AlertService,
};
use crate::services::asset_service::AssetService;
use crate::services::fx_service::FxService;
use crate::services::market_data_service::MarketDataService;
use crate::services::notification_service::NotificationService;

/// Periodic alert evaluation. One pass loads every active alert, fetches a
/// single FX snapshot, and evaluates alerts concurrently under a bounded
/// fan-out; a failure on one alert never aborts the rest of the pass.
pub struct AlertChecker {
    db: DatabaseConnection,
    alerts: AlertService,
    assets: AssetService,
    market: Arc<MarketDataService>,
    fx: Arc<FxService>,
    notifier: Arc<NotificationService>,
    interval_secs: u64,
    concurrency: usize,
}

impl AlertChecker {
    pub fn new(
        db: DatabaseConnection,
        market: Arc<MarketDataService>,
        fx: Arc<FxService>,
        notifier: Arc<NotificationService>,
        interval_secs: u64,
        concurrency: usize
    ) -> Self {
        Self {
            alerts: AlertService::new(db.clone()),
            assets: AssetService::new(db.clone()),
            db,
            market,
            fx,
            notifier,
            interval_secs,
            concurrency,
        }
    }

    /// Run the evaluation loop forever.
    pub async fn start(self: Arc<Self>) {
        let mut interval = interval(Duration::from_secs(self.interval_secs));

        loop {
            interval.tick().await;

            if let Err(e) = self.run_pass().await {
                tracing::error!("Alert evaluation pass failed: {}", e);
            }
        }
    }

    /// One evaluation pass over all active alerts.
    pub async fn run_pass(&self) -> Result<()> {
        let alerts = self.alerts.get_active_alerts().await?;
        if alerts.is_empty() {
            return Ok(());
        }

        let assets_by_id = self.load_assets(&alerts).await?;

        // One rate snapshot shared read-only by the whole pass.
        let currencies: Vec<String> = assets_by_id
            .values()
            .map(|a| a.currency.clone())
            .collect();
        let rates = Arc::new(self.fx.snapshot(&currencies).await);

        let total = alerts.len();
        let plans: Vec<AlertPlan> = stream
            ::iter(
                alerts.into_iter().map(|alert| {
                    let asset = assets_by_id.get(&alert.asset_id).cloned();
                    let rates = Arc::clone(&rates);
                    async move {
                        let alert_id = alert.id;
                        match self.evaluate_alert(alert, asset, &rates).await {
                            Ok(plan) => plan,
                            Err(e) => {
                                tracing::error!("Failed to evaluate alert {}: {}", alert_id, e);
                                AlertPlan::Skip
                            }
                        }
                    }
                })
            )
            .buffer_unordered(self.concurrency)
            .collect().await;

        let triggered = plans
            .iter()
            .filter(|p| **p == AlertPlan::Trigger)
            .count();

        tracing::info!("Alert pass complete: {} evaluated, {} triggered", total, triggered);

        Ok(())
    }

    async fn evaluate_alert(
        &self,
        alert: alert::Model,
        asset: Option<asset::Model>,
        rates: &FxRates
    ) -> Result<AlertPlan> {
        let Some(asset) = asset else {
            tracing::warn!("Alert {} references missing asset {}", alert.id, alert.asset_id);
            return Ok(AlertPlan::Skip);
        };

        let observation = match self.market.get_quote(&asset.symbol).await {
            Ok(quote) => {
                // Refresh the cached asset row best-effort.
                if let Err(e) = self.assets.apply_quote(asset.clone(), &quote).await {
                    tracing::warn!("Could not refresh asset row for {}: {}", asset.symbol, e);
                }

                let price_eur = match Money::new(quote.price, &quote.currency).to_eur(rates) {
                    Ok(money) => Some(money.amount),
                    Err(e) => {
                        tracing::warn!("Skipping alert {}: {}", alert.id, e);
                        None
                    }
                };

                AlertObservation {
                    price_eur,
                    change_percent: quote.change_percent,
                    volume: quote.volume,
                }
            }
            Err(e) => {
                tracing::debug!("No quote for {} this pass: {}", asset.symbol, e);
                AlertObservation::default()
            }
        };

        let now = Utc::now();
        let plan = plan_transition(&alert, &observation, now);

        match plan {
            AlertPlan::Skip | AlertPlan::Hold => {}
            AlertPlan::Trigger => {
                let Some(price_eur) = observation.price_eur else {
                    return Ok(AlertPlan::Skip);
                };
                let kind = alert.kind.parse()?;
                let message = format_trigger_message(
                    kind,
                    &asset.symbol,
                    price_eur,
                    alert.threshold
                );

                // Bundle commits first; notification failures must never
                // roll back the trigger.
                let (updated, history) = self.alerts.apply_trigger(
                    alert,
                    price_eur,
                    message.clone(),
                    now
                ).await?;

                let channels = parse_channels(&updated.channels);
                let delivered = self.notifier.notify(
                    &updated.user_id,
                    &channels,
                    &message,
                    json!({ "alert_id": updated.id, "price_eur": price_eur })
                ).await;

                if delivered {
                    self.alerts.mark_history_notified(history).await?;
                }

                tracing::info!(
                    "Alert {} triggered for {} at €{} (count {})",
                    updated.id,
                    asset.symbol,
                    price_eur,
                    updated.trigger_count
                );
            }
            AlertPlan::Sample => {
                let Some(price_eur) = observation.price_eur else {
                    return Ok(AlertPlan::Skip);
                };
                self.alerts.apply_sample(&alert, price_eur, now).await?;
            }
            AlertPlan::Reset => {
                self.alerts.apply_reset(alert, now).await?;
            }
        }

        Ok(plan)
    }

    async fn load_assets(
        &self,
        alerts: &[alert::Model]
    ) -> Result<HashMap<Uuid, asset::Model>> {
        let ids: Vec<Uuid> = alerts
            .iter()
            .map(|a| a.asset_id)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();

        let assets = asset::Entity
            ::find()
            .filter(asset::Column::Id.is_in(ids))
            .all(&self.db).await?;

        Ok(
            assets
                .into_iter()
                .map(|a| (a.id, a))
                .collect()
        )
    }
}
