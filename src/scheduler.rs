use std::collections::HashSet;
use std::sync::Arc;

use futures_util::stream::{ self, StreamExt };
use sea_orm::{ ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter };
use tokio::time::{ interval, Duration };
use uuid::Uuid;

use crate::db::entity::asset;
use crate::error::Result;
use crate::services::fx_service::FxService;
use crate::services::signal_service::SignalService;
use crate::services::trade_service::TradeService;

/// Periodic signal analysis over every watching or bought trading asset.
/// Runs on its own timer, independent of alert evaluation.
pub struct SignalScheduler {
    db: DatabaseConnection,
    trades: Arc<TradeService>,
    signals: Arc<SignalService>,
    fx: Arc<FxService>,
    interval_secs: u64,
    concurrency: usize,
}

impl SignalScheduler {
    pub fn new(
        db: DatabaseConnection,
        trades: Arc<TradeService>,
        signals: Arc<SignalService>,
        fx: Arc<FxService>,
        interval_secs: u64,
        concurrency: usize
    ) -> Self {
        Self {
            db,
            trades,
            signals,
            fx,
            interval_secs,
            concurrency,
        }
    }

    pub async fn start(self: Arc<Self>) {
        let mut interval = interval(Duration::from_secs(self.interval_secs));

        loop {
            interval.tick().await;

            if let Err(e) = self.run_pass().await {
                tracing::error!("Signal analysis pass failed: {}", e);
            }
        }
    }

    /// One analysis pass. All entities share a single FX snapshot; a
    /// failing entity is logged and the rest of the pass continues.
    pub async fn run_pass(&self) -> Result<()> {
        let trading_assets = self.trades.list_for_analysis().await?;
        if trading_assets.is_empty() {
            return Ok(());
        }

        let asset_ids: Vec<Uuid> = trading_assets
            .iter()
            .map(|ta| ta.asset_id)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();

        let currencies: Vec<String> = asset::Entity
            ::find()
            .filter(asset::Column::Id.is_in(asset_ids))
            .all(&self.db).await?
            .into_iter()
            .map(|a| a.currency)
            .collect();

        let rates = Arc::new(self.fx.snapshot(&currencies).await);

        let total = trading_assets.len();
        let analyzed = stream
            ::iter(
                trading_assets.into_iter().map(|ta| {
                    let rates = Arc::clone(&rates);
                    async move {
                        let ta_id = ta.id;
                        match self.signals.analyze_with_rates(ta, &rates).await {
                            Ok(_) => true,
                            Err(e) => {
                                tracing::warn!(
                                    "Skipping trading asset {} this pass: {}",
                                    ta_id,
                                    e
                                );
                                false
                            }
                        }
                    }
                })
            )
            .buffer_unordered(self.concurrency)
            .collect::<Vec<bool>>().await
            .into_iter()
            .filter(|ok| *ok)
            .count();

        tracing::info!("Signal pass complete: {}/{} assets analyzed", analyzed, total);

        Ok(())
    }
}
