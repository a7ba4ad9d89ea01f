use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait,
    ActiveValue,
    ColumnTrait,
    DatabaseConnection,
    EntityTrait,
    Order,
    QueryFilter,
    QueryOrder,
    TransactionTrait,
};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::db::entity::{ holding, portfolio, trading_asset, trading_profile, trading_signal };
use crate::enums::{ AssetStatus, SignalAction };
use crate::error::{ AppError, Result };
use crate::money::{ percent_change, round_money, Money };
use crate::services::asset_service::AssetService;
use crate::services::fx_service::FxService;
use crate::services::market_data_service::MarketDataService;

/// Name of the lazily created per-user portfolio trades settle into.
pub const TRADING_PORTFOLIO_NAME: &str = "Trading";

/// Quantity-weighted average cost basis after adding a lot to an existing
/// position. Recomputed on every additional buy, never overwritten.
pub fn weighted_average(
    old_qty: Decimal,
    old_avg: Decimal,
    new_qty: Decimal,
    new_price: Decimal
) -> Decimal {
    round_money((old_qty * old_avg + new_qty * new_price) / (old_qty + new_qty))
}

/// Target and stop-loss EUR thresholds derived from an EUR reference price
/// and the profile's percentages.
pub fn derive_thresholds(
    reference_eur: Decimal,
    target_profit_pct: Decimal,
    max_loss_pct: Decimal
) -> (Decimal, Decimal) {
    let hundred = Decimal::ONE_HUNDRED;
    let target = round_money(reference_eur * (Decimal::ONE + target_profit_pct / hundred));
    let stop = round_money(reference_eur * (Decimal::ONE - max_loss_pct / hundred));
    (target, stop)
}

pub struct TradeService {
    db: DatabaseConnection,
    market: Arc<MarketDataService>,
    fx: Arc<FxService>,
    assets: AssetService,
    /// Serializes executions per profile so concurrent buys cannot race on
    /// the cash balance or the holding averages.
    profile_locks: Mutex<HashMap<Uuid, Arc<Mutex<()>>>>,
}

impl TradeService {
    pub fn new(
        db: DatabaseConnection,
        market: Arc<MarketDataService>,
        fx: Arc<FxService>
    ) -> Self {
        let assets = AssetService::new(db.clone());
        Self {
            db,
            market,
            fx,
            assets,
            profile_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Start tracking an asset for a profile (or reactivate a sold one).
    /// The new row watches with target/stop derived from the current EUR
    /// price; those thresholds are recomputed at the actual buy.
    pub async fn add_to_trading(
        &self,
        profile_id: Uuid,
        asset_id: Uuid
    ) -> Result<trading_asset::Model> {
        let profile = self.get_profile(profile_id).await?;
        let asset = self.assets.get(asset_id).await?;

        let quote = self.market.get_quote(&asset.symbol).await?;
        let rates = self.fx.snapshot(&[quote.currency.clone()]).await;
        let price_eur = Money::new(quote.price, &quote.currency).to_eur(&rates)?.amount;

        let (target, stop) = derive_thresholds(
            price_eur,
            profile.target_profit_pct,
            profile.max_loss_pct
        );

        let existing = trading_asset::Entity
            ::find()
            .filter(trading_asset::Column::ProfileId.eq(profile_id))
            .filter(trading_asset::Column::AssetId.eq(asset_id))
            .one(&self.db).await?;

        let now = Utc::now();

        match existing {
            None => {
                let model = trading_asset::ActiveModel {
                    id: ActiveValue::Set(Uuid::new_v4()),
                    profile_id: ActiveValue::Set(profile_id),
                    asset_id: ActiveValue::Set(asset_id),
                    status: ActiveValue::Set(AssetStatus::Watching.to_string()),
                    entry_price: ActiveValue::Set(None),
                    entry_price_native: ActiveValue::Set(None),
                    entry_date: ActiveValue::Set(None),
                    quantity: ActiveValue::Set(None),
                    target_price: ActiveValue::Set(target),
                    stop_loss_price: ActiveValue::Set(stop),
                    exit_price: ActiveValue::Set(None),
                    exit_date: ActiveValue::Set(None),
                    realized_profit_pct: ActiveValue::Set(None),
                    created_at: ActiveValue::Set(now),
                    updated_at: ActiveValue::Set(now),
                };
                Ok(model.insert(&self.db).await?)
            }
            Some(ta) if ta.status == AssetStatus::Sold.as_str() => {
                // Reactivation clears every bought/sold field.
                let mut active: trading_asset::ActiveModel = ta.into();
                active.status = ActiveValue::Set(AssetStatus::Watching.to_string());
                active.entry_price = ActiveValue::Set(None);
                active.entry_price_native = ActiveValue::Set(None);
                active.entry_date = ActiveValue::Set(None);
                active.quantity = ActiveValue::Set(None);
                active.target_price = ActiveValue::Set(target);
                active.stop_loss_price = ActiveValue::Set(stop);
                active.exit_price = ActiveValue::Set(None);
                active.exit_date = ActiveValue::Set(None);
                active.realized_profit_pct = ActiveValue::Set(None);
                active.updated_at = ActiveValue::Set(now);
                Ok(active.update(&self.db).await?)
            }
            Some(ta) =>
                Err(
                    AppError::InvalidState(
                        format!("Asset already tracked with status '{}'", ta.status)
                    )
                ),
        }
    }

    /// Execute a buy. Preconditions are checked against a fresh live quote
    /// before any mutation; all effects commit in one transaction.
    pub async fn buy(
        &self,
        trading_asset_id: Uuid,
        quantity: Decimal
    ) -> Result<trading_asset::Model> {
        if quantity <= Decimal::ZERO {
            return Err(AppError::InvalidInput("Quantity must be positive".to_string()));
        }

        let ta = self.get_trading_asset(trading_asset_id).await?;

        let lock = self.profile_lock(ta.profile_id).await;
        let _guard = lock.lock().await;

        // Re-read under the lock; a concurrent execution may have moved it.
        let ta = self.get_trading_asset(trading_asset_id).await?;
        if ta.status != AssetStatus::Watching.as_str() {
            return Err(
                AppError::InvalidState(
                    format!("Can only buy a watching asset, status is '{}'", ta.status)
                )
            );
        }

        let profile = self.get_profile(ta.profile_id).await?;
        let asset = self.assets.get(ta.asset_id).await?;

        // The executed price moves the cash balance, so the cached asset
        // row is not trusted here.
        let quote = self.market.get_quote_fresh(&asset.symbol).await?;
        let rates = self.fx.snapshot(&[quote.currency.clone()]).await;
        let price_eur = Money::new(quote.price, &quote.currency).to_eur(&rates)?.amount;

        let total_cost = round_money(quantity * price_eur);
        if profile.cash_balance < total_cost {
            return Err(AppError::InsufficientFunds {
                balance: profile.cash_balance,
                required: total_cost,
            });
        }

        let (target, stop) = derive_thresholds(
            price_eur,
            profile.target_profit_pct,
            profile.max_loss_pct
        );

        let now = Utc::now();
        let txn = self.db.begin().await?;

        let mut active: trading_asset::ActiveModel = ta.into();
        active.status = ActiveValue::Set(AssetStatus::Bought.to_string());
        active.entry_price = ActiveValue::Set(Some(price_eur));
        active.entry_price_native = ActiveValue::Set(Some(quote.price));
        active.entry_date = ActiveValue::Set(Some(now));
        active.quantity = ActiveValue::Set(Some(quantity));
        active.target_price = ActiveValue::Set(target);
        active.stop_loss_price = ActiveValue::Set(stop);
        active.updated_at = ActiveValue::Set(now);
        let updated = active.update(&txn).await?;

        let new_balance = round_money(profile.cash_balance - total_cost);
        let user_id = profile.user_id.clone();
        let mut profile_active: trading_profile::ActiveModel = profile.into();
        profile_active.cash_balance = ActiveValue::Set(new_balance);
        profile_active.updated_at = ActiveValue::Set(now);
        profile_active.update(&txn).await?;

        let portfolio = self.get_or_create_portfolio(&txn, &user_id).await?;
        self.upsert_holding(&txn, portfolio.id, updated.asset_id, updated.id, quantity, price_eur).await?;
        self.mark_signal_executed(&txn, updated.id, SignalAction::Buy).await?;

        txn.commit().await?;

        tracing::info!(
            "Bought {} x {} at €{} (total €{})",
            quantity,
            asset.symbol,
            price_eur,
            total_cost
        );

        Ok(updated)
    }

    /// Execute a sell, closing the full position. Partial sells are not
    /// supported.
    pub async fn sell(&self, trading_asset_id: Uuid) -> Result<trading_asset::Model> {
        let ta = self.get_trading_asset(trading_asset_id).await?;

        let lock = self.profile_lock(ta.profile_id).await;
        let _guard = lock.lock().await;

        let ta = self.get_trading_asset(trading_asset_id).await?;
        if ta.status != AssetStatus::Bought.as_str() {
            return Err(
                AppError::InvalidState(
                    format!("Can only sell a bought asset, status is '{}'", ta.status)
                )
            );
        }

        let entry_eur = ta.entry_price.ok_or_else(||
            AppError::Internal("Bought asset without entry price".to_string())
        )?;
        let quantity = ta.quantity.ok_or_else(||
            AppError::Internal("Bought asset without quantity".to_string())
        )?;

        let profile = self.get_profile(ta.profile_id).await?;
        let asset = self.assets.get(ta.asset_id).await?;

        let quote = self.market.get_quote_fresh(&asset.symbol).await?;
        let rates = self.fx.snapshot(&[quote.currency.clone()]).await;
        let exit_eur = Money::new(quote.price, &quote.currency).to_eur(&rates)?.amount;

        let realized_pct = percent_change(entry_eur, exit_eur).unwrap_or(Decimal::ZERO);
        let proceeds = round_money(exit_eur * quantity);

        let now = Utc::now();
        let txn = self.db.begin().await?;

        let ta_id = ta.id;
        let mut active: trading_asset::ActiveModel = ta.into();
        active.status = ActiveValue::Set(AssetStatus::Sold.to_string());
        active.exit_price = ActiveValue::Set(Some(exit_eur));
        active.exit_date = ActiveValue::Set(Some(now));
        active.realized_profit_pct = ActiveValue::Set(Some(realized_pct));
        active.updated_at = ActiveValue::Set(now);
        let updated = active.update(&txn).await?;

        let new_balance = round_money(profile.cash_balance + proceeds);
        let mut profile_active: trading_profile::ActiveModel = profile.into();
        profile_active.cash_balance = ActiveValue::Set(new_balance);
        profile_active.updated_at = ActiveValue::Set(now);
        profile_active.update(&txn).await?;

        holding::Entity
            ::delete_many()
            .filter(holding::Column::TradingAssetId.eq(ta_id))
            .exec(&txn).await?;

        self.mark_signal_executed(&txn, ta_id, SignalAction::Sell).await?;

        txn.commit().await?;

        tracing::info!(
            "Sold {} x {} at €{} ({}% realized)",
            quantity,
            asset.symbol,
            exit_eur,
            realized_pct
        );

        Ok(updated)
    }

    pub async fn list_for_analysis(&self) -> Result<Vec<trading_asset::Model>> {
        let assets = trading_asset::Entity
            ::find()
            .filter(
                trading_asset::Column::Status.is_in([
                    AssetStatus::Watching.as_str(),
                    AssetStatus::Bought.as_str(),
                ])
            )
            .all(&self.db).await?;
        Ok(assets)
    }

    pub async fn list_for_profile(&self, profile_id: Uuid) -> Result<Vec<trading_asset::Model>> {
        let assets = trading_asset::Entity
            ::find()
            .filter(trading_asset::Column::ProfileId.eq(profile_id))
            .all(&self.db).await?;
        Ok(assets)
    }

    async fn get_trading_asset(&self, id: Uuid) -> Result<trading_asset::Model> {
        trading_asset::Entity
            ::find_by_id(id)
            .one(&self.db).await?
            .ok_or(AppError::TradingAssetNotFound)
    }

    async fn get_profile(&self, id: Uuid) -> Result<trading_profile::Model> {
        trading_profile::Entity
            ::find_by_id(id)
            .one(&self.db).await?
            .ok_or(AppError::ProfileNotFound)
    }

    async fn profile_lock(&self, profile_id: Uuid) -> Arc<Mutex<()>> {
        let mut locks = self.profile_locks.lock().await;
        locks
            .entry(profile_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    async fn get_or_create_portfolio(
        &self,
        txn: &sea_orm::DatabaseTransaction,
        user_id: &str
    ) -> Result<portfolio::Model> {
        let existing = portfolio::Entity
            ::find()
            .filter(portfolio::Column::UserId.eq(user_id))
            .filter(portfolio::Column::Name.eq(TRADING_PORTFOLIO_NAME))
            .one(txn).await?;

        if let Some(p) = existing {
            return Ok(p);
        }

        let model = portfolio::ActiveModel {
            id: ActiveValue::Set(Uuid::new_v4()),
            user_id: ActiveValue::Set(user_id.to_string()),
            name: ActiveValue::Set(TRADING_PORTFOLIO_NAME.to_string()),
            created_at: ActiveValue::Set(Utc::now()),
        };
        Ok(model.insert(txn).await?)
    }

    async fn upsert_holding(
        &self,
        txn: &sea_orm::DatabaseTransaction,
        portfolio_id: Uuid,
        asset_id: Uuid,
        trading_asset_id: Uuid,
        quantity: Decimal,
        price_eur: Decimal
    ) -> Result<()> {
        let existing = holding::Entity
            ::find()
            .filter(holding::Column::PortfolioId.eq(portfolio_id))
            .filter(holding::Column::AssetId.eq(asset_id))
            .one(txn).await?;

        let now = Utc::now();

        match existing {
            Some(h) => {
                let new_avg = weighted_average(h.quantity, h.avg_buy_price, quantity, price_eur);
                let new_qty = h.quantity + quantity;
                let mut active: holding::ActiveModel = h.into();
                active.quantity = ActiveValue::Set(new_qty);
                active.avg_buy_price = ActiveValue::Set(new_avg);
                active.trading_asset_id = ActiveValue::Set(Some(trading_asset_id));
                active.updated_at = ActiveValue::Set(now);
                active.update(txn).await?;
            }
            None => {
                let model = holding::ActiveModel {
                    id: ActiveValue::Set(Uuid::new_v4()),
                    portfolio_id: ActiveValue::Set(portfolio_id),
                    asset_id: ActiveValue::Set(asset_id),
                    quantity: ActiveValue::Set(quantity),
                    avg_buy_price: ActiveValue::Set(round_money(price_eur)),
                    trading_asset_id: ActiveValue::Set(Some(trading_asset_id)),
                    created_at: ActiveValue::Set(now),
                    updated_at: ActiveValue::Set(now),
                };
                model.insert(txn).await?;
            }
        }

        Ok(())
    }

    /// Mark the newest unexecuted signal of this action as executed, so a
    /// trade driven by a signal shows up as such.
    async fn mark_signal_executed(
        &self,
        txn: &sea_orm::DatabaseTransaction,
        trading_asset_id: Uuid,
        action: SignalAction
    ) -> Result<()> {
        let latest = trading_signal::Entity
            ::find()
            .filter(trading_signal::Column::TradingAssetId.eq(trading_asset_id))
            .filter(trading_signal::Column::Action.eq(action.as_str()))
            .filter(trading_signal::Column::Executed.eq(false))
            .order_by(trading_signal::Column::CreatedAt, Order::Desc)
            .one(txn).await?;

        if let Some(signal) = latest {
            let mut active: trading_signal::ActiveModel = signal.into();
            active.executed = ActiveValue::Set(true);
            active.update(txn).await?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn weighted_average_over_two_buys() {
        // 10 @ €100, then 5 @ €130 → 15 @ €110.
        let avg = weighted_average(dec!(10), dec!(100), dec!(5), dec!(130));
        assert_eq!(avg, dec!(110.00));
    }

    #[test]
    fn weighted_average_matches_total_cost() {
        let (q1, p1) = (dec!(3), dec!(12.34));
        let (q2, p2) = (dec!(7), dec!(56.78));
        let avg = weighted_average(q1, p1, q2, p2);
        let expected = round_money((q1 * p1 + q2 * p2) / (q1 + q2));
        assert_eq!(avg, expected);
    }

    #[test]
    fn thresholds_from_entry_price() {
        // Entry €90, target 10%, max loss 5% → €99 / €85.50.
        let (target, stop) = derive_thresholds(dec!(90), dec!(10), dec!(5));
        assert_eq!(target, dec!(99.00));
        assert_eq!(stop, dec!(85.50));
    }

    #[test]
    fn buy_then_sell_at_same_price_round_trips_cash() {
        let cash = dec!(10000);
        let quantity = dec!(7);
        let price_eur = dec!(33.33);

        let cost = round_money(quantity * price_eur);
        let after_buy = round_money(cash - cost);
        let proceeds = round_money(price_eur * quantity);
        let after_sell = round_money(after_buy + proceeds);

        assert_eq!(after_sell, cash);
    }

    #[test]
    fn realized_profit_uses_entry_and_exit() {
        assert_eq!(percent_change(dec!(90), dec!(99)).unwrap(), dec!(10.00));
        assert_eq!(percent_change(dec!(100), dec!(85)).unwrap(), dec!(-15.00));
    }
}
