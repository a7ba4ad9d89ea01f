use std::sync::Arc;

use rust_decimal::Decimal;
use sea_orm::{ ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter };
use serde::Serialize;

use crate::db::entity::{ asset, holding, portfolio };
use crate::error::Result;
use crate::money::{ percent_change, round_money, Money };
use crate::services::fx_service::FxService;
use crate::services::market_data_service::MarketDataService;
use crate::services::trade_service::TRADING_PORTFOLIO_NAME;

#[derive(Debug, Clone, Serialize)]
pub struct HoldingView {
    pub symbol: String,
    pub name: String,
    pub quantity: Decimal,
    pub avg_buy_price: Decimal,
    pub current_price_eur: Option<Decimal>,
    pub market_value_eur: Option<Decimal>,
    pub unrealized_pct: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PortfolioOverview {
    pub user_id: String,
    pub holdings: Vec<HoldingView>,
    pub total_value_eur: Decimal,
}

pub struct PortfolioService {
    db: DatabaseConnection,
    market: Arc<MarketDataService>,
    fx: Arc<FxService>,
}

impl PortfolioService {
    pub fn new(
        db: DatabaseConnection,
        market: Arc<MarketDataService>,
        fx: Arc<FxService>
    ) -> Self {
        Self { db, market, fx }
    }

    /// Current view of the user's trading portfolio, valued in EUR. A
    /// holding whose quote is unavailable still appears, just without a
    /// market value.
    pub async fn get_overview(&self, user_id: &str) -> Result<PortfolioOverview> {
        let Some(portfolio) = portfolio::Entity
            ::find()
            .filter(portfolio::Column::UserId.eq(user_id))
            .filter(portfolio::Column::Name.eq(TRADING_PORTFOLIO_NAME))
            .one(&self.db).await?
        else {
            return Ok(PortfolioOverview {
                user_id: user_id.to_string(),
                holdings: vec![],
                total_value_eur: Decimal::ZERO,
            });
        };

        let holdings = holding::Entity
            ::find()
            .filter(holding::Column::PortfolioId.eq(portfolio.id))
            .all(&self.db).await?;

        let mut views = Vec::with_capacity(holdings.len());
        let mut total = Decimal::ZERO;

        // One rate snapshot for the whole valuation.
        let mut currencies = Vec::new();
        let mut rows = Vec::new();
        for h in holdings {
            let Some(asset) = asset::Entity::find_by_id(h.asset_id).one(&self.db).await? else {
                tracing::warn!("Holding {} references missing asset {}", h.id, h.asset_id);
                continue;
            };
            currencies.push(asset.currency.clone());
            rows.push((h, asset));
        }
        let rates = self.fx.snapshot(&currencies).await;

        for (h, asset) in rows {
            let quote = match self.market.get_quote(&asset.symbol).await {
                Ok(q) => Some(q),
                Err(e) => {
                    tracing::warn!("No quote for {} while valuing portfolio: {}", asset.symbol, e);
                    None
                }
            };

            let current_price_eur = match &quote {
                Some(q) =>
                    Money::new(q.price, &q.currency)
                        .to_eur(&rates)
                        .ok()
                        .map(|m| m.amount),
                None => None,
            };

            let market_value_eur = current_price_eur.map(|p| round_money(p * h.quantity));
            if let Some(v) = market_value_eur {
                total += v;
            }

            views.push(HoldingView {
                symbol: asset.symbol,
                name: asset.name,
                quantity: h.quantity,
                avg_buy_price: h.avg_buy_price,
                current_price_eur,
                market_value_eur,
                unrealized_pct: current_price_eur.and_then(|p|
                    percent_change(h.avg_buy_price, p)
                ),
            });
        }

        views.sort_by(|a, b|
            b.market_value_eur
                .unwrap_or(Decimal::ZERO)
                .cmp(&a.market_value_eur.unwrap_or(Decimal::ZERO))
        );

        Ok(PortfolioOverview {
            user_id: user_id.to_string(),
            holdings: views,
            total_value_eur: total,
        })
    }
}
