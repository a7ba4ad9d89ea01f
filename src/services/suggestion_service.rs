use std::collections::{ HashMap, HashSet };
use std::sync::Arc;

use chrono::{ DateTime, Duration, Utc };
use lazy_static::lazy_static;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use sea_orm::{
    ActiveModelTrait,
    ActiveValue,
    ColumnTrait,
    DatabaseConnection,
    EntityTrait,
    QueryFilter,
};
use serde_json::json;
use uuid::Uuid;

use crate::db::entity::{ asset, trading_asset, trading_profile, trading_suggestion };
use crate::enums::{
    AssetStatus,
    Confidence,
    Horizon,
    MoverCategory,
    RiskTolerance,
    SuggestionStatus,
    TradingStyle,
};
use crate::error::{ AppError, Result };
use crate::services::asset_service::AssetService;
use crate::services::market_data_service::{ MarketDataService, MoverEntry };
use crate::services::trade_service::TradeService;

/// Candidates ranked per generation run and how many survive to rows.
const CANDIDATES_CONSIDERED: usize = 20;
const SUGGESTIONS_PERSISTED: usize = 5;

lazy_static! {
    /// Category weight per investment horizon.
    static ref BASE_WEIGHT: HashMap<(Horizon, MoverCategory), f64> = {
        use Horizon::*;
        use MoverCategory::*;
        let mut m = HashMap::new();
        m.insert((Short, Gainers), 3.0);
        m.insert((Short, Losers), 1.0);
        m.insert((Short, MostActive), 2.5);
        m.insert((Short, Trending), 3.0);
        m.insert((Short, Undervalued), 0.5);
        m.insert((Short, Growth), 1.0);
        m.insert((Medium, Gainers), 2.0);
        m.insert((Medium, Losers), 1.5);
        m.insert((Medium, MostActive), 1.5);
        m.insert((Medium, Trending), 2.0);
        m.insert((Medium, Undervalued), 2.0);
        m.insert((Medium, Growth), 2.5);
        m.insert((Long, Gainers), 1.0);
        m.insert((Long, Losers), 2.0);
        m.insert((Long, MostActive), 1.0);
        m.insert((Long, Trending), 1.0);
        m.insert((Long, Undervalued), 3.0);
        m.insert((Long, Growth), 3.0);
        m
    };

    /// Trading-style multiplier per category; 1.0 where a style is neutral.
    static ref STYLE_MULTIPLIER: HashMap<(TradingStyle, MoverCategory), f64> = {
        use MoverCategory::*;
        use TradingStyle::*;
        let mut m = HashMap::new();
        m.insert((Value, Undervalued), 2.0);
        m.insert((Value, Losers), 1.5);
        m.insert((Value, Gainers), 0.6);
        m.insert((Value, Trending), 0.7);
        m.insert((TradingStyle::Growth, MoverCategory::Growth), 2.0);
        m.insert((TradingStyle::Growth, Gainers), 1.3);
        m.insert((TradingStyle::Growth, Trending), 1.2);
        m.insert((TradingStyle::Growth, Undervalued), 0.8);
        m.insert((TradingStyle::Growth, Losers), 0.7);
        m.insert((Momentum, Gainers), 1.8);
        m.insert((Momentum, Trending), 1.6);
        m.insert((Momentum, MostActive), 1.4);
        m.insert((Momentum, Losers), 0.5);
        m.insert((Momentum, Undervalued), 0.6);
        m
    };

    /// Risk-tolerance multiplier per category; 1.0 where neutral.
    static ref RISK_MULTIPLIER: HashMap<(RiskTolerance, MoverCategory), f64> = {
        use MoverCategory::*;
        use RiskTolerance::*;
        let mut m = HashMap::new();
        m.insert((Conservative, Gainers), 0.6);
        m.insert((Conservative, Losers), 0.7);
        m.insert((Conservative, MostActive), 0.8);
        m.insert((Conservative, Trending), 0.6);
        m.insert((Conservative, Undervalued), 1.4);
        m.insert((Conservative, Growth), 1.1);
        m.insert((Aggressive, Gainers), 1.4);
        m.insert((Aggressive, Losers), 1.3);
        m.insert((Aggressive, MostActive), 1.2);
        m.insert((Aggressive, Trending), 1.4);
        m.insert((Aggressive, Undervalued), 0.8);
        m.insert((Aggressive, Growth), 1.1);
        m
    };
}

fn base_weight(horizon: Horizon, category: MoverCategory) -> f64 {
    BASE_WEIGHT.get(&(horizon, category)).copied().unwrap_or(1.0)
}

fn style_multiplier(style: TradingStyle, category: MoverCategory) -> f64 {
    STYLE_MULTIPLIER.get(&(style, category)).copied().unwrap_or(1.0)
}

fn risk_multiplier(risk: RiskTolerance, category: MoverCategory) -> f64 {
    RISK_MULTIPLIER.get(&(risk, category)).copied().unwrap_or(1.0)
}

/// Volatility bonus by |changePercent| tier, scaled by risk appetite.
fn volatility_bonus(change_percent: Option<Decimal>, risk: RiskTolerance) -> f64 {
    let Some(change) = change_percent else {
        return 0.0;
    };
    let abs = change.abs().to_f64().unwrap_or(0.0);

    let tier = if abs >= 10.0 {
        3.0
    } else if abs >= 5.0 {
        2.0
    } else if abs >= 3.0 {
        1.0
    } else {
        0.0
    };

    let scale = match risk {
        RiskTolerance::Conservative => 0.3,
        RiskTolerance::Moderate => 1.0,
        RiskTolerance::Aggressive => 1.5,
    };

    tier * scale
}

/// The profile attributes scoring depends on, detached from the entity so
/// the scorer stays a pure function.
#[derive(Debug, Clone, Copy)]
pub struct ScoringProfile {
    pub horizon: Horizon,
    pub risk_tolerance: RiskTolerance,
    pub trading_style: TradingStyle,
}

/// One pooled candidate with the category lists it appeared in.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub entry: MoverEntry,
    pub categories: Vec<MoverCategory>,
}

#[derive(Debug, Clone)]
pub struct ScoredCandidate {
    pub candidate: Candidate,
    pub score: f64,
    pub reason: String,
}

/// Hard filters applied before scoring. Sector preference excludes known
/// off-sector candidates only (unknown sector passes); conservative
/// long-horizon profiles additionally drop big movers.
pub fn passes_hard_filters(
    profile: &ScoringProfile,
    preferred_sectors: &[String],
    candidate: &Candidate
) -> bool {
    if !preferred_sectors.is_empty() {
        if let Some(sector) = &candidate.entry.sector {
            if !preferred_sectors.iter().any(|s| s.eq_ignore_ascii_case(sector)) {
                return false;
            }
        }
    }

    if
        profile.risk_tolerance == RiskTolerance::Conservative &&
        profile.horizon == Horizon::Long
    {
        if let Some(change) = candidate.entry.change_percent {
            if change.abs() >= Decimal::from(8) {
                return false;
            }
        }
    }

    true
}

/// Score one candidate and assemble the explanation of what drove the
/// score, in category declaration order.
pub fn score_candidate(profile: &ScoringProfile, candidate: &Candidate) -> ScoredCandidate {
    let mut score = 0.0;
    let mut clauses = Vec::new();

    for category in MoverCategory::all() {
        if !candidate.categories.contains(category) {
            continue;
        }
        let contribution =
            base_weight(profile.horizon, *category) *
            style_multiplier(profile.trading_style, *category) *
            risk_multiplier(profile.risk_tolerance, *category);
        score += contribution;
        clauses.push(format!("listed in {}", category));
    }

    let bonus = volatility_bonus(candidate.entry.change_percent, profile.risk_tolerance);
    if bonus > 0.0 {
        score += bonus;
        let change = candidate.entry.change_percent.unwrap_or_default();
        clauses.push(
            format!("daily move of {}% suits {} risk appetite", change, profile.risk_tolerance)
        );
    }

    clauses.push(
        format!(
            "matches {} {}-horizon strategy",
            profile.trading_style,
            profile.horizon
        )
    );

    ScoredCandidate {
        candidate: candidate.clone(),
        score,
        reason: clauses.join("; "),
    }
}

fn confidence_for(score: f64) -> Confidence {
    if score >= 8.0 {
        Confidence::High
    } else if score >= 5.0 {
        Confidence::Medium
    } else {
        Confidence::Low
    }
}

fn risk_level_for(change_percent: Option<Decimal>) -> &'static str {
    let abs = change_percent.map(|c| c.abs()).unwrap_or(Decimal::ZERO);
    if abs >= Decimal::from(8) {
        "high"
    } else if abs >= Decimal::from(4) {
        "medium"
    } else {
        "low"
    }
}

/// Whether a dismissed suggestion is still inside its regeneration
/// cooldown. Zero days means always eligible again.
pub fn dismissed_still_cooling(
    responded_at: Option<DateTime<Utc>>,
    cooldown_days: i32,
    now: DateTime<Utc>
) -> bool {
    if cooldown_days <= 0 {
        return false;
    }
    match responded_at {
        Some(at) => now - at < Duration::days(cooldown_days as i64),
        None => true,
    }
}

pub struct SuggestionService {
    db: DatabaseConnection,
    market: Arc<MarketDataService>,
    trades: Arc<TradeService>,
    assets: AssetService,
}

impl SuggestionService {
    pub fn new(
        db: DatabaseConnection,
        market: Arc<MarketDataService>,
        trades: Arc<TradeService>
    ) -> Self {
        let assets = AssetService::new(db.clone());
        Self { db, market, trades, assets }
    }

    /// Generate fresh suggestions for a profile from the current market
    /// movers. Returns the number of rows persisted.
    pub async fn generate(&self, profile_id: Uuid) -> Result<usize> {
        let profile = trading_profile::Entity
            ::find_by_id(profile_id)
            .one(&self.db).await?
            .ok_or(AppError::ProfileNotFound)?;

        let scoring_profile = ScoringProfile {
            horizon: profile.horizon.parse()?,
            risk_tolerance: profile.risk_tolerance.parse()?,
            trading_style: profile.trading_style.parse()?,
        };
        let preferred_sectors: Vec<String> = profile.preferred_sectors
            .as_array()
            .map(|entries|
                entries
                    .iter()
                    .filter_map(|e| e.as_str().map(str::to_string))
                    .collect()
            )
            .unwrap_or_default();

        let candidates = self.pool_candidates().await;
        if candidates.is_empty() {
            tracing::warn!("No market-mover candidates available for profile {}", profile_id);
            return Ok(0);
        }

        let excluded = self.excluded_symbols(&profile).await?;

        let mut scored: Vec<ScoredCandidate> = candidates
            .into_values()
            .filter(|c| !excluded.contains(&c.entry.symbol.to_uppercase()))
            .filter(|c| passes_hard_filters(&scoring_profile, &preferred_sectors, c))
            .map(|c| score_candidate(&scoring_profile, &c))
            .collect();

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(CANDIDATES_CONSIDERED);

        let now = Utc::now();
        let mut persisted = 0;

        for sc in scored {
            if persisted >= SUGGESTIONS_PERSISTED {
                break;
            }

            let entry = &sc.candidate.entry;
            let asset = match
                self.assets.get_or_create(
                    &entry.symbol,
                    &entry.name,
                    &entry.currency,
                    entry.sector.clone()
                ).await
            {
                Ok(a) => a,
                Err(e) => {
                    tracing::warn!("Could not register candidate {}: {}", entry.symbol, e);
                    continue;
                }
            };

            let categories: Vec<&str> = sc.candidate.categories
                .iter()
                .map(|c| c.as_str())
                .collect();

            let model = trading_suggestion::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4()),
                profile_id: ActiveValue::Set(profile_id),
                asset_id: ActiveValue::Set(asset.id),
                status: ActiveValue::Set(SuggestionStatus::Pending.to_string()),
                reason: ActiveValue::Set(sc.reason.clone()),
                confidence: ActiveValue::Set(confidence_for(sc.score).to_string()),
                risk_level: ActiveValue::Set(risk_level_for(entry.change_percent).to_string()),
                expected_profit_pct: ActiveValue::Set(profile.target_profit_pct),
                criteria: ActiveValue::Set(
                    json!({
                        "categories": categories,
                        "score": sc.score,
                        "change_percent": entry.change_percent,
                    })
                ),
                responded_at: ActiveValue::Set(None),
                created_at: ActiveValue::Set(now),
            };

            if let Err(e) = model.insert(&self.db).await {
                tracing::warn!("Failed to persist suggestion for {}: {}", entry.symbol, e);
                continue;
            }
            persisted += 1;
        }

        tracing::info!("Generated {} suggestions for profile {}", persisted, profile_id);
        Ok(persisted)
    }

    /// Accept or dismiss a pending suggestion. Accepting puts the asset
    /// under trading (watching).
    pub async fn respond(
        &self,
        suggestion_id: Uuid,
        accept: bool
    ) -> Result<trading_suggestion::Model> {
        let suggestion = trading_suggestion::Entity
            ::find_by_id(suggestion_id)
            .one(&self.db).await?
            .ok_or_else(|| AppError::InvalidInput("Suggestion not found".to_string()))?;

        if suggestion.status != SuggestionStatus::Pending.as_str() {
            return Err(
                AppError::InvalidState(
                    format!("Suggestion already responded to ({})", suggestion.status)
                )
            );
        }

        let profile_id = suggestion.profile_id;
        let asset_id = suggestion.asset_id;

        let status = if accept { SuggestionStatus::Accepted } else { SuggestionStatus::Dismissed };
        let mut active: trading_suggestion::ActiveModel = suggestion.into();
        active.status = ActiveValue::Set(status.to_string());
        active.responded_at = ActiveValue::Set(Some(Utc::now()));
        let updated = active.update(&self.db).await?;

        if accept {
            self.trades.add_to_trading(profile_id, asset_id).await?;
        }

        Ok(updated)
    }

    pub async fn list_pending(&self, profile_id: Uuid) -> Result<Vec<trading_suggestion::Model>> {
        let suggestions = trading_suggestion::Entity
            ::find()
            .filter(trading_suggestion::Column::ProfileId.eq(profile_id))
            .filter(trading_suggestion::Column::Status.eq(SuggestionStatus::Pending.as_str()))
            .all(&self.db).await?;
        Ok(suggestions)
    }

    /// Fetch every category list and fold entries into per-symbol
    /// candidates. A category that fails to load is logged and skipped so
    /// one flaky list never empties the pool.
    async fn pool_candidates(&self) -> HashMap<String, Candidate> {
        let mut pool: HashMap<String, Candidate> = HashMap::new();

        for category in MoverCategory::all() {
            let entries = match self.market.get_movers(*category).await {
                Ok(entries) => entries,
                Err(e) => {
                    tracing::warn!("Mover category {} unavailable: {}", category, e);
                    continue;
                }
            };

            for entry in entries {
                let key = entry.symbol.to_uppercase();
                pool.entry(key)
                    .and_modify(|c| c.categories.push(*category))
                    .or_insert(Candidate {
                        entry,
                        categories: vec![*category],
                    });
            }
        }

        pool
    }

    /// Symbols excluded before scoring: currently tracked assets, assets
    /// with pending/accepted suggestions, and dismissals inside the
    /// profile's regeneration cooldown.
    async fn excluded_symbols(&self, profile: &trading_profile::Model) -> Result<HashSet<String>> {
        let now = Utc::now();
        let mut asset_ids: HashSet<Uuid> = HashSet::new();

        let tracked = trading_asset::Entity
            ::find()
            .filter(trading_asset::Column::ProfileId.eq(profile.id))
            .filter(
                trading_asset::Column::Status.is_in([
                    AssetStatus::Watching.as_str(),
                    AssetStatus::Bought.as_str(),
                ])
            )
            .all(&self.db).await?;
        asset_ids.extend(tracked.iter().map(|t| t.asset_id));

        let suggestions = trading_suggestion::Entity
            ::find()
            .filter(trading_suggestion::Column::ProfileId.eq(profile.id))
            .all(&self.db).await?;

        for s in &suggestions {
            let excluded = match s.status.parse::<SuggestionStatus>() {
                Ok(SuggestionStatus::Pending) | Ok(SuggestionStatus::Accepted) => true,
                Ok(SuggestionStatus::Dismissed) =>
                    dismissed_still_cooling(
                        s.responded_at,
                        profile.resuggest_dismissed_after_days,
                        now
                    ),
                Err(_) => true,
            };
            if excluded {
                asset_ids.insert(s.asset_id);
            }
        }

        if asset_ids.is_empty() {
            return Ok(HashSet::new());
        }

        let assets = asset::Entity
            ::find()
            .filter(asset::Column::Id.is_in(asset_ids.iter().copied().collect::<Vec<_>>()))
            .all(&self.db).await?;

        Ok(
            assets
                .into_iter()
                .map(|a| a.symbol.to_uppercase())
                .collect()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn entry(symbol: &str, change: Option<Decimal>, sector: Option<&str>) -> MoverEntry {
        MoverEntry {
            symbol: symbol.to_string(),
            name: symbol.to_string(),
            price: dec!(100),
            change_percent: change,
            currency: "EUR".to_string(),
            sector: sector.map(|s| s.to_string()),
        }
    }

    fn candidate(categories: Vec<MoverCategory>, change: Option<Decimal>) -> Candidate {
        Candidate {
            entry: entry("ACME", change, None),
            categories,
        }
    }

    fn profile(
        horizon: Horizon,
        risk: RiskTolerance,
        style: TradingStyle
    ) -> ScoringProfile {
        ScoringProfile {
            horizon,
            risk_tolerance: risk,
            trading_style: style,
        }
    }

    #[test]
    fn score_is_category_sum_times_multipliers() {
        let p = profile(Horizon::Long, RiskTolerance::Moderate, TradingStyle::Value);
        let c = candidate(vec![MoverCategory::Undervalued], None);

        // base 3.0 × style 2.0 × risk 1.0
        let scored = score_candidate(&p, &c);
        assert!((scored.score - 6.0).abs() < 1e-9);
    }

    #[test]
    fn volatility_bonus_tiers() {
        assert_eq!(volatility_bonus(Some(dec!(12)), RiskTolerance::Moderate), 3.0);
        assert_eq!(volatility_bonus(Some(dec!(-6)), RiskTolerance::Moderate), 2.0);
        assert_eq!(volatility_bonus(Some(dec!(3.5)), RiskTolerance::Moderate), 1.0);
        assert_eq!(volatility_bonus(Some(dec!(1)), RiskTolerance::Moderate), 0.0);
        assert_eq!(volatility_bonus(None, RiskTolerance::Aggressive), 0.0);
    }

    #[test]
    fn volatility_bonus_scales_with_risk() {
        let conservative = volatility_bonus(Some(dec!(12)), RiskTolerance::Conservative);
        assert!((conservative - 0.9).abs() < 1e-9);
        assert_eq!(volatility_bonus(Some(dec!(12)), RiskTolerance::Aggressive), 4.5);
    }

    #[test]
    fn conservative_long_profiles_drop_big_movers() {
        let p = profile(Horizon::Long, RiskTolerance::Conservative, TradingStyle::Balanced);
        let big = candidate(vec![MoverCategory::Gainers], Some(dec!(9)));
        let small = candidate(vec![MoverCategory::Gainers], Some(dec!(4)));

        assert!(!passes_hard_filters(&p, &[], &big));
        assert!(passes_hard_filters(&p, &[], &small));

        // The same mover passes for a moderate profile.
        let moderate = profile(Horizon::Long, RiskTolerance::Moderate, TradingStyle::Balanced);
        assert!(passes_hard_filters(&moderate, &[], &big));
    }

    #[test]
    fn sector_filter_is_hard_but_unknown_sector_passes() {
        let p = profile(Horizon::Medium, RiskTolerance::Moderate, TradingStyle::Balanced);
        let sectors = vec!["Technology".to_string()];

        let tech = Candidate {
            entry: entry("TECH", None, Some("technology")),
            categories: vec![MoverCategory::Trending],
        };
        let energy = Candidate {
            entry: entry("OIL", None, Some("Energy")),
            categories: vec![MoverCategory::Trending],
        };
        let unknown = Candidate {
            entry: entry("MYST", None, None),
            categories: vec![MoverCategory::Trending],
        };

        assert!(passes_hard_filters(&p, &sectors, &tech));
        assert!(!passes_hard_filters(&p, &sectors, &energy));
        assert!(passes_hard_filters(&p, &sectors, &unknown));
    }

    #[test]
    fn reason_names_the_contributing_categories_in_order() {
        let p = profile(Horizon::Short, RiskTolerance::Aggressive, TradingStyle::Momentum);
        let c = candidate(
            vec![MoverCategory::Trending, MoverCategory::Gainers],
            Some(dec!(11.5))
        );

        let scored = score_candidate(&p, &c);
        assert_eq!(
            scored.reason,
            "listed in gainers; listed in trending; \
             daily move of 11.5% suits aggressive risk appetite; \
             matches momentum short-horizon strategy"
        );
    }

    #[test]
    fn dismissed_cooldown_arithmetic() {
        let now = Utc::now();

        // Zero cooldown: always eligible again.
        assert!(!dismissed_still_cooling(Some(now), 0, now));

        // Dismissed yesterday with a 7-day cooldown: still cooling.
        assert!(dismissed_still_cooling(Some(now - Duration::days(1)), 7, now));

        // Dismissed 8 days ago with a 7-day cooldown: eligible.
        assert!(!dismissed_still_cooling(Some(now - Duration::days(8)), 7, now));

        // No timestamp recorded: stay excluded.
        assert!(dismissed_still_cooling(None, 7, now));
    }

    #[test]
    fn confidence_ladder() {
        assert_eq!(confidence_for(9.0), Confidence::High);
        assert_eq!(confidence_for(6.0), Confidence::Medium);
        assert_eq!(confidence_for(2.0), Confidence::Low);
    }
}
