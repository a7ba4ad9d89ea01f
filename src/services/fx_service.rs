use std::collections::HashMap;
use std::time::Duration;

use chrono::{ DateTime, Utc };
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{ AppError, Result };
use crate::money::{ round_rate, FxRates };

/// Currency → EUR rate source with a three-stage fallback chain:
/// primary HTTP authority → last-known-good cached value → hardcoded
/// approximate constant. A rate outside the per-currency plausibility
/// band falls through to the next stage.
pub struct FxService {
    client: reqwest::Client,
    base_url: String,
    last_known_good: Arc<RwLock<HashMap<String, (Decimal, DateTime<Utc>)>>>,
}

#[derive(Deserialize)]
struct RateResponse {
    rates: HashMap<String, Decimal>,
}

impl FxService {
    pub fn new(base_url: String, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            last_known_good: Arc::new(RwLock::new(HashMap::new())),
        })
    }

    /// Resolve one rate snapshot for an evaluation pass. Fetched once per
    /// pass and passed down read-only; entities never refetch. A currency
    /// whose whole fallback chain comes up empty is simply absent from the
    /// snapshot (callers treat that as missing data for the entity).
    pub async fn snapshot(&self, currencies: &[String]) -> FxRates {
        let mut rates = HashMap::new();

        for currency in currencies {
            let currency = currency.to_uppercase();
            if currency == "EUR" || rates.contains_key(&currency) {
                continue;
            }

            match self.resolve_rate(&currency).await {
                Some(rate) => {
                    rates.insert(currency, rate);
                }
                None => {
                    tracing::warn!("No EUR rate available for {} in this pass", currency);
                }
            }
        }

        FxRates::new(rates, Utc::now())
    }

    async fn resolve_rate(&self, currency: &str) -> Option<Decimal> {
        match self.fetch_rate(currency).await {
            Ok(rate) if within_band(currency, rate) => {
                let rate = round_rate(rate);
                let mut lkg = self.last_known_good.write().await;
                lkg.insert(currency.to_string(), (rate, Utc::now()));
                return Some(rate);
            }
            Ok(rate) => {
                tracing::warn!(
                    "FX authority returned implausible {}→EUR rate {}, falling back",
                    currency,
                    rate
                );
            }
            Err(e) => {
                tracing::warn!("FX fetch failed for {}: {}, falling back", currency, e);
            }
        }

        {
            let lkg = self.last_known_good.read().await;
            if let Some((rate, fetched_at)) = lkg.get(currency) {
                tracing::warn!(
                    "Using last-known-good {}→EUR rate {} from {}",
                    currency,
                    rate,
                    fetched_at
                );
                return Some(*rate);
            }
        }

        let fallback = fallback_rate(currency);
        if let Some(rate) = fallback {
            tracing::warn!("Using hardcoded approximate {}→EUR rate {}", currency, rate);
        }
        fallback
    }

    async fn fetch_rate(&self, currency: &str) -> Result<Decimal> {
        let url = format!("{}/latest?from={}&to=EUR", self.base_url, currency);

        let response = self.client
            .get(&url)
            .send().await
            .map_err(|e| AppError::External(format!("FX API error: {}", e)))?;

        if !response.status().is_success() {
            return Err(
                AppError::External(format!("FX API returned status: {}", response.status()))
            );
        }

        let body: RateResponse = response
            .json().await
            .map_err(|e| AppError::External(format!("Failed to parse FX response: {}", e)))?;

        body.rates
            .get("EUR")
            .copied()
            .ok_or_else(|| AppError::RateUnavailable(currency.to_string()))
    }
}

/// Plausibility band for a currency→EUR rate. Majors trade near parity
/// with the euro; low-unit currencies like JPY get a proportionally lower
/// band; anything unknown gets a wide positive one.
pub fn within_band(currency: &str, rate: Decimal) -> bool {
    if rate <= Decimal::ZERO {
        return false;
    }
    let (lo, hi) = match currency {
        "USD" | "GBP" | "CHF" | "CAD" | "AUD" | "NZD" | "SGD" => (dec!(0.5), dec!(2)),
        "JPY" | "KRW" | "HUF" | "ISK" => (dec!(0.0005), dec!(0.05)),
        "SEK" | "NOK" | "DKK" | "CNY" | "HKD" | "PLN" | "CZK" | "TRY" | "MXN" | "ZAR" | "INR" =>
            (dec!(0.01), dec!(0.5)),
        _ => (dec!(0.0001), dec!(1000)),
    };
    rate >= lo && rate <= hi
}

/// Hardcoded approximate rates, the last stage of the fallback chain.
pub fn fallback_rate(currency: &str) -> Option<Decimal> {
    let rate = match currency {
        "USD" => dec!(0.92),
        "GBP" => dec!(1.17),
        "CHF" => dec!(1.04),
        "JPY" => dec!(0.0062),
        "SEK" => dec!(0.088),
        "NOK" => dec!(0.086),
        "DKK" => dec!(0.134),
        "CAD" => dec!(0.67),
        "AUD" => dec!(0.60),
        "CNY" => dec!(0.128),
        "HKD" => dec!(0.118),
        "PLN" => dec!(0.23),
        _ => {
            return None;
        }
    };
    Some(rate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_and_zero_rates_are_rejected() {
        assert!(!within_band("USD", Decimal::ZERO));
        assert!(!within_band("USD", dec!(-0.9)));
    }

    #[test]
    fn major_currency_band() {
        assert!(within_band("USD", dec!(0.92)));
        assert!(!within_band("USD", dec!(12.5)));
        assert!(!within_band("USD", dec!(0.009)));
    }

    #[test]
    fn low_unit_currency_band() {
        assert!(within_band("JPY", dec!(0.0062)));
        assert!(!within_band("JPY", dec!(0.92)));
    }

    #[test]
    fn unknown_currency_gets_wide_band() {
        assert!(within_band("XXX", dec!(500)));
        assert!(!within_band("XXX", dec!(-1)));
    }

    #[test]
    fn fallback_table_covers_majors_only() {
        assert_eq!(fallback_rate("USD"), Some(dec!(0.92)));
        assert_eq!(fallback_rate("XXX"), None);
    }
}
