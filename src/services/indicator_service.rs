use std::time::Duration;

use serde::{ Deserialize, Serialize };

use crate::enums::{ MacdSignal, MaPosition };
use crate::error::{ AppError, Result };

/// Folded view of the indicator supplier's recent readings for one asset.
/// Any field may be absent; absent fields simply contribute no rule hits.
#[derive(Debug, Clone, Default, Serialize)]
pub struct IndicatorSnapshot {
    pub rsi: Option<f64>,
    pub macd: Option<MacdSignal>,
    pub price_vs_ma20: Option<MaPosition>,
    pub price_vs_ma50: Option<MaPosition>,
    /// Aggregate news sentiment in [-1, 1].
    pub sentiment: Option<f64>,
    /// Current volume relative to the recent average.
    pub volume_ratio: Option<f64>,
}

impl IndicatorSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct IndicatorReading {
    pub indicator: String,
    #[serde(default)]
    pub signal: Option<String>,
    #[serde(default)]
    pub value: Option<f64>,
}

pub struct IndicatorService {
    client: reqwest::Client,
    base_url: String,
}

impl IndicatorService {
    pub fn new(base_url: String, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, base_url })
    }

    /// Fetch and fold the supplier's readings. A failing or empty supplier
    /// yields an empty snapshot, never an error: signals are still scored
    /// from price-derived rules alone.
    pub async fn get_snapshot(&self, symbol: &str) -> IndicatorSnapshot {
        match self.fetch_readings(symbol).await {
            Ok(readings) => fold_readings(&readings),
            Err(e) => {
                tracing::warn!("Indicator fetch failed for {}: {}", symbol, e);
                IndicatorSnapshot::empty()
            }
        }
    }

    async fn fetch_readings(&self, symbol: &str) -> Result<Vec<IndicatorReading>> {
        let url = format!(
            "{}/indicators?symbol={}",
            self.base_url,
            urlencoding::encode(symbol)
        );

        let response = self.client
            .get(&url)
            .send().await
            .map_err(|e| AppError::External(format!("Indicator API error: {}", e)))?;

        if !response.status().is_success() {
            return Err(
                AppError::External(
                    format!("Indicator API returned status: {}", response.status())
                )
            );
        }

        let readings: Vec<IndicatorReading> = response
            .json().await
            .map_err(|e| AppError::External(format!("Failed to parse indicator response: {}", e)))?;

        Ok(readings)
    }
}

/// Fold raw `{indicator, signal, value}` tuples into a snapshot. Later
/// readings of the same indicator win (the supplier returns newest-last).
pub fn fold_readings(readings: &[IndicatorReading]) -> IndicatorSnapshot {
    let mut snapshot = IndicatorSnapshot::empty();

    for reading in readings {
        match reading.indicator.to_uppercase().as_str() {
            "RSI" => {
                snapshot.rsi = reading.value;
            }
            "MACD" => {
                snapshot.macd = reading.signal.as_deref().and_then(|s| s.parse().ok());
            }
            "MA20" => {
                snapshot.price_vs_ma20 = reading.signal.as_deref().and_then(|s| s.parse().ok());
            }
            "MA50" => {
                snapshot.price_vs_ma50 = reading.signal.as_deref().and_then(|s| s.parse().ok());
            }
            "SENTIMENT" => {
                snapshot.sentiment = reading.value.map(|v| v.clamp(-1.0, 1.0));
            }
            "VOLUME_RATIO" => {
                snapshot.volume_ratio = reading.value;
            }
            other => {
                tracing::debug!("Ignoring unknown indicator '{}'", other);
            }
        }
    }

    snapshot
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(indicator: &str, signal: Option<&str>, value: Option<f64>) -> IndicatorReading {
        IndicatorReading {
            indicator: indicator.to_string(),
            signal: signal.map(|s| s.to_string()),
            value,
        }
    }

    #[test]
    fn folds_known_indicators() {
        let snapshot = fold_readings(
            &[
                reading("RSI", None, Some(28.5)),
                reading("MACD", Some("bullish"), None),
                reading("MA20", Some("above"), None),
                reading("SENTIMENT", None, Some(0.4)),
                reading("VOLUME_RATIO", None, Some(1.8)),
            ]
        );

        assert_eq!(snapshot.rsi, Some(28.5));
        assert_eq!(snapshot.macd, Some(MacdSignal::Bullish));
        assert_eq!(snapshot.price_vs_ma20, Some(MaPosition::Above));
        assert_eq!(snapshot.sentiment, Some(0.4));
        assert_eq!(snapshot.volume_ratio, Some(1.8));
    }

    #[test]
    fn sentiment_is_clamped() {
        let snapshot = fold_readings(&[reading("SENTIMENT", None, Some(3.0))]);
        assert_eq!(snapshot.sentiment, Some(1.0));
    }

    #[test]
    fn unknown_indicators_and_bad_signals_are_ignored() {
        let snapshot = fold_readings(
            &[
                reading("BOLLINGER", None, Some(1.0)),
                reading("MACD", Some("sideways"), None),
            ]
        );
        assert_eq!(snapshot.macd, None);
    }

    #[test]
    fn later_readings_win() {
        let snapshot = fold_readings(
            &[
                reading("RSI", None, Some(40.0)),
                reading("RSI", None, Some(72.0)),
            ]
        );
        assert_eq!(snapshot.rsi, Some(72.0));
    }
}
