use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{ DateTime, Utc };
use rust_decimal::Decimal;
use serde::{ Deserialize, Serialize };
use tokio::sync::RwLock;

use crate::enums::MoverCategory;
use crate::error::{ AppError, Result };

const CACHE_DURATION_SECS: i64 = 60;
const MAX_RETRIES: u32 = 3;

/// One observation from the market data feed.
#[derive(Debug, Clone, Serialize)]
pub struct Quote {
    pub symbol: String,
    pub price: Decimal,
    pub previous_close: Option<Decimal>,
    pub change_percent: Option<Decimal>,
    pub volume: Option<Decimal>,
    pub currency: String,
    pub fetched_at: DateTime<Utc>,
}

/// A candidate row from one of the market-mover category lists.
#[derive(Debug, Clone, Deserialize)]
pub struct MoverEntry {
    pub symbol: String,
    pub name: String,
    pub price: Decimal,
    #[serde(default)]
    pub change_percent: Option<Decimal>,
    pub currency: String,
    #[serde(default)]
    pub sector: Option<String>,
}

#[derive(Debug, Clone)]
struct CachedQuote {
    quote: Quote,
    fetched_at: DateTime<Utc>,
}

#[derive(Deserialize)]
struct QuoteResponse {
    symbol: String,
    price: Option<Decimal>,
    #[serde(default)]
    previous_close: Option<Decimal>,
    #[serde(default)]
    change_percent: Option<Decimal>,
    #[serde(default)]
    volume: Option<Decimal>,
    currency: Option<String>,
}

pub struct MarketDataService {
    client: reqwest::Client,
    base_url: String,
    cache: Arc<RwLock<HashMap<String, CachedQuote>>>,
}

impl MarketDataService {
    pub fn new(base_url: String, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            cache: Arc::new(RwLock::new(HashMap::new())),
        })
    }

    /// Get a quote for a symbol, served from the short-lived cache when
    /// fresh enough. Pass evaluation goes through here.
    pub async fn get_quote(&self, symbol: &str) -> Result<Quote> {
        let symbol_upper = symbol.to_uppercase();

        if let Some(cached) = self.get_from_cache(&symbol_upper).await {
            return Ok(cached);
        }

        let quote = self.fetch_quote(&symbol_upper).await?;
        self.update_cache(symbol_upper, quote.clone()).await;

        Ok(quote)
    }

    /// Get a quote bypassing the cache. Trade execution uses this: the
    /// executed price moves real balances, so a cached row is not
    /// acceptable there.
    pub async fn get_quote_fresh(&self, symbol: &str) -> Result<Quote> {
        let symbol_upper = symbol.to_uppercase();

        let quote = self.fetch_quote(&symbol_upper).await?;
        self.update_cache(symbol_upper, quote.clone()).await;

        Ok(quote)
    }

    /// Batch quotes for multiple symbols, cache-first.
    pub async fn get_quotes(&self, symbols: &[String]) -> Result<HashMap<String, Quote>> {
        let mut results = HashMap::new();
        let mut symbols_to_fetch = Vec::new();

        for symbol in symbols {
            let symbol_upper = symbol.to_uppercase();
            if let Some(cached) = self.get_from_cache(&symbol_upper).await {
                results.insert(symbol_upper, cached);
            } else {
                symbols_to_fetch.push(symbol_upper);
            }
        }

        if !symbols_to_fetch.is_empty() {
            let symbols_param = symbols_to_fetch.join(",");
            let url = format!(
                "{}/quotes?symbols={}",
                self.base_url,
                urlencoding::encode(&symbols_param)
            );

            let response = self.fetch_with_retry(&url).await?;

            let quotes: Vec<QuoteResponse> = response
                .json().await
                .map_err(|e| AppError::External(format!("Failed to parse quote batch: {}", e)))?;

            for raw in quotes {
                match Self::into_quote(raw) {
                    Ok(quote) => {
                        self.update_cache(quote.symbol.clone(), quote.clone()).await;
                        results.insert(quote.symbol.clone(), quote);
                    }
                    Err(e) => {
                        tracing::debug!("Skipping quote without price: {}", e);
                    }
                }
            }
        }

        Ok(results)
    }

    /// One ranked market-mover list.
    pub async fn get_movers(&self, category: MoverCategory) -> Result<Vec<MoverEntry>> {
        let url = format!("{}/movers?category={}", self.base_url, category);

        let response = self.fetch_with_retry(&url).await?;

        let movers: Vec<MoverEntry> = response
            .json().await
            .map_err(|e| AppError::External(format!("Failed to parse movers response: {}", e)))?;

        Ok(movers)
    }

    async fn fetch_quote(&self, symbol: &str) -> Result<Quote> {
        let url = format!("{}/quote?symbol={}", self.base_url, urlencoding::encode(symbol));

        let response = self.fetch_with_retry(&url).await?;

        let raw: QuoteResponse = response
            .json().await
            .map_err(|e| AppError::External(format!("Failed to parse quote response: {}", e)))?;

        Self::into_quote(raw)
    }

    fn into_quote(raw: QuoteResponse) -> Result<Quote> {
        let price = raw.price.ok_or_else(|| {
            AppError::DataUnavailable(format!("No current price for {}", raw.symbol))
        })?;

        Ok(Quote {
            symbol: raw.symbol.to_uppercase(),
            price,
            previous_close: raw.previous_close,
            change_percent: raw.change_percent,
            volume: raw.volume,
            currency: raw.currency.unwrap_or_else(|| "EUR".to_string()).to_uppercase(),
            fetched_at: Utc::now(),
        })
    }

    async fn get_from_cache(&self, symbol: &str) -> Option<Quote> {
        let cache = self.cache.read().await;
        if let Some(cached) = cache.get(symbol) {
            let age = Utc::now() - cached.fetched_at;
            if age.num_seconds() < CACHE_DURATION_SECS {
                return Some(cached.quote.clone());
            }
        }
        None
    }

    async fn update_cache(&self, symbol: String, quote: Quote) {
        let mut cache = self.cache.write().await;
        cache.insert(symbol, CachedQuote {
            quote,
            fetched_at: Utc::now(),
        });
    }

    /// Fetch a URL with retry on 429 rate-limit responses.
    async fn fetch_with_retry(&self, url: &str) -> Result<reqwest::Response> {
        let mut last_err = None;
        for attempt in 0..MAX_RETRIES {
            let response = self.client.get(url)
                .send().await
                .map_err(|e| AppError::External(format!("Market data API error: {}", e)))?;

            if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
                let wait_secs = 2u64.pow(attempt + 1);
                tokio::time::sleep(Duration::from_secs(wait_secs)).await;
                last_err = Some(AppError::External("Market data API rate limited".to_string()));
                continue;
            }

            if !response.status().is_success() {
                return Err(
                    AppError::External(
                        format!("Market data API returned status: {}", response.status())
                    )
                );
            }

            return Ok(response);
        }
        Err(
            last_err.unwrap_or_else(||
                AppError::External("Market data API request failed after retries".to_string())
            )
        )
    }
}
