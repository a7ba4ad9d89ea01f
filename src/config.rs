use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub server_host: String,
    pub server_port: u16,
    /// Base URL of the market data feed (quotes + market movers).
    pub market_api_base_url: String,
    /// Base URL of the FX rate authority.
    pub fx_api_base_url: String,
    /// Base URL of the technical indicator supplier.
    pub indicator_api_base_url: String,
    /// Telegram bot token; the telegram channel is disabled when unset.
    pub telegram_bot_token: Option<String>,
    /// Gateway endpoint for email/push delivery; those channels are
    /// disabled when unset.
    pub notification_gateway_url: Option<String>,
    pub alert_interval_secs: u64,
    pub signal_interval_secs: u64,
    /// Upper bound on concurrently evaluated entities within one pass.
    pub pass_concurrency: usize,
    /// Timeout applied to every collaborator HTTP call.
    pub http_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenv::dotenv().ok();

        let database_url = env::var("DATABASE_URL")?;

        let server_host = env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let server_port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()?;

        let market_api_base_url = env::var("MARKET_API_BASE_URL")?;
        let fx_api_base_url = env::var("FX_API_BASE_URL")?;
        let indicator_api_base_url = env::var("INDICATOR_API_BASE_URL")?;

        let telegram_bot_token = env::var("TELEGRAM_BOT_TOKEN").ok();
        let notification_gateway_url = env::var("NOTIFICATION_GATEWAY_URL").ok();

        let alert_interval_secs = env::var("ALERT_INTERVAL_SECS")
            .unwrap_or_else(|_| "60".to_string())
            .parse()?;
        let signal_interval_secs = env::var("SIGNAL_INTERVAL_SECS")
            .unwrap_or_else(|_| "300".to_string())
            .parse()?;

        let pass_concurrency = env::var("PASS_CONCURRENCY")
            .unwrap_or_else(|_| "8".to_string())
            .parse()?;
        if pass_concurrency == 0 {
            return Err("PASS_CONCURRENCY must be at least 1".into());
        }

        let http_timeout_secs = env::var("HTTP_TIMEOUT_SECS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()?;

        Ok(Config {
            database_url,
            server_host,
            server_port,
            market_api_base_url,
            fx_api_base_url,
            indicator_api_base_url,
            telegram_bot_token,
            notification_gateway_url,
            alert_interval_secs,
            signal_interval_secs,
            pass_concurrency,
            http_timeout_secs,
        })
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}
