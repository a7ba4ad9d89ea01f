use finwatch::{ Config, Result };
use axum::{ Router, routing::{ delete, get, post } };
use migration::MigratorTrait;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing_subscriber::{ layer::SubscriberExt, util::SubscriberInitExt };

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber
        ::registry()
        .with(
            tracing_subscriber::EnvFilter
                ::try_from_default_env()
                .unwrap_or_else(|_| "finwatch=debug,tower_http=debug".into())
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env().map_err(|e| finwatch::AppError::Config(e.to_string()))?;

    // Initialize database connection
    let db = sea_orm::Database
        ::connect(&config.database_url).await
        .map_err(finwatch::AppError::Database)?;

    tracing::info!("Database connected successfully");

    // Run migrations
    migration::Migrator::up(&db, None).await.map_err(finwatch::AppError::Database)?;

    tracing::info!("Migrations completed successfully");

    // Collaborator clients, constructed once and injected everywhere.
    let timeout = config.http_timeout();
    let market = Arc::new(
        finwatch::services::MarketDataService::new(config.market_api_base_url.clone(), timeout)?
    );
    let fx = Arc::new(
        finwatch::services::FxService::new(config.fx_api_base_url.clone(), timeout)?
    );
    let indicators = Arc::new(
        finwatch::services::IndicatorService::new(config.indicator_api_base_url.clone(), timeout)?
    );
    let notifier = Arc::new(
        finwatch::services::NotificationService::new(
            config.telegram_bot_token.clone(),
            config.notification_gateway_url.clone(),
            timeout
        )?
    );

    // Core services
    let alert_service = Arc::new(finwatch::services::AlertService::new(db.clone()));
    let asset_service = Arc::new(finwatch::services::AssetService::new(db.clone()));
    let profile_service = Arc::new(finwatch::services::ProfileService::new(db.clone()));
    let trade_service = Arc::new(
        finwatch::services::TradeService::new(db.clone(), market.clone(), fx.clone())
    );
    let signal_service = Arc::new(
        finwatch::services::SignalService::new(
            db.clone(),
            market.clone(),
            fx.clone(),
            indicators.clone(),
            notifier.clone()
        )
    );
    let suggestion_service = Arc::new(
        finwatch::services::SuggestionService::new(
            db.clone(),
            market.clone(),
            trade_service.clone()
        )
    );
    let portfolio_service = Arc::new(
        finwatch::services::PortfolioService::new(db.clone(), market.clone(), fx.clone())
    );

    // Evaluation schedulers, each on its own timer.
    let alert_checker = Arc::new(
        finwatch::alert_checker::AlertChecker::new(
            db.clone(),
            market.clone(),
            fx.clone(),
            notifier.clone(),
            config.alert_interval_secs,
            config.pass_concurrency
        )
    );
    let signal_scheduler = Arc::new(
        finwatch::scheduler::SignalScheduler::new(
            db.clone(),
            trade_service.clone(),
            signal_service.clone(),
            fx.clone(),
            config.signal_interval_secs,
            config.pass_concurrency
        )
    );

    tokio::spawn(alert_checker.clone().start());
    tokio::spawn(signal_scheduler.start());
    tracing::info!(
        "Schedulers started (alerts every {}s, signals every {}s)",
        config.alert_interval_secs,
        config.signal_interval_secs
    );

    // Create app state
    let app_state = finwatch::api::AppState {
        alert_service,
        asset_service,
        profile_service,
        trade_service,
        signal_service,
        suggestion_service,
        portfolio_service,
        alert_checker,
    };

    // Build application router
    let app = Router::new()
        .route("/health", get(health_check))
        .route("/api/alerts", post(finwatch::api::alert::create_alert))
        .route("/api/alerts/evaluate", post(finwatch::api::alert::evaluate_now))
        .route("/api/alerts/{id}/track", get(finwatch::api::alert::get_price_track))
        .route("/api/users/{user_id}/alerts", get(finwatch::api::alert::list_alerts))
        .route(
            "/api/users/{user_id}/alerts/{alert_id}",
            delete(finwatch::api::alert::delete_alert)
        )
        .route(
            "/api/users/{user_id}/alerts/{alert_id}/status",
            post(finwatch::api::alert::update_alert_status)
        )
        .route("/api/users/{user_id}/portfolio", get(finwatch::api::trading::get_portfolio))
        .route("/api/profiles", post(finwatch::api::trading::create_profile))
        .route("/api/profiles/{id}", get(finwatch::api::trading::get_profile))
        .route(
            "/api/profiles/{id}/assets",
            post(finwatch::api::trading::add_trading_asset).get(
                finwatch::api::trading::list_trading_assets
            )
        )
        .route(
            "/api/profiles/{id}/suggestions",
            get(finwatch::api::suggestion::list_suggestions)
        )
        .route(
            "/api/profiles/{id}/suggestions/generate",
            post(finwatch::api::suggestion::generate_suggestions)
        )
        .route(
            "/api/suggestions/{id}/respond",
            post(finwatch::api::suggestion::respond_to_suggestion)
        )
        .route(
            "/api/trading-assets/{id}/analyze",
            post(finwatch::api::trading::analyze_trading_asset)
        )
        .route("/api/trading-assets/{id}/signals", get(finwatch::api::trading::list_signals))
        .route("/api/trading-assets/{id}/buy", post(finwatch::api::trading::execute_buy))
        .route("/api/trading-assets/{id}/sell", post(finwatch::api::trading::execute_sell))
        .with_state(app_state)
        .layer(CorsLayer::permissive());

    // Start server
    let addr = format!("{}:{}", config.server_host, config.server_port);
    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener
        ::bind(&addr).await
        .map_err(|e| finwatch::AppError::Internal(e.to_string()))?;

    axum::serve(listener, app).await.map_err(|e| finwatch::AppError::Internal(e.to_string()))?;

    Ok(())
}

async fn health_check() -> &'static str {
    "OK"
}
