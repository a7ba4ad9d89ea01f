use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")] Database(#[from] sea_orm::DbErr),

    #[error("Invalid input: {0}")] InvalidInput(String),

    #[error("Alert not found")]
    AlertNotFound,

    #[error("Trading profile not found")]
    ProfileNotFound,

    #[error("Trading asset not found")]
    TradingAssetNotFound,

    #[error("Asset not found")]
    AssetNotFound,

    #[error("No market data available: {0}")] DataUnavailable(String),

    #[error("FX rate unavailable for {0}")] RateUnavailable(String),

    #[error("Insufficient funds: balance {balance} EUR, required {required} EUR")] InsufficientFunds {
        balance: rust_decimal::Decimal,
        required: rust_decimal::Decimal,
    },

    #[error("Invalid state: {0}")] InvalidState(String),

    #[error("Alert kind '{0}' has no evaluation rule and cannot be created")] UnsupportedAlertKind(
        String,
    ),

    #[error("External API error: {0}")] External(String),

    #[error("Configuration error: {0}")] Config(String),

    #[error("Internal error: {0}")] Internal(String),
}

#[derive(serde::Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(serde::Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl AppError {
    pub fn to_error_response(&self) -> ErrorResponse {
        let (code, message, field) = match self {
            AppError::Database(e) => ("DATABASE_ERROR", e.to_string(), None),
            AppError::InvalidInput(msg) => ("INVALID_INPUT", msg.clone(), None),
            AppError::AlertNotFound => ("ALERT_NOT_FOUND", "Alert not found".to_string(), None),
            AppError::ProfileNotFound =>
                ("PROFILE_NOT_FOUND", "Trading profile not found".to_string(), None),
            AppError::TradingAssetNotFound =>
                ("TRADING_ASSET_NOT_FOUND", "Trading asset not found".to_string(), None),
            AppError::AssetNotFound => ("ASSET_NOT_FOUND", "Asset not found".to_string(), None),
            AppError::DataUnavailable(msg) => ("DATA_UNAVAILABLE", msg.clone(), None),
            AppError::RateUnavailable(cur) =>
                ("RATE_UNAVAILABLE", format!("FX rate unavailable for {}", cur), None),
            AppError::InsufficientFunds { .. } =>
                ("INSUFFICIENT_FUNDS", self.to_string(), None),
            AppError::InvalidState(msg) => ("INVALID_STATE", msg.clone(), None),
            AppError::UnsupportedAlertKind(_) =>
                ("UNSUPPORTED_ALERT_KIND", self.to_string(), Some("kind".to_string())),
            AppError::External(msg) => ("EXTERNAL_ERROR", msg.clone(), None),
            AppError::Config(msg) => ("CONFIG_ERROR", msg.clone(), None),
            AppError::Internal(msg) => ("INTERNAL_ERROR", msg.clone(), None),
        };

        ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message,
                field,
            },
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            | AppError::AlertNotFound
            | AppError::ProfileNotFound
            | AppError::TradingAssetNotFound
            | AppError::AssetNotFound => axum::http::StatusCode::NOT_FOUND,
            | AppError::InvalidInput(_)
            | AppError::UnsupportedAlertKind(_)
            | AppError::InsufficientFunds { .. } => axum::http::StatusCode::BAD_REQUEST,
            AppError::InvalidState(_) => axum::http::StatusCode::CONFLICT,
            | AppError::DataUnavailable(_)
            | AppError::RateUnavailable(_)
            | AppError::External(_) => axum::http::StatusCode::BAD_GATEWAY,
            _ => axum::http::StatusCode::INTERNAL_SERVER_ERROR,
        };

        let response = self.to_error_response();
        (status, axum::Json(response)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
