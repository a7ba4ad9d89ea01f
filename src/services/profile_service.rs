use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{
    ActiveModelTrait,
    ActiveValue,
    ColumnTrait,
    DatabaseConnection,
    EntityTrait,
    QueryFilter,
};
use uuid::Uuid;

use crate::db::entity::trading_profile;
use crate::enums::{ Horizon, RiskTolerance, TradingStyle };
use crate::error::{ AppError, Result };

/// Opening virtual balance for a new profile.
const DEFAULT_INITIAL_CASH: Decimal = dec!(10000);

#[derive(Debug, Clone)]
pub struct CreateProfileRequest {
    pub user_id: String,
    pub horizon: Horizon,
    pub risk_tolerance: RiskTolerance,
    pub trading_style: TradingStyle,
    pub target_profit_pct: Decimal,
    pub max_loss_pct: Decimal,
    pub preferred_sectors: Vec<String>,
    pub resuggest_dismissed_after_days: Option<i32>,
    pub initial_cash: Option<Decimal>,
}

#[derive(Clone)]
pub struct ProfileService {
    db: DatabaseConnection,
}

impl ProfileService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create_profile(&self, req: CreateProfileRequest) -> Result<trading_profile::Model> {
        if req.target_profit_pct <= Decimal::ZERO || req.max_loss_pct <= Decimal::ZERO {
            return Err(
                AppError::InvalidInput(
                    "target_profit_pct and max_loss_pct must be positive".to_string()
                )
            );
        }

        let existing = trading_profile::Entity
            ::find()
            .filter(trading_profile::Column::UserId.eq(&req.user_id))
            .one(&self.db).await?;

        if existing.is_some() {
            return Err(
                AppError::InvalidState(format!("User {} already has a trading profile", req.user_id))
            );
        }

        let now = Utc::now();
        let model = trading_profile::ActiveModel {
            id: ActiveValue::Set(Uuid::new_v4()),
            user_id: ActiveValue::Set(req.user_id),
            horizon: ActiveValue::Set(req.horizon.to_string()),
            risk_tolerance: ActiveValue::Set(req.risk_tolerance.to_string()),
            trading_style: ActiveValue::Set(req.trading_style.to_string()),
            target_profit_pct: ActiveValue::Set(req.target_profit_pct),
            max_loss_pct: ActiveValue::Set(req.max_loss_pct),
            preferred_sectors: ActiveValue::Set(serde_json::json!(req.preferred_sectors)),
            resuggest_dismissed_after_days: ActiveValue::Set(
                req.resuggest_dismissed_after_days.unwrap_or(7)
            ),
            cash_balance: ActiveValue::Set(req.initial_cash.unwrap_or(DEFAULT_INITIAL_CASH)),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
        };

        Ok(model.insert(&self.db).await?)
    }

    pub async fn get_profile(&self, id: Uuid) -> Result<trading_profile::Model> {
        trading_profile::Entity
            ::find_by_id(id)
            .one(&self.db).await?
            .ok_or(AppError::ProfileNotFound)
    }

    pub async fn get_by_user(&self, user_id: &str) -> Result<trading_profile::Model> {
        trading_profile::Entity
            ::find()
            .filter(trading_profile::Column::UserId.eq(user_id))
            .one(&self.db).await?
            .ok_or(AppError::ProfileNotFound)
    }
}
