use chrono::Utc;
use sea_orm::{
    ActiveModelTrait,
    ActiveValue,
    ColumnTrait,
    DatabaseConnection,
    EntityTrait,
    QueryFilter,
};
use uuid::Uuid;

use crate::db::entity::asset;
use crate::error::{ AppError, Result };
use crate::services::market_data_service::Quote;

#[derive(Clone)]
pub struct AssetService {
    db: DatabaseConnection,
}

impl AssetService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn get(&self, id: Uuid) -> Result<asset::Model> {
        asset::Entity::find_by_id(id).one(&self.db).await?.ok_or(AppError::AssetNotFound)
    }

    pub async fn find_by_symbol(&self, symbol: &str) -> Result<Option<asset::Model>> {
        let asset = asset::Entity
            ::find()
            .filter(asset::Column::Symbol.eq(symbol.to_uppercase()))
            .one(&self.db).await?;
        Ok(asset)
    }

    /// Find or register an asset row. Suggestion generation calls this for
    /// market-mover candidates that were never seen before.
    pub async fn get_or_create(
        &self,
        symbol: &str,
        name: &str,
        currency: &str,
        sector: Option<String>
    ) -> Result<asset::Model> {
        if let Some(existing) = self.find_by_symbol(symbol).await? {
            return Ok(existing);
        }

        let now = Utc::now();
        let model = asset::ActiveModel {
            id: ActiveValue::Set(Uuid::new_v4()),
            symbol: ActiveValue::Set(symbol.to_uppercase()),
            name: ActiveValue::Set(name.to_string()),
            currency: ActiveValue::Set(currency.to_uppercase()),
            sector: ActiveValue::Set(sector),
            current_price: ActiveValue::Set(None),
            previous_close: ActiveValue::Set(None),
            change_percent: ActiveValue::Set(None),
            volume: ActiveValue::Set(None),
            quoted_at: ActiveValue::Set(None),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
        };

        let created = model.insert(&self.db).await?;
        Ok(created)
    }

    /// Refresh the cached quote columns from a live observation.
    pub async fn apply_quote(&self, asset: asset::Model, quote: &Quote) -> Result<asset::Model> {
        let now = Utc::now();
        let mut active: asset::ActiveModel = asset.into();
        active.current_price = ActiveValue::Set(Some(quote.price));
        active.previous_close = ActiveValue::Set(quote.previous_close);
        active.change_percent = ActiveValue::Set(quote.change_percent);
        active.volume = ActiveValue::Set(quote.volume);
        active.quoted_at = ActiveValue::Set(Some(quote.fetched_at));
        active.updated_at = ActiveValue::Set(now);

        let updated = active.update(&self.db).await?;
        Ok(updated)
    }
}
