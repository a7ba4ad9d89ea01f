use axum::{ extract::{ Path, State }, Json };
use serde::{ Deserialize, Serialize };
use uuid::Uuid;

use crate::db::entity::trading_suggestion;
use crate::error::Result;

use super::AppState;

#[derive(Serialize)]
pub struct GenerateResponse {
    pub generated: usize,
}

pub async fn generate_suggestions(
    State(state): State<AppState>,
    Path(profile_id): Path<Uuid>
) -> Result<Json<GenerateResponse>> {
    let generated = state.suggestion_service.generate(profile_id).await?;
    Ok(Json(GenerateResponse { generated }))
}

pub async fn list_suggestions(
    State(state): State<AppState>,
    Path(profile_id): Path<Uuid>
) -> Result<Json<Vec<trading_suggestion::Model>>> {
    let suggestions = state.suggestion_service.list_pending(profile_id).await?;
    Ok(Json(suggestions))
}

#[derive(Deserialize)]
pub struct RespondBody {
    pub accept: bool,
}

pub async fn respond_to_suggestion(
    State(state): State<AppState>,
    Path(suggestion_id): Path<Uuid>,
    Json(body): Json<RespondBody>
) -> Result<Json<trading_suggestion::Model>> {
    let updated = state.suggestion_service.respond(suggestion_id, body.accept).await?;
    Ok(Json(updated))
}
