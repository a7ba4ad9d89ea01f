use axum::{ extract::{ Path, State }, Json };
use rust_decimal::Decimal;
use serde::{ Deserialize, Serialize };
use uuid::Uuid;

use crate::db::entity::{ alert, alert_price_track };
use crate::error::Result;
use crate::services::alert_service::CreateAlertRequest;

use super::AppState;

#[derive(Deserialize)]
pub struct CreateAlertBody {
    pub user_id: String,
    pub symbol: String,
    pub kind: String,
    pub threshold: Decimal,
    pub channels: Vec<String>,
}

pub async fn create_alert(
    State(state): State<AppState>,
    Json(body): Json<CreateAlertBody>
) -> Result<Json<alert::Model>> {
    let asset = state.asset_service
        .find_by_symbol(&body.symbol).await?
        .ok_or(crate::error::AppError::AssetNotFound)?;

    let channels = body.channels
        .iter()
        .map(|c| c.parse())
        .collect::<Result<Vec<_>>>()?;

    let created = state.alert_service.create_alert(CreateAlertRequest {
        user_id: body.user_id,
        asset_id: asset.id,
        kind: body.kind.parse()?,
        threshold: body.threshold,
        channels,
    }).await?;

    Ok(Json(created))
}

pub async fn list_alerts(
    State(state): State<AppState>,
    Path(user_id): Path<String>
) -> Result<Json<Vec<alert::Model>>> {
    let alerts = state.alert_service.list_user_alerts(&user_id, false).await?;
    Ok(Json(alerts))
}

pub async fn delete_alert(
    State(state): State<AppState>,
    Path((user_id, alert_id)): Path<(String, Uuid)>
) -> Result<Json<serde_json::Value>> {
    state.alert_service.delete_alert(alert_id, &user_id).await?;
    Ok(Json(serde_json::json!({ "deleted": true })))
}

pub async fn get_price_track(
    State(state): State<AppState>,
    Path(alert_id): Path<Uuid>
) -> Result<Json<Vec<alert_price_track::Model>>> {
    let samples = state.alert_service.recent_price_track(alert_id).await?;
    Ok(Json(samples))
}

#[derive(Deserialize)]
pub struct UpdateStatusBody {
    pub status: String,
}

pub async fn update_alert_status(
    State(state): State<AppState>,
    Path((user_id, alert_id)): Path<(String, Uuid)>,
    Json(body): Json<UpdateStatusBody>
) -> Result<Json<alert::Model>> {
    let updated = state.alert_service
        .update_status(alert_id, &user_id, body.status.parse()?).await?;
    Ok(Json(updated))
}

#[derive(Serialize)]
pub struct EvaluateResponse {
    pub status: &'static str,
}

/// Kick one alert pass outside the scheduler's cadence.
pub async fn evaluate_now(State(state): State<AppState>) -> Result<Json<EvaluateResponse>> {
    state.alert_checker.run_pass().await?;
    Ok(Json(EvaluateResponse { status: "ok" }))
}
