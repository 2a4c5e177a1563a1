use crate::api::AppState;
use crate::error::AppError;
use crate::orchestration::{IngestionResult, PlatformSnapshot, ReferenceSnapshot};
use axum::extract::State;
use axum::Json;

pub async fn ingest_platform(
    State(state): State<AppState>,
    Json(snapshot): Json<PlatformSnapshot>,
) -> Result<Json<IngestionResult>, AppError> {
    if snapshot.platform.as_str().is_empty() {
        return Err(AppError::BadRequest("platform must not be empty".into()));
    }
    if snapshot.balances.iter().any(|b| b.balance.is_negative()) {
        return Err(AppError::BadRequest("balances must not be negative".into()));
    }

    let result = state.ingestor.ingest_platform(&snapshot).await?;
    Ok(Json(result))
}

pub async fn ingest_reference(
    State(state): State<AppState>,
    Json(snapshot): Json<ReferenceSnapshot>,
) -> Result<Json<serde_json::Value>, AppError> {
    state.ingestor.ingest_reference(&snapshot).await?;
    Ok(Json(serde_json::json!({
        "marketCaps": snapshot.market_caps.len(),
        "strategies": snapshot.strategies.len(),
    })))
}
