use crate::api::AppState;
use crate::error::AppError;
use axum::extract::State;
use axum::Json;

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Ready once the snapshot store answers a query.
pub async fn ready(State(state): State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
    sqlx::query("SELECT 1")
        .execute(state.repo.pool())
        .await
        .map_err(|e| AppError::Internal(format!("Snapshot store not ready: {}", e)))?;
    let last_refresh = state.repo.last_computed_at().await?;

    Ok(Json(serde_json::json!({
        "status": "ready",
        "lastRefreshMs": last_refresh.map(|t| t.as_ms()),
    })))
}
