use crate::api::AppState;
use crate::domain::{Asset, Platform, Symbol};
use crate::engine::MetricsError;
use crate::error::AppError;
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct AssetsQuery {
    pub platform: Option<String>,
    pub base: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetsResponse {
    pub assets: Vec<Asset>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub computed: usize,
    pub skipped: Vec<SkippedAssetDto>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedAssetDto {
    pub base: String,
    pub platform: String,
    pub reason: String,
}

impl From<&MetricsError> for SkippedAssetDto {
    fn from(err: &MetricsError) -> Self {
        match err {
            MetricsError::InsufficientData { base, platform } => SkippedAssetDto {
                base: base.to_string(),
                platform: platform.to_string(),
                reason: err.to_string(),
            },
        }
    }
}

fn parse_non_empty(field: &str, value: Option<&str>) -> Result<Option<String>, AppError> {
    match value.map(str::trim) {
        None => Ok(None),
        Some("") => Err(AppError::BadRequest(format!("{} must not be empty", field))),
        Some(v) => Ok(Some(v.to_string())),
    }
}

pub async fn list_assets(
    Query(params): Query<AssetsQuery>,
    State(state): State<AppState>,
) -> Result<Json<AssetsResponse>, AppError> {
    let platform = parse_non_empty("platform", params.platform.as_deref())?.map(Platform::new);
    let base = parse_non_empty("base", params.base.as_deref())?.map(Symbol::new);

    let assets = state
        .repo
        .query_assets(platform.as_ref(), base.as_ref())
        .await?;

    Ok(Json(AssetsResponse { assets }))
}

pub async fn get_asset(
    Path((platform, base)): Path<(String, String)>,
    State(state): State<AppState>,
) -> Result<Json<Asset>, AppError> {
    let platform = Platform::new(&platform);
    let base = Symbol::new(&base);

    state
        .repo
        .query_assets(Some(&platform), Some(&base))
        .await?
        .into_iter()
        .next()
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("no metrics for {} on {}", base, platform)))
}

pub async fn refresh_assets(
    State(state): State<AppState>,
) -> Result<Json<RefreshResponse>, AppError> {
    let batch = state.orchestrator.refresh().await?;

    Ok(Json(RefreshResponse {
        computed: batch.assets.len(),
        skipped: batch.skipped.iter().map(SkippedAssetDto::from).collect(),
    }))
}
