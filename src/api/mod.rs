pub mod assets;
pub mod health;
pub mod snapshots;

use crate::db::Repository;
use crate::orchestration::{Ingestor, Orchestrator};
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub orchestrator: Arc<Orchestrator>,
    pub ingestor: Arc<Ingestor>,
}

impl AppState {
    pub fn new(
        repo: Arc<Repository>,
        orchestrator: Arc<Orchestrator>,
        ingestor: Arc<Ingestor>,
    ) -> Self {
        Self {
            repo,
            orchestrator,
            ingestor,
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .route("/v1/assets", get(assets::list_assets))
        .route("/v1/assets/refresh", post(assets::refresh_assets))
        .route("/v1/assets/:platform/:base", get(assets::get_asset))
        .route("/v1/snapshots/platform", post(snapshots::ingest_platform))
        .route("/v1/snapshots/reference", post(snapshots::ingest_reference))
        .layer(cors)
        .with_state(state)
}
