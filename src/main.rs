use anyhow::Context;
use shadfolio::engine::OrderMatchTolerance;
use shadfolio::orchestration::{Ingestor, Orchestrator};
use shadfolio::{api, config::Config, db::init_db, Repository};
use std::net::SocketAddr;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into()),
        )
        .init();

    let config = Config::from_env().context("Configuration error")?;
    let port = config.port;

    let pool = init_db(&config.database_path)
        .await
        .with_context(|| format!("Failed to initialize database at {}", config.database_path))?;

    let repo = Arc::new(Repository::new(pool));
    let tolerance = OrderMatchTolerance {
        amount_rel: config.order_match_tolerance,
        price_rel: config.order_match_tolerance,
    };
    let orchestrator = Arc::new(
        Orchestrator::new(repo.clone(), repo.clone()).with_tolerance(tolerance),
    );
    let ingestor = Arc::new(Ingestor::new(repo.clone(), config.conversion_rates.clone()));

    if !config.conversion_rates.is_empty() {
        tracing::info!(
            "Loaded {} quote conversion rates",
            config.conversion_rates.len()
        );
    }

    let app = api::create_router(api::AppState::new(repo, orchestrator, ingestor));

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
