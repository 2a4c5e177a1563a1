//! Snapshot sources feeding the metrics engine, and the sink for computed records.

use crate::domain::{Asset, Balance, MarketCap, OpenOrder, Strategy, Ticker, Trade};
use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

pub mod mock;

pub use mock::MockSnapshotSource;

/// Read access to the latest balance/trade/order/market snapshots.
///
/// Implementations return every record they hold; per-asset joins happen in
/// the orchestrator.
#[async_trait]
pub trait SnapshotSource: Send + Sync + fmt::Debug {
    async fn fetch_balances(&self) -> Result<Vec<Balance>, SnapshotError>;

    async fn fetch_trades(&self) -> Result<Vec<Trade>, SnapshotError>;

    async fn fetch_open_orders(&self) -> Result<Vec<OpenOrder>, SnapshotError>;

    async fn fetch_tickers(&self) -> Result<Vec<Ticker>, SnapshotError>;

    async fn fetch_market_caps(&self) -> Result<Vec<MarketCap>, SnapshotError>;

    async fn fetch_strategies(&self) -> Result<Vec<Strategy>, SnapshotError>;
}

/// Storage for computed asset records.
#[async_trait]
pub trait AssetStore: Send + Sync + fmt::Debug {
    /// Replace every stored record with `assets`.
    async fn save_assets(&self, assets: &[Asset]) -> Result<(), SnapshotError>;

    async fn load_assets(&self) -> Result<Vec<Asset>, SnapshotError>;
}

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error(transparent)]
    Db(#[from] sqlx::Error),
    #[error("failed to decode stored {kind}: {message}")]
    Decode { kind: &'static str, message: String },
    #[error("snapshot source unavailable: {0}")]
    Unavailable(String),
}

impl From<serde_json::Error> for SnapshotError {
    fn from(err: serde_json::Error) -> Self {
        SnapshotError::Decode {
            kind: "json",
            message: err.to_string(),
        }
    }
}
