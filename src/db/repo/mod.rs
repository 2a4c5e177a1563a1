//! Repository layer for the snapshot store.
//!
//! Methods are organized across submodules:
//! - `snapshots.rs` - balances, trades, open orders, tickers, market caps, strategies
//! - `assets.rs` - computed asset metrics records

mod assets;
mod snapshots;

use crate::datasource::{AssetStore, SnapshotError, SnapshotSource};
use crate::domain::{Asset, Balance, Decimal, MarketCap, OpenOrder, Side, Strategy, Ticker, Trade};
use async_trait::async_trait;
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::Row;

/// SQLite-backed store for snapshots and computed metrics.
#[derive(Debug, Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Repository { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn decimal_col(row: &SqliteRow, column: &str, kind: &'static str) -> Result<Decimal, SnapshotError> {
    let raw: String = row.try_get(column)?;
    Decimal::from_str_canonical(&raw).map_err(|e| SnapshotError::Decode {
        kind,
        message: format!("{} = {:?}: {}", column, raw, e),
    })
}

fn side_col(row: &SqliteRow, kind: &'static str) -> Result<Side, SnapshotError> {
    let raw: String = row.try_get("side")?;
    Side::parse(&raw).ok_or_else(|| SnapshotError::Decode {
        kind,
        message: format!("side = {:?}", raw),
    })
}

#[async_trait]
impl SnapshotSource for Repository {
    async fn fetch_balances(&self) -> Result<Vec<Balance>, SnapshotError> {
        self.query_balances(None).await
    }

    async fn fetch_trades(&self) -> Result<Vec<Trade>, SnapshotError> {
        self.query_trades(None, None).await
    }

    async fn fetch_open_orders(&self) -> Result<Vec<OpenOrder>, SnapshotError> {
        self.query_open_orders(None).await
    }

    async fn fetch_tickers(&self) -> Result<Vec<Ticker>, SnapshotError> {
        self.query_tickers().await
    }

    async fn fetch_market_caps(&self) -> Result<Vec<MarketCap>, SnapshotError> {
        self.query_market_caps().await
    }

    async fn fetch_strategies(&self) -> Result<Vec<Strategy>, SnapshotError> {
        self.query_strategies().await
    }
}

#[async_trait]
impl AssetStore for Repository {
    async fn save_assets(&self, assets: &[Asset]) -> Result<(), SnapshotError> {
        self.replace_assets(assets).await
    }

    async fn load_assets(&self) -> Result<Vec<Asset>, SnapshotError> {
        self.query_assets(None, None).await
    }
}
