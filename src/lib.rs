pub mod api;
pub mod config;
pub mod datasource;
pub mod db;
pub mod domain;
pub mod engine;
pub mod error;
pub mod orchestration;

pub use config::Config;
pub use datasource::{AssetStore, MockSnapshotSource, SnapshotError, SnapshotSource};
pub use db::{init_db, Repository};
pub use domain::{
    Asset, Balance, ConversionRates, Decimal, MarketCap, OpenOrder, Platform, Side, Strategy,
    StrategyName, Symbol, Ticker, TimeMs, Trade,
};
pub use engine::{compose_asset_metrics, MetricsError};
pub use error::AppError;
pub use orchestration::{compute_all_metrics, MetricsBatch, Orchestrator, SnapshotSet};
