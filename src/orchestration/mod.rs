//! Snapshot ingestion and the batch metrics pass.

pub mod ingest;
pub mod orchestrator;

pub use ingest::{
    BalanceInput, IngestionError, IngestionResult, Ingestor, PlatformSnapshot, ReferenceSnapshot,
    TradeInput,
};
pub use orchestrator::{
    compute_all_metrics, compute_all_metrics_with, MetricsBatch, OrchestrationError,
    Orchestrator, SnapshotSet,
};
