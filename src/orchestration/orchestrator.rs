use crate::datasource::{AssetStore, SnapshotError, SnapshotSource};
use crate::domain::{Asset, Balance, MarketCap, OpenOrder, Strategy, Ticker, Trade};
use crate::engine::tags::is_major_stablecoin;
use crate::engine::{compose_asset_metrics_with, AssetInputs, MetricsError, OrderMatchTolerance};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// Every collection one metrics pass reads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotSet {
    pub balances: Vec<Balance>,
    pub trades: Vec<Trade>,
    pub open_orders: Vec<OpenOrder>,
    pub tickers: Vec<Ticker>,
    pub market_caps: Vec<MarketCap>,
    pub strategies: Vec<Strategy>,
}

/// Result of one pass: composed records plus the balances left out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetricsBatch {
    pub assets: Vec<Asset>,
    pub skipped: Vec<MetricsError>,
}

#[derive(Debug, Clone)]
pub struct Orchestrator {
    source: Arc<dyn SnapshotSource>,
    store: Arc<dyn AssetStore>,
    tolerance: OrderMatchTolerance,
}

impl Orchestrator {
    pub fn new(source: Arc<dyn SnapshotSource>, store: Arc<dyn AssetStore>) -> Self {
        Self {
            source,
            store,
            tolerance: OrderMatchTolerance::default(),
        }
    }

    pub fn with_tolerance(mut self, tolerance: OrderMatchTolerance) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Fetch all six snapshot collections at once.
    pub async fn load_snapshots(&self) -> Result<SnapshotSet, OrchestrationError> {
        let (balances, trades, open_orders, tickers, market_caps, strategies) = futures::try_join!(
            self.source.fetch_balances(),
            self.source.fetch_trades(),
            self.source.fetch_open_orders(),
            self.source.fetch_tickers(),
            self.source.fetch_market_caps(),
            self.source.fetch_strategies(),
        )?;

        Ok(SnapshotSet {
            balances,
            trades,
            open_orders,
            tickers,
            market_caps,
            strategies,
        })
    }

    pub async fn calculate_all_metrics(&self) -> Result<MetricsBatch, OrchestrationError> {
        let snapshots = self.load_snapshots().await?;
        Ok(compute_all_metrics_with(&snapshots, &self.tolerance))
    }

    /// Recompute every record and replace the stored set.
    pub async fn refresh(&self) -> Result<MetricsBatch, OrchestrationError> {
        let batch = self.calculate_all_metrics().await?;
        self.store.save_assets(&batch.assets).await?;
        info!(
            "Refreshed metrics: {} assets stored, {} skipped",
            batch.assets.len(),
            batch.skipped.len()
        );
        Ok(batch)
    }
}

pub fn compute_all_metrics(snapshots: &SnapshotSet) -> MetricsBatch {
    compute_all_metrics_with(snapshots, &OrderMatchTolerance::default())
}

/// Compose one record per held balance, in balance order.
pub fn compute_all_metrics_with(
    snapshots: &SnapshotSet,
    tolerance: &OrderMatchTolerance,
) -> MetricsBatch {
    let mut batch = MetricsBatch::default();

    for balance in snapshots.balances.iter().filter(|b| b.balance.is_positive()) {
        match compose_one(snapshots, balance, tolerance) {
            Ok(asset) => batch.assets.push(asset),
            Err(err) => {
                warn!("Skipping asset: {}", err);
                batch.skipped.push(err);
            }
        }
    }

    batch
}

fn compose_one(
    snapshots: &SnapshotSet,
    balance: &Balance,
    tolerance: &OrderMatchTolerance,
) -> Result<Asset, MetricsError> {
    let base = &balance.base;
    let platform = &balance.platform;
    let pair = base.usdt_pair();

    let market_cap = snapshots.market_caps.iter().find(|c| &c.symbol == base);
    let has_trades = snapshots.trades.iter().any(|t| &t.base == base);
    let has_orders = snapshots.open_orders.iter().any(|o| &o.base() == base);
    let has_tickers = snapshots
        .tickers
        .iter()
        .any(|t| t.symbol.eq_ignore_ascii_case(&pair));

    if market_cap.is_none()
        && !has_trades
        && !has_orders
        && !has_tickers
        && !is_major_stablecoin(base)
    {
        return Err(MetricsError::InsufficientData {
            base: base.clone(),
            platform: platform.clone(),
        });
    }

    let trades: Vec<Trade> = snapshots
        .trades
        .iter()
        .filter(|t| &t.base == base && &t.platform == platform)
        .cloned()
        .collect();
    let open_orders: Vec<OpenOrder> = snapshots
        .open_orders
        .iter()
        .filter(|o| &o.platform == platform && &o.base() == base)
        .cloned()
        .collect();
    let tickers: Vec<Ticker> = snapshots
        .tickers
        .iter()
        .filter(|t| &t.platform == platform)
        .cloned()
        .collect();
    let strategy = snapshots.strategies.iter().find(|s| &s.asset == base);

    let inputs = AssetInputs {
        base,
        platform,
        balance: balance.balance,
        market_cap,
        trades: &trades,
        open_orders: &open_orders,
        strategy,
        tickers: &tickers,
    };
    Ok(compose_asset_metrics_with(&inputs, tolerance))
}

#[derive(Debug, Error)]
pub enum OrchestrationError {
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}
