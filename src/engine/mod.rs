//! Pure computation engine for per-asset recovery and take-profit metrics.
//!
//! Data flows one way: trade aggregation, then recovery, then the take-profit
//! schedule, all joined per asset/platform by the composer.

use crate::domain::{Platform, Symbol};
use thiserror::Error;

pub mod composer;
pub mod recovery;
pub mod tags;
pub mod take_profit;
pub mod trade_aggregator;

pub use composer::{
    compose_asset_metrics, compose_asset_metrics_with, AssetInputs, OrderMatchTolerance,
};
pub use recovery::{calculate_recovery, Recovery};
pub use take_profit::{allocate_take_profits, TakeProfitInput, TakeProfitTarget};
pub use trade_aggregator::{get_total_amount_and_buy, get_total_sell, BuyTotals};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MetricsError {
    #[error("insufficient data to compute metrics for {base} on {platform}")]
    InsufficientData { base: Symbol, platform: Platform },
}
