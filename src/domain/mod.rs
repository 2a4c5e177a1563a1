//! Domain types for portfolio snapshots and computed asset metrics.
//!
//! This module provides:
//! - Lossless numeric handling via the Decimal wrapper
//! - Domain primitives: TimeMs, Symbol, Platform, Exchange, Side
//! - Snapshot records: Trade, Balance, OpenOrder, Ticker, MarketCap, Strategy
//! - The computed Asset metrics record

pub mod asset;
pub mod decimal;
pub mod market;
pub mod primitives;
pub mod strategy;
pub mod trade;

pub use asset::{
    Asset, AssetTag, CmcData, LiveData, OpenOrdersData, OrdersData, StratData, TakeProfit,
    TakeProfits, TradeData,
};
pub use decimal::Decimal;
pub use market::{Balance, MarketCap, OpenOrder, Ticker};
pub use primitives::{Exchange, Platform, Side, Symbol, TimeMs};
pub use strategy::{Strategy, StrategyName, DEFAULT_MAX_EXPOSURE};
pub use trade::{ConversionRates, Trade, USD_QUOTES};
