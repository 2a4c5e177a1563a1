//! Exchange and market snapshots consumed by the metrics engine.

use crate::domain::{Decimal, Platform, Side, Symbol, TimeMs};
use serde::{Deserialize, Serialize};

/// Latest held balance of one asset on one platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    pub base: Symbol,
    pub platform: Platform,
    pub balance: Decimal,
    pub available: Decimal,
}

impl Balance {
    pub fn new(base: Symbol, platform: Platform, balance: Decimal, available: Decimal) -> Self {
        Self {
            base,
            platform,
            balance,
            available,
        }
    }
}

/// A live, unfilled order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenOrder {
    #[serde(rename = "oId")]
    pub o_id: String,
    pub platform: Platform,
    /// Pair symbol, e.g. "ETH/USDT".
    pub symbol: String,
    /// Order type as reported by the exchange ("limit", "market", ...).
    #[serde(rename = "type")]
    pub order_type: String,
    pub side: Side,
    pub amount: Decimal,
    pub price: Decimal,
}

impl OpenOrder {
    /// Base asset of the order's pair ("ETH" for "ETH/USDT").
    pub fn base(&self) -> Symbol {
        Symbol::new(self.symbol.split('/').next().unwrap_or_default())
    }
}

/// Latest traded price of a pair on a platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticker {
    pub symbol: String,
    #[serde(rename = "timestamp")]
    pub time_ms: TimeMs,
    pub last: Decimal,
    pub platform: Platform,
}

/// Reference market data for an asset symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketCap {
    pub symbol: Symbol,
    pub name: String,
    pub price: Decimal,
    pub percent_change_24h: Decimal,
    pub percent_change_7d: Decimal,
    pub percent_change_30d: Decimal,
    pub percent_change_60d: Decimal,
    pub percent_change_90d: Decimal,
    pub cmc_rank: i64,
    /// CoinMarketCap numeric id, used for the icon URL.
    pub icon_id: Option<i64>,
}

impl MarketCap {
    pub fn icon_url(&self) -> Option<String> {
        self.icon_id.map(|id| {
            format!(
                "https://s2.coinmarketcap.com/static/img/coins/64x64/{}.png",
                id
            )
        })
    }
}
