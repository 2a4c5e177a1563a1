//! Computed per-asset, per-platform metrics record.
//!
//! `Asset::new` returns the sentinel record every composed asset starts from:
//! unknown values are `None` (JSON `null`), counts and reference data are zero.

use crate::domain::{Decimal, OpenOrder, Platform, StrategyName, Symbol};
use serde::{Deserialize, Serialize};

/// Static classification of an asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetTag {
    Stablecoin,
    Depin,
    Gaming,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub base: Symbol,
    pub platform: Platform,
    /// Pair used for price lookup, e.g. "ETH/USDT".
    pub ticker: String,
    pub name: String,
    pub icon_url: Option<String>,
    pub tags: Vec<AssetTag>,
    pub cmc: CmcData,
    pub strat: StratData,
    pub orders: OrdersData,
    pub live_data: LiveData,
    /// `currentPrice * balance + totalSell - totalBuy`.
    pub profit: Option<Decimal>,
}

impl Asset {
    pub fn new(base: Symbol, platform: Platform) -> Self {
        Self {
            ticker: base.usdt_pair(),
            name: base.as_str().to_string(),
            base,
            platform,
            icon_url: None,
            tags: Vec::new(),
            cmc: CmcData::default(),
            strat: StratData::default(),
            orders: OrdersData::default(),
            live_data: LiveData::default(),
            profit: None,
        }
    }

    pub fn has_tag(&self, tag: AssetTag) -> bool {
        self.tags.contains(&tag)
    }
}

/// Market-cap reference block; zero-valued when no reference record exists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CmcData {
    pub price: Decimal,
    pub rank: i64,
    pub change_24h: Decimal,
    pub change_7d: Decimal,
    pub change_30d: Decimal,
    pub change_60d: Decimal,
    pub change_90d: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StratData {
    pub strategy: StrategyName,
    pub max_exposition: Option<Decimal>,
    pub take_profits: TakeProfits,
}

impl Default for StratData {
    fn default() -> Self {
        Self {
            strategy: StrategyName::NoStrategy,
            max_exposition: None,
            take_profits: TakeProfits::default(),
        }
    }
}

/// One take-profit tranche as published to order management.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TakeProfit {
    pub price: Option<Decimal>,
    pub amount: Option<Decimal>,
    /// Percent move from the current price up to this tranche's price.
    pub percent_to_next_tp: Option<Decimal>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TakeProfits {
    pub tp1: TakeProfit,
    pub tp2: TakeProfit,
    pub tp3: TakeProfit,
    pub tp4: TakeProfit,
    pub tp5: TakeProfit,
    /// 1 when a matching open sell order exists for the tranche, else 0.
    pub status: [u8; 5],
}

impl TakeProfits {
    pub fn from_tranches(tranches: [TakeProfit; 5], status: [u8; 5]) -> Self {
        let [tp1, tp2, tp3, tp4, tp5] = tranches;
        Self {
            tp1,
            tp2,
            tp3,
            tp4,
            tp5,
            status,
        }
    }

    pub fn tranches(&self) -> [&TakeProfit; 5] {
        [&self.tp1, &self.tp2, &self.tp3, &self.tp4, &self.tp5]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrdersData {
    pub open: OpenOrdersData,
    pub trade: TradeData,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenOrdersData {
    pub nb_open_buy_orders: usize,
    pub nb_open_sell_orders: usize,
    pub buy_orders: Vec<OpenOrder>,
    pub sell_orders: Vec<OpenOrder>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeData {
    pub total_buy: Decimal,
    pub total_sell: Decimal,
    pub total_amount: Decimal,
    pub average_entry_price: Option<Decimal>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveData {
    pub balance: Decimal,
    pub current_price: Decimal,
    pub current_possession: Option<Decimal>,
}
