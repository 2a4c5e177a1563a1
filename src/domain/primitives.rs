//! Domain primitives: TimeMs, Symbol, Platform, Exchange, Side.

use crate::domain::Decimal;
use serde::{Deserialize, Serialize};

/// Time in milliseconds since Unix epoch.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct TimeMs(pub i64);

impl TimeMs {
    pub fn new(ms: i64) -> Self {
        TimeMs(ms)
    }

    pub fn now() -> Self {
        TimeMs(chrono::Utc::now().timestamp_millis())
    }

    pub fn as_ms(&self) -> i64 {
        self.0
    }
}

/// Asset or quote currency ticker (e.g., "BTC", "USDT"), always upper-case.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Symbol(String);

impl Symbol {
    pub fn new(symbol: impl AsRef<str>) -> Self {
        Symbol(symbol.as_ref().trim().to_ascii_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Spot pair against USDT, the pair used for live price lookup.
    pub fn usdt_pair(&self) -> String {
        format!("{}/USDT", self.0)
    }
}

impl From<String> for Symbol {
    fn from(value: String) -> Self {
        Symbol::new(value)
    }
}

impl From<Symbol> for String {
    fn from(value: Symbol) -> Self {
        value.0
    }
}

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Exchange identifier as stored in snapshots (e.g., "binance"), always lower-case.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Platform(String);

impl Platform {
    pub fn new(platform: impl AsRef<str>) -> Self {
        Platform(platform.as_ref().trim().to_ascii_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn exchange(&self) -> Exchange {
        match self.0.as_str() {
            "binance" => Exchange::Binance,
            "kucoin" => Exchange::Kucoin,
            "htx" => Exchange::Htx,
            "okx" => Exchange::Okx,
            "gateio" => Exchange::Gateio,
            _ => Exchange::Other,
        }
    }
}

impl From<String> for Platform {
    fn from(value: String) -> Self {
        Platform::new(value)
    }
}

impl From<Platform> for String {
    fn from(value: Platform) -> Self {
        value.0
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Exchanges with a known spot fee schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Exchange {
    Binance,
    Kucoin,
    Htx,
    Okx,
    Gateio,
    Other,
}

impl Exchange {
    /// Spot trading fee as a fraction (0.001 = 0.1%).
    pub fn fee_rate(&self) -> Decimal {
        match self {
            Exchange::Binance | Exchange::Kucoin | Exchange::Htx | Exchange::Okx => {
                Decimal::scaled(1, 3)
            }
            Exchange::Gateio | Exchange::Other => Decimal::scaled(2, 3),
        }
    }

    /// Multiplier applied to a sell price so the proceeds cover the fee.
    pub fn fee_multiplier(&self) -> Decimal {
        Decimal::one() + self.fee_rate()
    }
}

/// Trade or order side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn parse(s: &str) -> Option<Side> {
        match s.trim().to_ascii_lowercase().as_str() {
            "buy" => Some(Side::Buy),
            "sell" => Some(Side::Sell),
            _ => None,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Buy => write!(f, "buy"),
            Side::Sell => write!(f, "sell"),
        }
    }
}
