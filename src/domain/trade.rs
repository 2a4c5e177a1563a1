//! Executed trade fills and their USD valuation.

use crate::domain::{Decimal, Platform, Side, Symbol, TimeMs};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Quote currencies valued 1:1 against USD.
pub const USD_QUOTES: &[&str] = &["USDT", "USDC", "BUSD", "FDUSD", "DAI", "TUSD", "USDP", "USD"];

/// Quote currency to USD rates for pairs not quoted in a stablecoin.
///
/// The market-data side supplies these (e.g. `BTC -> 65000`); a quote that is
/// neither a stablecoin nor present here cannot be valued.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversionRates {
    rates: HashMap<Symbol, Decimal>,
}

impl ConversionRates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rate(mut self, quote: Symbol, usd_rate: Decimal) -> Self {
        self.rates.insert(quote, usd_rate);
        self
    }

    pub fn insert(&mut self, quote: Symbol, usd_rate: Decimal) {
        self.rates.insert(quote, usd_rate);
    }

    pub fn usd_rate(&self, quote: &Symbol) -> Option<Decimal> {
        if USD_QUOTES.contains(&quote.as_str()) {
            return Some(Decimal::one());
        }
        self.rates.get(quote).copied()
    }

    /// Convert `total` (in `quote` units) to USD.
    pub fn to_usd(&self, quote: &Symbol, total: Decimal) -> Option<Decimal> {
        self.usd_rate(quote).map(|rate| total * rate)
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

/// A single executed fill on an exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trade {
    /// Stable unique identifier used for idempotent storage.
    pub trade_key: String,
    pub base: Symbol,
    pub quote: Symbol,
    pub pair: String,
    #[serde(rename = "timestamp")]
    pub time_ms: TimeMs,
    #[serde(rename = "type")]
    pub side: Side,
    pub price: Decimal,
    pub amount: Decimal,
    /// `price * amount` in quote units.
    pub total: Decimal,
    pub fee: Decimal,
    pub feecoin: Symbol,
    pub platform: Platform,
    /// `total` in USD; zero when the quote currency has no known rate.
    #[serde(rename = "totalUSDT")]
    pub total_usdt: Decimal,
    /// Exchange-assigned trade id, when the platform reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trade_id: Option<String>,
}

impl Trade {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        time_ms: TimeMs,
        platform: Platform,
        base: Symbol,
        quote: Symbol,
        side: Side,
        price: Decimal,
        amount: Decimal,
        fee: Decimal,
        feecoin: Symbol,
        rates: &ConversionRates,
    ) -> Self {
        let total = price * amount;
        let pair = format!("{}/{}", base, quote);
        let total_usdt = match rates.to_usd(&quote, total) {
            Some(usd) => usd,
            None => {
                tracing::warn!(
                    "No USD rate for quote {} on {} ({}), valuing trade at 0",
                    quote,
                    platform,
                    pair
                );
                Decimal::zero()
            }
        };
        let trade_key =
            Self::compute_trade_key(&platform, &pair, time_ms, side, &price, &amount, &fee, None);

        Trade {
            trade_key,
            base,
            quote,
            pair,
            time_ms,
            side,
            price,
            amount,
            total,
            fee,
            feecoin,
            platform,
            total_usdt,
            trade_id: None,
        }
    }

    /// Attach the exchange trade id and rekey the trade on it.
    pub fn with_trade_id(mut self, trade_id: impl Into<String>) -> Self {
        let trade_id = trade_id.into();
        self.trade_key = Self::compute_trade_key(
            &self.platform,
            &self.pair,
            self.time_ms,
            self.side,
            &self.price,
            &self.amount,
            &self.fee,
            Some(&trade_id),
        );
        self.trade_id = Some(trade_id);
        self
    }

    /// Stable unique key for a fill.
    ///
    /// Priority: exchange trade id (scoped by platform) > hash of deterministic fields.
    #[allow(clippy::too_many_arguments)]
    pub fn compute_trade_key(
        platform: &Platform,
        pair: &str,
        time_ms: TimeMs,
        side: Side,
        price: &Decimal,
        amount: &Decimal,
        fee: &Decimal,
        trade_id: Option<&str>,
    ) -> String {
        if let Some(id) = trade_id.map(str::trim).filter(|id| !id.is_empty()) {
            return format!("tid:{}:{}", platform, id);
        }

        use sha2::{Digest, Sha256};

        fn hash_var(hasher: &mut Sha256, data: &str) {
            hasher.update((data.len() as u32).to_le_bytes());
            hasher.update(data.as_bytes());
        }

        let mut hasher = Sha256::new();
        hash_var(&mut hasher, platform.as_str());
        hash_var(&mut hasher, pair);
        hasher.update(time_ms.as_ms().to_le_bytes());
        hasher.update(if side == Side::Buy { b"B" } else { b"S" });
        hash_var(&mut hasher, &price.to_canonical_string());
        hash_var(&mut hasher, &amount.to_canonical_string());
        hash_var(&mut hasher, &fee.to_canonical_string());

        let hash = hasher.finalize();
        format!("hash:{}", hex::encode(&hash[..16]))
    }

    pub fn is_buy(&self) -> bool {
        self.side == Side::Buy
    }
}
