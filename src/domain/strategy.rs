//! Per-asset take-profit strategy configuration.

use crate::domain::{Decimal, Platform, Symbol};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Exposure ceiling used when a platform has none configured.
pub const DEFAULT_MAX_EXPOSURE: i64 = 10_000;

/// Named recovery strategies, each with a fixed recovery ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StrategyName {
    #[serde(rename = "Shad")]
    Shad,
    #[serde(rename = "Shad skip x2")]
    ShadSkipX2,
    #[serde(rename = "Strategy 3")]
    Strategy3,
    #[serde(rename = "Strategy 4")]
    Strategy4,
    #[serde(rename = "No strategy")]
    NoStrategy,
}

impl StrategyName {
    /// Parse a stored strategy name. Unknown names resolve to `NoStrategy`.
    pub fn parse(name: &str) -> StrategyName {
        match name.trim() {
            "Shad" => StrategyName::Shad,
            "Shad skip x2" => StrategyName::ShadSkipX2,
            "Strategy 3" => StrategyName::Strategy3,
            "Strategy 4" => StrategyName::Strategy4,
            "" | "No strategy" => StrategyName::NoStrategy,
            other => {
                tracing::warn!("Unknown strategy name {:?}, using No strategy", other);
                StrategyName::NoStrategy
            }
        }
    }

    pub fn ratio(&self) -> Decimal {
        let ratio = match self {
            StrategyName::Shad => 2,
            StrategyName::ShadSkipX2 => 4,
            StrategyName::Strategy3 => 8,
            StrategyName::Strategy4 => 16,
            StrategyName::NoStrategy => 8,
        };
        Decimal::from(ratio)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyName::Shad => "Shad",
            StrategyName::ShadSkipX2 => "Shad skip x2",
            StrategyName::Strategy3 => "Strategy 3",
            StrategyName::Strategy4 => "Strategy 4",
            StrategyName::NoStrategy => "No strategy",
        }
    }
}

impl std::fmt::Display for StrategyName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strategy document for one asset, keyed by platform.
///
/// Names are kept as stored strings so a malformed entry never fails the
/// whole document; they are resolved through [`StrategyName::parse`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Strategy {
    pub asset: Symbol,
    #[serde(default)]
    pub strategies: BTreeMap<Platform, String>,
    #[serde(default)]
    pub max_exposure: BTreeMap<Platform, Decimal>,
}

impl Strategy {
    pub fn new(asset: Symbol) -> Self {
        Self {
            asset,
            strategies: BTreeMap::new(),
            max_exposure: BTreeMap::new(),
        }
    }

    pub fn with_platform(
        mut self,
        platform: Platform,
        name: StrategyName,
        max_exposure: Option<Decimal>,
    ) -> Self {
        self.strategies.insert(platform.clone(), name.as_str().to_string());
        if let Some(expo) = max_exposure {
            self.max_exposure.insert(platform, expo);
        }
        self
    }

    /// True when a non-empty strategy entry exists for the platform.
    pub fn is_configured_for(&self, platform: &Platform) -> bool {
        self.strategies
            .get(platform)
            .map(|name| !name.trim().is_empty())
            .unwrap_or(false)
    }

    pub fn strategy_for(&self, platform: &Platform) -> StrategyName {
        self.strategies
            .get(platform)
            .map(|name| StrategyName::parse(name))
            .unwrap_or(StrategyName::NoStrategy)
    }

    /// Configured exposure, or the default ceiling when absent or not positive.
    pub fn max_exposure_for(&self, platform: &Platform) -> Decimal {
        self.max_exposure
            .get(platform)
            .copied()
            .filter(|expo| expo.is_positive())
            .unwrap_or_else(|| Decimal::from(DEFAULT_MAX_EXPOSURE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ratio_table() {
        assert_eq!(StrategyName::Shad.ratio(), Decimal::from(2));
        assert_eq!(StrategyName::ShadSkipX2.ratio(), Decimal::from(4));
        assert_eq!(StrategyName::Strategy3.ratio(), Decimal::from(8));
        assert_eq!(StrategyName::Strategy4.ratio(), Decimal::from(16));
        assert_eq!(StrategyName::NoStrategy.ratio(), Decimal::from(8));
    }

    #[test]
    fn test_parse_names() {
        assert_eq!(StrategyName::parse("Shad skip x2"), StrategyName::ShadSkipX2);
        assert_eq!(StrategyName::parse("Moon"), StrategyName::NoStrategy);
        assert_eq!(StrategyName::parse(""), StrategyName::NoStrategy);
    }

    #[test]
    fn test_strategy_lookup_defaults() {
        let binance = Platform::new("binance");
        let kucoin = Platform::new("kucoin");
        let strategy = Strategy::new(Symbol::new("ETH")).with_platform(
            binance.clone(),
            StrategyName::Shad,
            Some(Decimal::from(500)),
        );

        assert!(strategy.is_configured_for(&binance));
        assert!(!strategy.is_configured_for(&kucoin));
        assert_eq!(strategy.strategy_for(&binance), StrategyName::Shad);
        assert_eq!(strategy.strategy_for(&kucoin), StrategyName::NoStrategy);
        assert_eq!(strategy.max_exposure_for(&binance), Decimal::from(500));
        assert_eq!(strategy.max_exposure_for(&kucoin), Decimal::from(10_000));
    }

    #[test]
    fn test_non_positive_exposure_uses_default() {
        let okx = Platform::new("okx");
        let mut strategy = Strategy::new(Symbol::new("SOL"));
        strategy.max_exposure.insert(okx.clone(), Decimal::from(-5));
        assert_eq!(strategy.max_exposure_for(&okx), Decimal::from(10_000));
    }

    #[test]
    fn test_strategy_document_deserializes() {
        let json = r#"{
            "asset": "eth",
            "strategies": {"binance": "Strategy 4", "kucoin": ""},
            "maxExposure": {"binance": 250}
        }"#;
        let strategy: Strategy = serde_json::from_str(json).unwrap();
        let binance = Platform::new("binance");
        assert_eq!(strategy.asset, Symbol::new("ETH"));
        assert_eq!(strategy.strategy_for(&binance), StrategyName::Strategy4);
        assert!(!strategy.is_configured_for(&Platform::new("kucoin")));
        assert_eq!(strategy.max_exposure_for(&binance), Decimal::from(250));
    }
}
