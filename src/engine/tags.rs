//! Static asset classification lists.

use crate::domain::{AssetTag, Symbol};

const STABLECOINS: &[&str] = &[
    "USDT", "USDC", "DAI", "BUSD", "TUSD", "FDUSD", "USDD", "USDP", "PYUSD", "GUSD", "FRAX",
    "LUSD", "USDE", "EURC", "EURT",
];

/// Stablecoins whose metrics are emitted even without any reference data.
const MAJOR_STABLECOINS: &[&str] = &["USDT", "USDC"];

const DEPIN: &[&str] = &[
    "FIL", "AR", "HNT", "RNDR", "RENDER", "AKT", "THETA", "IOTX", "GRASS", "IO", "ATH", "HONEY",
    "MOBILE", "IOT", "STORJ", "GLM", "TAO", "PEAQ", "DIMO", "POKT", "FLUX", "ANKR", "NOS",
];

const GAMING: &[&str] = &[
    "AXS", "SAND", "MANA", "GALA", "IMX", "ENJ", "ILV", "BEAM", "PIXEL", "YGG", "MAGIC", "PRIME",
    "RON", "PYR", "GMT", "ALICE", "SUPER", "BIGTIME", "XAI", "PORTAL", "NAKA", "GODS",
];

pub fn is_stablecoin(base: &Symbol) -> bool {
    STABLECOINS.contains(&base.as_str())
}

pub fn is_major_stablecoin(base: &Symbol) -> bool {
    MAJOR_STABLECOINS.contains(&base.as_str())
}

pub fn tags_for(base: &Symbol) -> Vec<AssetTag> {
    let symbol = base.as_str();
    let mut tags = Vec::new();
    if STABLECOINS.contains(&symbol) {
        tags.push(AssetTag::Stablecoin);
    }
    if DEPIN.contains(&symbol) {
        tags.push(AssetTag::Depin);
    }
    if GAMING.contains(&symbol) {
        tags.push(AssetTag::Gaming);
    }
    tags
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags() {
        assert_eq!(tags_for(&Symbol::new("usdt")), vec![AssetTag::Stablecoin]);
        assert_eq!(tags_for(&Symbol::new("FIL")), vec![AssetTag::Depin]);
        assert_eq!(tags_for(&Symbol::new("SAND")), vec![AssetTag::Gaming]);
        assert!(tags_for(&Symbol::new("BTC")).is_empty());
    }

    #[test]
    fn test_major_stablecoins() {
        assert!(is_major_stablecoin(&Symbol::new("USDC")));
        assert!(!is_major_stablecoin(&Symbol::new("DAI")));
        assert!(is_stablecoin(&Symbol::new("DAI")));
    }
}
