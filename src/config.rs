use crate::domain::{ConversionRates, Decimal, Symbol};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_path: String,
    /// USD value of one unit of each non-USD quote currency.
    pub conversion_rates: ConversionRates,
    /// Relative tolerance for recognising a placed take-profit order.
    pub order_match_tolerance: Decimal,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnv(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_map(std::env::vars().collect())
    }

    pub fn from_env_map(env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let port = env_map
            .get("PORT")
            .map(|s| s.as_str())
            .unwrap_or("8080")
            .parse::<u16>()
            .map_err(|_| {
                ConfigError::InvalidValue("PORT".to_string(), "must be a valid u16".to_string())
            })?;

        let database_path = env_map
            .get("DATABASE_PATH")
            .cloned()
            .ok_or_else(|| ConfigError::MissingEnv("DATABASE_PATH".to_string()))?;

        let conversion_rates = match env_map.get("QUOTE_CONVERSION_RATES") {
            Some(raw) => parse_conversion_rates(raw)?,
            None => ConversionRates::new(),
        };

        let order_match_tolerance = match env_map.get("ORDER_MATCH_TOLERANCE") {
            Some(raw) => Decimal::from_str_canonical(raw)
                .ok()
                .filter(|t| !t.is_negative() && *t < Decimal::one())
                .ok_or_else(|| {
                    ConfigError::InvalidValue(
                        "ORDER_MATCH_TOLERANCE".to_string(),
                        format!("must be a decimal in [0, 1), got {}", raw),
                    )
                })?,
            None => Decimal::scaled(1, 2),
        };

        Ok(Config {
            port,
            database_path,
            conversion_rates,
            order_match_tolerance,
        })
    }
}

/// Parse `BTC=65000,ETH=3000` into quote conversion rates.
fn parse_conversion_rates(raw: &str) -> Result<ConversionRates, ConfigError> {
    let invalid = |detail: String| {
        ConfigError::InvalidValue("QUOTE_CONVERSION_RATES".to_string(), detail)
    };

    let mut rates = ConversionRates::new();
    for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let (quote, rate) = entry
            .split_once('=')
            .ok_or_else(|| invalid(format!("expected QUOTE=RATE, got {}", entry)))?;
        let quote = Symbol::new(quote);
        if quote.as_str().is_empty() {
            return Err(invalid(format!("empty quote in {}", entry)));
        }
        let rate = Decimal::from_str_canonical(rate)
            .ok()
            .filter(|r| r.is_positive())
            .ok_or_else(|| invalid(format!("rate for {} must be a positive decimal", quote)))?;
        rates.insert(quote, rate);
    }
    Ok(rates)
}
