//! Configuration loading for the market engine.
//!
//! Supports JSON configuration files for:
//! - Engine limits (per-trade quantity cap, event bus capacity)
//! - Market seeds (resource and gold markets with their curve parameters)
//! - Initial account balances

use crate::domain::{
    CurrencyScope, GoodId, MarketDefinitionError, OwnerId, Price, PriceLevelMarket, RegionId,
    TradedGood,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Root configuration for the market engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Engine name/identifier
    #[serde(default = "default_engine_name")]
    pub name: String,

    /// Maximum units a single trade may request
    #[serde(default = "default_max_trade_quantity")]
    pub max_trade_quantity: u32,

    /// Event channel capacity
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,

    /// Markets to create
    #[serde(default)]
    pub markets: Vec<MarketSeed>,

    /// Initial account balances
    #[serde(default)]
    pub accounts: Vec<AccountSeed>,
}

fn default_engine_name() -> String {
    "Tactizen Market Engine".to_string()
}

fn default_max_trade_quantity() -> u32 {
    crate::application::DEFAULT_MAX_TRADE_QUANTITY
}

fn default_event_capacity() -> usize {
    10_000
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            name: default_engine_name(),
            max_trade_quantity: default_max_trade_quantity(),
            event_capacity: default_event_capacity(),
            markets: Vec::new(),
            accounts: Vec::new(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io {
            path: path.as_ref().display().to_string(),
            error: e.to_string(),
        })?;

        Self::from_json(&content)
    }

    /// Parse configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_trade_quantity == 0 {
            return Err(ConfigError::Invalid(
                "max_trade_quantity must be positive".to_string(),
            ));
        }
        for seed in &self.markets {
            seed.build()?;
        }
        for seed in &self.accounts {
            if seed.balance < Decimal::ZERO {
                return Err(ConfigError::Invalid(format!(
                    "negative seed balance for {:?}",
                    seed.owner
                )));
            }
        }
        Ok(())
    }
}

/// One market definition in the configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketSeed {
    pub region: u32,
    /// Resource slug; omit for the region's gold market.
    #[serde(default)]
    pub good: Option<String>,
    #[serde(default)]
    pub quality: u8,
    /// Base price at level 0 (quality-adjusted). Defaults to a 100.00
    /// exchange rate for gold markets; required for resource markets.
    #[serde(default)]
    pub initial_price: Option<Decimal>,
    #[serde(default)]
    pub volume_per_level: Option<u32>,
    #[serde(default)]
    pub price_adjustment_per_level: Option<Decimal>,
    /// Override the family default (10% resource / 5% gold).
    #[serde(default)]
    pub spread: Option<Decimal>,
    #[serde(default)]
    pub price_level: i32,
    #[serde(default)]
    pub progress_within_level: u32,
}

impl MarketSeed {
    pub fn build(&self) -> Result<PriceLevelMarket, ConfigError> {
        let region = RegionId(self.region);

        let mut market = match &self.good {
            Some(slug) => {
                let good = GoodId::new(slug.clone())
                    .map_err(|e| ConfigError::Invalid(format!("good '{}': {}", slug, e)))?;
                if self.quality > 5 {
                    return Err(ConfigError::Invalid(format!(
                        "good '{}': quality must be 0..=5",
                        slug
                    )));
                }
                let initial_price = self.initial_price.ok_or_else(|| {
                    ConfigError::Invalid(format!("market '{}' is missing initial_price", slug))
                })?;
                PriceLevelMarket::resource(
                    region,
                    TradedGood::resource(good, self.quality),
                    Price::new(initial_price)
                        .map_err(|e| ConfigError::Invalid(e.to_string()))?,
                    self.volume_per_level.unwrap_or(200),
                    self.price_adjustment_per_level.unwrap_or(dec!(0.10)),
                )?
            }
            None => PriceLevelMarket::gold(
                region,
                Price::new(self.initial_price.unwrap_or(dec!(100.00)))
                    .map_err(|e| ConfigError::Invalid(e.to_string()))?,
                self.volume_per_level.unwrap_or(1000),
                self.price_adjustment_per_level.unwrap_or(dec!(1.00)),
            )?,
        };

        if let Some(spread) = self.spread {
            market = PriceLevelMarket::new(
                market.id.clone(),
                market.initial_price,
                market.volume_per_level,
                market.price_adjustment_per_level,
                spread,
            )?;
        }

        Ok(market.with_state(self.price_level, self.progress_within_level))
    }
}

/// One initial account balance in the configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountSeed {
    pub owner: OwnerId,
    pub scope: CurrencyScope,
    pub balance: Decimal,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {error}")]
    Io { path: String, error: String },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),

    #[error("invalid market definition: {0}")]
    Market(#[from] MarketDefinitionError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::from_json("{}").unwrap();
        assert_eq!(config.max_trade_quantity, 999_999);
        assert!(config.markets.is_empty());
    }

    #[test]
    fn test_parse_resource_and_gold_markets() {
        let json = r#"{
            "markets": [
                { "region": 1, "good": "grain", "initial_price": "10.00" },
                { "region": 1, "good": "weapon", "quality": 3,
                  "initial_price": "45.00", "volume_per_level": 50,
                  "price_adjustment_per_level": "0.50" },
                { "region": 1 }
            ]
        }"#;
        let config = EngineConfig::from_json(json).unwrap();
        assert_eq!(config.markets.len(), 3);

        let grain = config.markets[0].build().unwrap();
        assert_eq!(grain.volume_per_level, 200);
        assert_eq!(grain.spread, dec!(0.10));

        let weapon = config.markets[1].build().unwrap();
        assert_eq!(weapon.volume_per_level, 50);

        let gold = config.markets[2].build().unwrap();
        assert!(gold.id.good.is_gold());
        assert_eq!(gold.volume_per_level, 1000);
        assert_eq!(gold.spread, dec!(0.05));
        assert_eq!(gold.initial_price, Price::from(dec!(100.00)));
    }

    #[test]
    fn test_parse_account_seeds() {
        let json = r#"{
            "accounts": [
                { "owner": { "user": 7 }, "scope": "gold", "balance": "25.0" },
                { "owner": { "company": 2 }, "scope": { "local": 1 }, "balance": "5000" }
            ]
        }"#;
        let config = EngineConfig::from_json(json).unwrap();
        assert_eq!(config.accounts.len(), 2);
        assert_eq!(config.accounts[0].owner, OwnerId::User(7));
        assert_eq!(config.accounts[0].scope, CurrencyScope::Gold);
        assert_eq!(config.accounts[0].balance, dec!(25.0));
        assert_eq!(config.accounts[1].scope, CurrencyScope::Local(RegionId(1)));
    }

    #[test]
    fn test_rejects_bad_market_definitions() {
        let json = r#"{ "markets": [ { "region": 1, "good": "grain" } ] }"#;
        assert!(EngineConfig::from_json(json).is_err());

        let json = r#"{ "markets": [
            { "region": 1, "good": "grain", "initial_price": "10.00", "volume_per_level": 0 }
        ] }"#;
        assert!(EngineConfig::from_json(json).is_err());
    }
}
