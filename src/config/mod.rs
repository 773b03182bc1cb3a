//! Typed configuration: one validated struct graph loaded from TOML, with an
//! environment-variable overlay for secret material. Unknown keys are
//! rejected at every leaf struct (`serde(deny_unknown_fields)`).

pub mod logging;
pub mod risk;
pub mod strategy;
pub mod trading;
pub mod venue;

use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::{Error, Result};
use logging::LoggingConfig;
use risk::RiskConfig;
use strategy::StrategiesConfig;
use trading::TradingConfig;
use venue::{KalshiConfig, PolymarketConfig};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub polymarket: PolymarketConfig,
    #[serde(default)]
    pub kalshi: KalshiConfig,
    #[serde(default)]
    pub risk: RiskConfig,
    #[serde(default)]
    pub trading: TradingConfig,
    #[serde(default)]
    pub strategies: StrategiesConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Path to the SQLite execution-log database.
    #[serde(default = "default_database_path")]
    pub database_path: String,
}

fn default_database_path() -> String {
    "edgelord.db".into()
}

impl Config {
    /// Parse TOML, overlay secrets from the environment, then validate.
    pub fn parse_toml(content: &str) -> Result<Self> {
        let mut config: Self =
            toml::from_str(content).map_err(|e| Error::Config(format!("failed to parse config: {e}")))?;

        config.polymarket.api_secret = std::env::var("POLYMARKET_API_SECRET").unwrap_or_default();
        config.kalshi.private_key_pem = std::env::var("KALSHI_PRIVATE_KEY_PEM").unwrap_or_default();

        config.validate()?;
        Ok(config)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)
            .map_err(|e| Error::Config(format!("failed to read {}: {e}", path.as_ref().display())))?;
        Self::parse_toml(&content)
    }

    fn validate(&self) -> Result<()> {
        if self.polymarket.api_url.is_empty() {
            return Err(Error::Config("polymarket.api_url cannot be empty".into()));
        }
        if self.kalshi.api_url.is_empty() {
            return Err(Error::Config("kalshi.api_url cannot be empty".into()));
        }
        if self.risk.max_position_per_market <= Decimal::ZERO {
            return Err(Error::Config("risk.max_position_per_market must be > 0".into()));
        }
        if self.risk.max_total_exposure <= Decimal::ZERO {
            return Err(Error::Config("risk.max_total_exposure must be > 0".into()));
        }
        if self.trading.max_slippage < Decimal::ZERO || self.trading.max_slippage > Decimal::ONE {
            return Err(Error::Config("trading.max_slippage must be in [0, 1]".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        let config = Config::parse_toml("").unwrap();
        assert_eq!(config.database_path, "edgelord.db");
    }

    #[test]
    fn rejects_unknown_top_level_key() {
        let err = Config::parse_toml("unknown_key = 1\n");
        assert!(err.is_err());
    }

    #[test]
    fn rejects_invalid_slippage() {
        let err = Config::parse_toml("[trading]\nmax_slippage = \"1.5\"\n");
        assert!(err.is_err());
    }

    #[test]
    fn env_overlay_populates_secret_fields() {
        std::env::set_var("POLYMARKET_API_SECRET", "test-secret");
        let config = Config::parse_toml("").unwrap();
        assert_eq!(config.polymarket.api_secret, "test-secret");
        std::env::remove_var("POLYMARKET_API_SECRET");
    }

    #[test]
    fn polymarket_funder_address_and_signature_type_parse_from_file() {
        let config = Config::parse_toml(
            "[polymarket]\nfunder_address = \"0xabc123\"\nsignature_type = \"PROXY\"\n",
        )
        .unwrap();
        assert_eq!(config.polymarket.funder_address, "0xabc123");
        assert_eq!(config.polymarket.signature_type, crate::venue::auth::SignatureType::Proxy);
    }
}
