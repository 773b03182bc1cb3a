//! Execution/engine tunables (C9/C10/C13) and feature toggles.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TradingConfig {
    /// Reject a signal below this confidence.
    #[serde(default = "default_min_confidence")]
    pub min_confidence: Decimal,
    /// `maxSlippage` used by the limit-price computation.
    #[serde(default = "default_max_slippage")]
    pub max_slippage: Decimal,
    /// Per-leg timeout for arbitrage executor FOK submissions.
    #[serde(default = "default_leg_timeout_ms")]
    pub leg_timeout_ms: u64,
    /// Unwind leg timeout (GTC, longer than the initial FOK race).
    #[serde(default = "default_unwind_timeout_ms")]
    pub unwind_timeout_ms: u64,
    #[serde(default = "default_scan_interval_ms")]
    pub scan_interval_ms: u64,
    #[serde(default = "default_cooldown_after_execution_ms")]
    pub cooldown_after_execution_ms: u64,
    #[serde(default = "default_min_spread_bps")]
    pub min_spread_bps: Decimal,
    #[serde(default)]
    pub features: FeaturesConfig,
}

fn default_min_confidence() -> Decimal {
    dec!(0.3)
}

fn default_max_slippage() -> Decimal {
    dec!(0.02)
}

const fn default_leg_timeout_ms() -> u64 {
    5_000
}

const fn default_unwind_timeout_ms() -> u64 {
    10_000
}

const fn default_scan_interval_ms() -> u64 {
    5_000
}

const fn default_cooldown_after_execution_ms() -> u64 {
    2_000
}

fn default_min_spread_bps() -> Decimal {
    dec!(50)
}

impl Default for TradingConfig {
    fn default() -> Self {
        Self {
            min_confidence: default_min_confidence(),
            max_slippage: default_max_slippage(),
            leg_timeout_ms: default_leg_timeout_ms(),
            unwind_timeout_ms: default_unwind_timeout_ms(),
            scan_interval_ms: default_scan_interval_ms(),
            cooldown_after_execution_ms: default_cooldown_after_execution_ms(),
            min_spread_bps: default_min_spread_bps(),
            features: FeaturesConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FeaturesConfig {
    #[serde(default = "default_true")]
    pub cross_venue_arbitrage: bool,
    #[serde(default = "default_true")]
    pub single_venue_arbitrage: bool,
    #[serde(default)]
    pub paper_trading: bool,
}

const fn default_true() -> bool {
    true
}

impl Default for FeaturesConfig {
    fn default() -> Self {
        Self { cross_venue_arbitrage: true, single_venue_arbitrage: true, paper_trading: false }
    }
}
