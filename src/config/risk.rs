//! Risk/limits configuration (C12 position limits, kill switch thresholds).

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RiskConfig {
    /// Per-`(marketId, outcomeId)` position cap in USD.
    #[serde(default = "default_max_position_per_market")]
    pub max_position_per_market: Decimal,
    /// Aggregate exposure cap across all positions, in USD.
    #[serde(default = "default_max_total_exposure")]
    pub max_total_exposure: Decimal,
    /// Kill switch `DailyLossLimit` trigger: fires when `daily_pnl <= -max_daily_loss`.
    #[serde(default = "default_max_daily_loss")]
    pub max_daily_loss: Decimal,
    /// Kill switch `DrawdownLimit` trigger threshold, as a fraction of peak equity.
    #[serde(default = "default_max_drawdown_pct")]
    pub max_drawdown_pct: Decimal,
    /// Kill switch `ApiErrorRate` trigger threshold, errors per window.
    #[serde(default = "default_max_api_error_rate")]
    pub max_api_error_rate: Decimal,
    /// Rolling window (seconds) the `ApiErrorRate` trigger evaluates over.
    #[serde(default = "default_api_error_window_secs")]
    pub api_error_window_secs: u64,
    /// Kill switch evaluation cadence.
    #[serde(default = "default_check_interval_ms")]
    pub check_interval_ms: u64,
    /// Cross-venue arbitrage buffer subtracted from gross spread for
    /// oracle/settlement risk.
    #[serde(default = "default_cross_platform_buffer")]
    pub cross_platform_buffer: Decimal,
    /// Taker fee applied per leg, keyed by venue in `config::trading`; this
    /// is the crate-wide fallback when a venue-specific fee isn't set.
    #[serde(default = "default_taker_fee")]
    pub default_taker_fee: Decimal,
}

fn default_max_position_per_market() -> Decimal {
    dec!(1000)
}

fn default_max_total_exposure() -> Decimal {
    dec!(10000)
}

fn default_max_daily_loss() -> Decimal {
    dec!(500)
}

fn default_max_drawdown_pct() -> Decimal {
    dec!(0.15)
}

fn default_max_api_error_rate() -> Decimal {
    dec!(0.2)
}

const fn default_api_error_window_secs() -> u64 {
    60
}

const fn default_check_interval_ms() -> u64 {
    100
}

fn default_cross_platform_buffer() -> Decimal {
    dec!(0.15)
}

fn default_taker_fee() -> Decimal {
    dec!(0)
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            max_position_per_market: default_max_position_per_market(),
            max_total_exposure: default_max_total_exposure(),
            max_daily_loss: default_max_daily_loss(),
            max_drawdown_pct: default_max_drawdown_pct(),
            max_api_error_rate: default_max_api_error_rate(),
            api_error_window_secs: default_api_error_window_secs(),
            check_interval_ms: default_check_interval_ms(),
            cross_platform_buffer: default_cross_platform_buffer(),
            default_taker_fee: default_taker_fee(),
        }
    }
}
