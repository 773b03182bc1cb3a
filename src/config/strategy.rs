//! Strategy detector (C8) threshold configuration.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StrategiesConfig {
    #[serde(default = "default_enabled")]
    pub enabled: Vec<String>,
    #[serde(default)]
    pub probability_sum: ProbabilitySumConfig,
    #[serde(default)]
    pub endgame: EndgameConfig,
    #[serde(default)]
    pub momentum: MomentumConfig,
    #[serde(default)]
    pub mean_reversion: MeanReversionConfig,
    #[serde(default)]
    pub imbalance: ImbalanceConfig,
    #[serde(default)]
    pub cooldowns: CooldownConfig,
}

fn default_enabled() -> Vec<String> {
    vec!["probability_sum".into(), "endgame".into()]
}

impl Default for StrategiesConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            probability_sum: ProbabilitySumConfig::default(),
            endgame: EndgameConfig::default(),
            momentum: MomentumConfig::default(),
            mean_reversion: MeanReversionConfig::default(),
            imbalance: ImbalanceConfig::default(),
            cooldowns: CooldownConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProbabilitySumConfig {
    /// `epsilon` in `ask(YES) + ask(NO) < 1 - epsilon`, as a fraction.
    #[serde(default = "default_epsilon")]
    pub epsilon: Decimal,
}

fn default_epsilon() -> Decimal {
    dec!(0.003)
}

impl Default for ProbabilitySumConfig {
    fn default() -> Self {
        Self { epsilon: default_epsilon() }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EndgameConfig {
    #[serde(default = "default_min_hours_to_res")]
    pub min_hours_to_res: f64,
    #[serde(default = "default_max_hours_to_res")]
    pub max_hours_to_res: f64,
    #[serde(default = "default_min_prob")]
    pub min_prob: Decimal,
    #[serde(default = "default_max_prob")]
    pub max_prob: Decimal,
    #[serde(default = "default_min_annualized_return")]
    pub min_annualized_return: Decimal,
}

fn default_min_hours_to_res() -> f64 {
    1.0
}

fn default_max_hours_to_res() -> f64 {
    48.0
}

fn default_min_prob() -> Decimal {
    dec!(0.90)
}

fn default_max_prob() -> Decimal {
    dec!(0.99)
}

fn default_min_annualized_return() -> Decimal {
    dec!(50)
}

impl Default for EndgameConfig {
    fn default() -> Self {
        Self {
            min_hours_to_res: default_min_hours_to_res(),
            max_hours_to_res: default_max_hours_to_res(),
            min_prob: default_min_prob(),
            max_prob: default_max_prob(),
            min_annualized_return: default_min_annualized_return(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MomentumConfig {
    #[serde(default = "default_tau_m")]
    pub tau_momentum: Decimal,
    #[serde(default = "default_tau_c")]
    pub tau_change_percent: Decimal,
}

fn default_tau_m() -> Decimal {
    dec!(0.001)
}

fn default_tau_c() -> Decimal {
    dec!(1.0)
}

impl Default for MomentumConfig {
    fn default() -> Self {
        Self { tau_momentum: default_tau_m(), tau_change_percent: default_tau_c() }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MeanReversionConfig {
    #[serde(default = "default_tau_lo")]
    pub tau_lo: Decimal,
    #[serde(default = "default_tau_hi")]
    pub tau_hi: Decimal,
}

fn default_tau_lo() -> Decimal {
    dec!(1.5)
}

fn default_tau_hi() -> Decimal {
    dec!(3.0)
}

impl Default for MeanReversionConfig {
    fn default() -> Self {
        Self { tau_lo: default_tau_lo(), tau_hi: default_tau_hi() }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ImbalanceConfig {
    #[serde(default = "default_imbalance_ratio")]
    pub ratio_threshold: Decimal,
}

fn default_imbalance_ratio() -> Decimal {
    dec!(3.0)
}

impl Default for ImbalanceConfig {
    fn default() -> Self {
        Self { ratio_threshold: default_imbalance_ratio() }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CooldownConfig {
    #[serde(default = "default_signal_cooldown_secs")]
    pub signal_cooldown_secs: u64,
    #[serde(default = "default_post_trade_cooldown_secs")]
    pub post_trade_cooldown_secs: u64,
}

const fn default_signal_cooldown_secs() -> u64 {
    30
}

const fn default_post_trade_cooldown_secs() -> u64 {
    60
}

impl Default for CooldownConfig {
    fn default() -> Self {
        Self {
            signal_cooldown_secs: default_signal_cooldown_secs(),
            post_trade_cooldown_secs: default_post_trade_cooldown_secs(),
        }
    }
}
