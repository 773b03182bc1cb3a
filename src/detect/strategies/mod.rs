//! Per-outcome signal strategies layered above the arbitrage detectors in
//! the parent module. Each is a pure function over current market state
//! plus derived [`crate::history::PriceStats`]; cooldown gating lives in
//! [`cooldown`] and is applied by the caller between detection and dispatch.

pub mod cooldown;
pub mod endgame;
pub mod imbalance;
pub mod mean_reversion;
pub mod momentum;
pub mod probability_sum;
