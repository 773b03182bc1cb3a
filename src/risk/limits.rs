//! Position Limits: check-before-write against per-market and aggregate
//! exposure caps.

use rust_decimal::Decimal;

use crate::config::risk::RiskConfig;
use crate::domain::{MarketId, OutcomeId};
use crate::error::{Error, Result};

use super::exposure::ExposureTracker;

pub struct PositionLimits<'a> {
    config: &'a RiskConfig,
}

impl<'a> PositionLimits<'a> {
    #[must_use]
    pub const fn new(config: &'a RiskConfig) -> Self {
        Self { config }
    }

    /// Computes the hypothetical post-trade market and aggregate exposure
    /// and rejects with `LimitExceeded` if either configured cap would be
    /// breached.
    pub fn check(&self, tracker: &ExposureTracker, market_id: &MarketId, outcome_id: &OutcomeId, additional_exposure: Decimal) -> Result<()> {
        let post_market = tracker.market_exposure(market_id, outcome_id) + additional_exposure;
        if post_market > self.config.max_position_per_market {
            return Err(Error::LimitExceeded(format!(
                "post-trade market exposure {post_market} exceeds cap {}",
                self.config.max_position_per_market
            )));
        }
        let post_total = tracker.total_exposure() + additional_exposure;
        if post_total > self.config.max_total_exposure {
            return Err(Error::LimitExceeded(format!(
                "post-trade total exposure {post_total} exceeds cap {}",
                self.config.max_total_exposure
            )));
        }
        Ok(())
    }
}
