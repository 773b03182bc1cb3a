//! Exposure Tracker: per-venue and per-market aggregates maintained from
//! Order Manager position-update notifications, read by the kill switch and
//! exported as metrics.

use std::collections::HashMap;

use parking_lot::RwLock;
use rust_decimal::Decimal;

use crate::domain::{MarketId, OutcomeId, Venue};

#[derive(Default)]
pub struct ExposureTracker {
    per_market: RwLock<HashMap<(MarketId, OutcomeId), Decimal>>,
    per_venue: RwLock<HashMap<Venue, Decimal>>,
}

impl ExposureTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the recorded exposure for one `(market, outcome)` at `venue`
    /// with `exposure`, updating the venue aggregate by the delta.
    pub fn set(&self, venue: Venue, market_id: MarketId, outcome_id: OutcomeId, exposure: Decimal) {
        let key = (market_id, outcome_id);
        let mut per_market = self.per_market.write();
        let previous = per_market.insert(key, exposure).unwrap_or(Decimal::ZERO);
        drop(per_market);
        *self.per_venue.write().entry(venue).or_insert(Decimal::ZERO) += exposure - previous;
    }

    #[must_use]
    pub fn market_exposure(&self, market_id: &MarketId, outcome_id: &OutcomeId) -> Decimal {
        self.per_market.read().get(&(market_id.clone(), outcome_id.clone())).copied().unwrap_or(Decimal::ZERO)
    }

    #[must_use]
    pub fn venue_exposure(&self, venue: Venue) -> Decimal {
        self.per_venue.read().get(&venue).copied().unwrap_or(Decimal::ZERO)
    }

    #[must_use]
    pub fn total_exposure(&self) -> Decimal {
        self.per_venue.read().values().sum()
    }
}
