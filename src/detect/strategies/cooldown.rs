//! Per-market cooldown tracking shared by every strategy detector.
//!
//! A strategy does not re-emit for a market while an unexpired signal exists
//! (`signal_cooldown`), nor immediately after a fill on that market
//! (`post_trade_cooldown`).

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::domain::MarketId;

#[derive(Default)]
pub struct CooldownTracker {
    until: Mutex<HashMap<MarketId, Instant>>,
}

impl CooldownTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_active(&self, market_id: &MarketId) -> bool {
        self.until.lock().get(market_id).is_some_and(|until| Instant::now() < *until)
    }

    pub fn start(&self, market_id: MarketId, duration: Duration) {
        self.until.lock().insert(market_id, Instant::now() + duration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cooldown_blocks_until_elapsed() {
        let tracker = CooldownTracker::new();
        let market = MarketId::new("m1");
        tracker.start(market.clone(), Duration::from_millis(50));
        assert!(tracker.is_active(&market));
        std::thread::sleep(Duration::from_millis(60));
        assert!(!tracker.is_active(&market));
    }

    #[test]
    fn unset_market_is_not_in_cooldown() {
        let tracker = CooldownTracker::new();
        assert!(!tracker.is_active(&MarketId::new("m2")));
    }
}
