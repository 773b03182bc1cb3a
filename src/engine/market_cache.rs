//! Live `Market` snapshots the engine composes from venue bootstrap data
//! plus incoming [`PriceUpdate`]s, keyed by `MarketId`. Detectors need a
//! whole market (both outcomes together); the Market Data Service only
//! caches one outcome's book at a time, so this is where the two get
//! stitched back together.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::domain::{Market, MarketId, PriceUpdate};

#[derive(Default)]
pub struct MarketCache {
    markets: RwLock<HashMap<MarketId, Market>>,
}

impl MarketCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upsert(&self, market: Market) {
        self.markets.write().insert(market.id.clone(), market);
    }

    #[must_use]
    pub fn get(&self, market_id: &MarketId) -> Option<Market> {
        self.markets.read().get(market_id).cloned()
    }

    #[must_use]
    pub fn all(&self) -> Vec<Market> {
        self.markets.read().values().cloned().collect()
    }

    /// Folds one outcome's fresh quote into its parent market, leaving the
    /// other outcome and the market's static fields untouched.
    pub fn apply_price_update(&self, update: &PriceUpdate) {
        let mut markets = self.markets.write();
        let Some(market) = markets.get_mut(&update.market_id) else { return };
        let Some(outcome) = market.outcomes.iter_mut().find(|o| o.id == update.outcome_id) else { return };
        outcome.best_bid = update.best_bid;
        outcome.best_ask = update.best_ask;
        outcome.bid_size = update.bid_size;
        outcome.ask_size = update.ask_size;
        outcome.probability = update.mid_price;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MarketStatus, Outcome, OutcomeId, PriceSource, Venue};
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn market() -> Market {
        Market {
            id: MarketId::new("m1"),
            venue: Venue::Polymarket,
            external_id: "m1".into(),
            title: "t".into(),
            description: String::new(),
            category: None,
            end_date: Utc::now() + chrono::Duration::hours(24),
            outcomes: vec![Outcome {
                id: OutcomeId::new("yes"),
                external_id: "yes".into(),
                name: "YES".into(),
                is_yes: true,
                probability: None,
                best_bid: None,
                best_ask: None,
                bid_size: None,
                ask_size: None,
            }],
            volume_24h: dec!(0),
            liquidity: dec!(0),
            status: MarketStatus::Active,
            is_active: true,
        }
    }

    #[test]
    fn price_update_folds_into_matching_outcome() {
        let cache = MarketCache::new();
        cache.upsert(market());
        cache.apply_price_update(&PriceUpdate {
            venue: Venue::Polymarket,
            market_id: MarketId::new("m1"),
            outcome_id: OutcomeId::new("yes"),
            best_bid: Some(dec!(0.47)),
            best_ask: Some(dec!(0.49)),
            bid_size: Some(dec!(10)),
            ask_size: Some(dec!(20)),
            mid_price: Some(dec!(0.48)),
            spread: Some(dec!(0.02)),
            timestamp: Utc::now(),
            source: PriceSource::Stream,
        });
        let updated = cache.get(&MarketId::new("m1")).unwrap();
        assert_eq!(updated.outcomes[0].best_ask, Some(dec!(0.49)));
    }

    #[test]
    fn update_for_unknown_market_is_a_no_op() {
        let cache = MarketCache::new();
        cache.apply_price_update(&PriceUpdate {
            venue: Venue::Polymarket,
            market_id: MarketId::new("missing"),
            outcome_id: OutcomeId::new("yes"),
            best_bid: None,
            best_ask: None,
            bid_size: None,
            ask_size: None,
            mid_price: None,
            spread: None,
            timestamp: Utc::now(),
            source: PriceSource::Poll,
        });
        assert!(cache.get(&MarketId::new("missing")).is_none());
    }
}
