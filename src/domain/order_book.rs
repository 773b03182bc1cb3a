//! Order book snapshot type.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::{MarketId, OutcomeId};
use super::money::Price;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceLevel {
    pub price: Price,
    pub size: Price,
}

/// `{marketId, outcomeId, bids[], asks[], timestamp}`.
///
/// Bids are sorted descending by price, asks ascending — callers may rely on
/// `bids[0]`/`asks[0]` being best-bid/best-ask.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderBook {
    pub market_id: MarketId,
    pub outcome_id: OutcomeId,
    pub bids: Vec<PriceLevel>,
    pub asks: Vec<PriceLevel>,
    pub timestamp: DateTime<Utc>,
}

impl OrderBook {
    #[must_use]
    pub fn best_bid(&self) -> Option<PriceLevel> {
        self.bids.first().copied()
    }

    #[must_use]
    pub fn best_ask(&self) -> Option<PriceLevel> {
        self.asks.first().copied()
    }

    #[must_use]
    pub fn mid_price(&self) -> Option<Price> {
        let bid = self.best_bid()?.price;
        let ask = self.best_ask()?.price;
        Some((bid + ask) / rust_decimal::Decimal::TWO)
    }

    #[must_use]
    pub fn spread(&self) -> Option<Price> {
        let bid = self.best_bid()?.price;
        let ask = self.best_ask()?.price;
        Some(ask - bid)
    }

    /// Sort bids descending and asks ascending in place, enforcing the
    /// invariant callers rely on.
    pub fn normalize(&mut self) {
        self.bids
            .sort_by(|a, b| b.price.cmp(&a.price));
        self.asks.sort_by(|a, b| a.price.cmp(&b.price));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn book() -> OrderBook {
        OrderBook {
            market_id: MarketId::new("m1"),
            outcome_id: OutcomeId::new("yes"),
            bids: vec![
                PriceLevel { price: dec!(0.47), size: dec!(100) },
                PriceLevel { price: dec!(0.46), size: dec!(50) },
            ],
            asks: vec![
                PriceLevel { price: dec!(0.48), size: dec!(200) },
                PriceLevel { price: dec!(0.49), size: dec!(80) },
            ],
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn best_bid_and_ask_are_first_level() {
        let b = book();
        assert_eq!(b.best_bid().unwrap().price, dec!(0.47));
        assert_eq!(b.best_ask().unwrap().price, dec!(0.48));
    }

    #[test]
    fn mid_price_averages_best_bid_and_ask() {
        assert_eq!(book().mid_price().unwrap(), dec!(0.475));
    }

    #[test]
    fn spread_is_ask_minus_bid() {
        assert_eq!(book().spread().unwrap(), dec!(0.01));
    }

    #[test]
    fn empty_book_has_no_mid_price() {
        let mut b = book();
        b.bids.clear();
        assert!(b.mid_price().is_none());
    }

    #[test]
    fn normalize_sorts_bids_desc_and_asks_asc() {
        let mut b = book();
        b.bids.reverse();
        b.asks.reverse();
        b.normalize();
        assert_eq!(b.bids[0].price, dec!(0.47));
        assert_eq!(b.asks[0].price, dec!(0.48));
    }
}
