//! Fan-out price update events produced by the Market Data Service (C4).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::{MarketId, OutcomeId};
use super::money::{Price, Size};
use super::venue::Venue;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceSource {
    /// Derived from a normalized WebSocket orderbook event.
    Stream,
    /// Synthesized by the REST fallback poller.
    Poll,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceUpdate {
    pub venue: Venue,
    pub market_id: MarketId,
    pub outcome_id: OutcomeId,
    pub best_bid: Option<Price>,
    pub best_ask: Option<Price>,
    pub bid_size: Option<Size>,
    pub ask_size: Option<Size>,
    pub mid_price: Option<Price>,
    pub spread: Option<Price>,
    pub timestamp: DateTime<Utc>,
    pub source: PriceSource,
}

impl PriceUpdate {
    #[must_use]
    pub fn from_book(
        venue: Venue,
        book: &super::OrderBook,
        source: PriceSource,
        now: DateTime<Utc>,
    ) -> Self {
        let best_bid = book.best_bid().map(|l| l.price);
        let best_ask = book.best_ask().map(|l| l.price);
        Self {
            venue,
            market_id: book.market_id.clone(),
            outcome_id: book.outcome_id.clone(),
            best_bid,
            best_ask,
            bid_size: book.best_bid().map(|l| l.size),
            ask_size: book.best_ask().map(|l| l.size),
            mid_price: book.mid_price(),
            spread: book.spread(),
            timestamp: now,
            source,
        }
    }
}
