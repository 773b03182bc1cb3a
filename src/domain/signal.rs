//! Trading signal types produced by strategy detectors (C8).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::{MarketId, OutcomeId, SignalId, StrategyId};
use super::money::{Price, Size};
use super::order::OrderSide;

/// One leg of a fixed-list batch intent, carried in
/// `TradingSignal::metadata.batch`. Used for intra-market sum-arbitrage
/// signals that must be placed atomically across two outcomes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchLeg {
    pub market_id: MarketId,
    pub outcome_id: OutcomeId,
    pub side: OrderSide,
    pub price: Price,
    pub size: Size,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradingSignal {
    pub id: SignalId,
    pub strategy_id: StrategyId,
    pub market_id: MarketId,
    pub outcome_id: OutcomeId,
    pub side: OrderSide,
    pub price: Price,
    pub size: Size,
    pub confidence: Price,
    pub reason: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub batch: Option<Vec<BatchLeg>>,
}

impl TradingSignal {
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    #[must_use]
    pub fn is_batch(&self) -> bool {
        self.batch.as_ref().is_some_and(|b| !b.is_empty())
    }
}
