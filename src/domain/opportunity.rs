//! Arbitrage opportunity types produced by the arbitrage detector (C7).

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::{MarketId, OpportunityId, OutcomeId};
use super::money::{Price, Size};
use super::order::OrderSide;
use super::venue::Venue;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OpportunityKind {
    SinglePlatform,
    CrossPlatform,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpportunityLeg {
    pub venue: Venue,
    pub market_id: MarketId,
    pub outcome_id: OutcomeId,
    pub side: OrderSide,
    pub price: Price,
    pub size: Size,
    pub max_size: Size,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArbitrageOpportunity {
    pub id: OpportunityId,
    pub kind: OpportunityKind,
    pub legs: Vec<OpportunityLeg>,
    pub gross_spread: Price,
    pub net_spread: Price,
    pub spread_bps: Decimal,
    pub max_size: Size,
    pub max_profit: Price,
    pub confidence: Price,
    pub detected_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub is_valid: bool,
}

impl ArbitrageOpportunity {
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Tie-break rule used when ranking candidate opportunities: higher
    /// `max_profit` first, earlier `detected_at` breaks ties.
    #[must_use]
    pub fn ranks_above(&self, other: &Self) -> bool {
        match self.max_profit.cmp(&other.max_profit) {
            std::cmp::Ordering::Greater => true,
            std::cmp::Ordering::Less => false,
            std::cmp::Ordering::Equal => self.detected_at < other.detected_at,
        }
    }
}
