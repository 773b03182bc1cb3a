//! Market and outcome types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::{MarketId, OutcomeId};
use super::money::Price;
use super::venue::Venue;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketStatus {
    Active,
    Suspended,
    Resolved,
}

/// A single outcome within a market.
///
/// Invariant: `0 <= best_bid <= best_ask <= 1`. If either side is absent the
/// outcome is considered unquoted — callers must check before trading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Outcome {
    pub id: OutcomeId,
    pub external_id: String,
    pub name: String,
    pub is_yes: bool,
    pub probability: Option<Price>,
    pub best_bid: Option<Price>,
    pub best_ask: Option<Price>,
    pub bid_size: Option<Price>,
    pub ask_size: Option<Price>,
}

impl Outcome {
    /// True when both sides of the book are present and internally consistent.
    #[must_use]
    pub fn is_quoted(&self) -> bool {
        match (self.best_bid, self.best_ask) {
            (Some(bid), Some(ask)) => bid <= ask,
            _ => false,
        }
    }
}

/// Immutable-within-snapshot market record.
///
/// A binary market has exactly two outcomes, `YES` and `NO`. Prices are
/// always normalized to `[0, 1]`; source-side cent encodings never leak past
/// the venue client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Market {
    pub id: MarketId,
    pub venue: Venue,
    pub external_id: String,
    pub title: String,
    pub description: String,
    pub category: Option<String>,
    pub end_date: DateTime<Utc>,
    pub outcomes: Vec<Outcome>,
    pub volume_24h: Price,
    pub liquidity: Price,
    pub status: MarketStatus,
    pub is_active: bool,
}

impl Market {
    /// True for the two-outcome `{YES, NO}` shape every binary-market
    /// detector assumes.
    #[must_use]
    pub fn is_binary(&self) -> bool {
        self.outcomes.len() == 2 && self.outcomes.iter().filter(|o| o.is_yes).count() == 1
    }

    #[must_use]
    pub fn yes_outcome(&self) -> Option<&Outcome> {
        self.outcomes.iter().find(|o| o.is_yes)
    }

    #[must_use]
    pub fn no_outcome(&self) -> Option<&Outcome> {
        self.outcomes.iter().find(|o| !o.is_yes)
    }

    /// Hours remaining until `end_date`, relative to `now`. Negative once
    /// resolution has passed.
    #[must_use]
    pub fn hours_to_resolution(&self, now: DateTime<Utc>) -> f64 {
        (self.end_date - now).num_seconds() as f64 / 3600.0
    }
}
