//! Position types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::{MarketId, OutcomeId, PositionId, StrategyId};
use super::money::{Price, Size};
use super::venue::Venue;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionSide {
    Long,
    Short,
}

/// `size >= 0`; direction lives in `side`. A closed position retains its
/// `realized_pnl` with `is_open = false`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    pub id: PositionId,
    pub venue: Venue,
    pub market_id: MarketId,
    pub outcome_id: OutcomeId,
    pub side: PositionSide,
    pub size: Size,
    pub avg_entry_price: Price,
    pub current_price: Price,
    pub realized_pnl: Price,
    pub is_open: bool,
    pub strategy_id: Option<StrategyId>,
    pub opened_at: DateTime<Utc>,
}

impl Position {
    #[must_use]
    pub fn unrealized_pnl(&self) -> Price {
        let diff = self.current_price - self.avg_entry_price;
        match self.side {
            PositionSide::Long => diff * self.size,
            PositionSide::Short => -diff * self.size,
        }
    }

    /// Notional exposure, used by the risk core's per-market/aggregate caps.
    #[must_use]
    pub fn exposure(&self) -> Size {
        self.size * self.current_price
    }

    /// Apply a fill of `fill_size` at `fill_price` to the same side,
    /// recomputing the weighted-average entry price.
    pub fn add_fill(&mut self, fill_size: Size, fill_price: Price) {
        let total_size = self.size + fill_size;
        if total_size.is_zero() {
            self.avg_entry_price = Price::ZERO;
        } else {
            self.avg_entry_price =
                (self.avg_entry_price * self.size + fill_price * fill_size) / total_size;
        }
        self.size = total_size;
    }

    /// Close the position, realizing P&L at `exit_price`.
    pub fn close(&mut self, exit_price: Price) {
        let diff = exit_price - self.avg_entry_price;
        let pnl = match self.side {
            PositionSide::Long => diff * self.size,
            PositionSide::Short => -diff * self.size,
        };
        self.realized_pnl += pnl;
        self.size = Size::ZERO;
        self.is_open = false;
    }
}
