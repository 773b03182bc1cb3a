//! Order types and lifecycle.
//!
//! Lifecycle: `Pending -> (Open|Filled|Rejected)` on venue acknowledgment;
//! `Open -> (Partial|Filled|Cancelled)` via fills/cancels. Terminal states
//! are `{Filled, Cancelled, Rejected}`. Orders are owned exclusively by the
//! Order Manager; strategies and detectors hold only [`super::OrderId`]s.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::{MarketId, OrderId, OutcomeId, StrategyId};
use super::money::{Price, Size};
use super::venue::Venue;
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Buy => Self::Sell,
            Self::Sell => Self::Buy,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderType {
    /// Good-til-cancelled.
    Gtc,
    /// Good-til-date.
    Gtd,
    /// Immediate-or-cancel.
    Ioc,
    /// Fill-or-kill.
    Fok,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    Pending,
    Open,
    Partial,
    Filled,
    Cancelled,
    Rejected,
}

impl OrderStatus {
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Filled | Self::Cancelled | Self::Rejected)
    }
}

/// A request to place an order, validated before it reaches a venue client.
#[derive(Debug, Clone)]
pub struct OrderRequest {
    pub venue: Venue,
    pub market_id: MarketId,
    pub outcome_id: OutcomeId,
    pub side: OrderSide,
    pub price: Price,
    pub size_usd: Size,
    pub order_type: OrderType,
    pub strategy_id: Option<StrategyId>,
}

impl OrderRequest {
    /// Validate `0 < price < 1` and `size_usd > 0` per the venue client
    /// contract (C2). Called before the request reaches the rate limiter.
    pub fn validate(&self) -> Result<()> {
        if self.price <= Price::ZERO || self.price >= Price::ONE {
            return Err(Error::Validation(format!(
                "price {} out of (0,1) range",
                self.price
            )));
        }
        if self.size_usd <= Size::ZERO {
            return Err(Error::Validation(format!(
                "size_usd {} must be positive",
                self.size_usd
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub venue: Venue,
    pub external_order_id: Option<String>,
    pub market_id: MarketId,
    pub outcome_id: OutcomeId,
    pub side: OrderSide,
    pub price: Price,
    pub size_usd: Size,
    pub filled_size_usd: Size,
    pub avg_fill_price: Option<Price>,
    pub order_type: OrderType,
    pub status: OrderStatus,
    pub strategy_id: Option<StrategyId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    #[must_use]
    pub fn remaining_size(&self) -> Size {
        self.size_usd - self.filled_size_usd
    }

    #[must_use]
    pub fn fill_ratio(&self) -> Price {
        if self.size_usd.is_zero() {
            return Price::ZERO;
        }
        self.filled_size_usd / self.size_usd
    }

    /// Apply a venue fill/status transition, enforcing the lifecycle above.
    ///
    /// Cancelling (or otherwise mutating) an already-terminal order is a
    /// no-op that surfaces [`Error::AlreadyTerminal`].
    pub fn apply_status(&mut self, new_status: OrderStatus, now: DateTime<Utc>) -> Result<()> {
        if self.status.is_terminal() {
            return Err(Error::AlreadyTerminal);
        }
        self.status = new_status;
        self.updated_at = now;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn request() -> OrderRequest {
        OrderRequest {
            venue: Venue::Polymarket,
            market_id: MarketId::new("m1"),
            outcome_id: OutcomeId::new("yes"),
            side: OrderSide::Buy,
            price: dec!(0.48),
            size_usd: dec!(100),
            order_type: OrderType::Gtc,
            strategy_id: None,
        }
    }

    #[test]
    fn validate_accepts_in_range_price() {
        assert!(request().validate().is_ok());
    }

    #[test]
    fn validate_rejects_zero_price() {
        let mut r = request();
        r.price = dec!(0);
        assert!(r.validate().is_err());
    }

    #[test]
    fn validate_rejects_price_at_one() {
        let mut r = request();
        r.price = dec!(1);
        assert!(r.validate().is_err());
    }

    #[test]
    fn validate_rejects_non_positive_size() {
        let mut r = request();
        r.size_usd = dec!(0);
        assert!(r.validate().is_err());
    }

    fn order() -> Order {
        let now = Utc::now();
        Order {
            id: OrderId::new("1"),
            venue: Venue::Polymarket,
            external_order_id: None,
            market_id: MarketId::new("m1"),
            outcome_id: OutcomeId::new("yes"),
            side: OrderSide::Buy,
            price: dec!(0.48),
            size_usd: dec!(100),
            filled_size_usd: dec!(0),
            avg_fill_price: None,
            order_type: OrderType::Gtc,
            status: OrderStatus::Pending,
            strategy_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn apply_status_transitions_open_order() {
        let mut o = order();
        o.apply_status(OrderStatus::Open, Utc::now()).unwrap();
        assert_eq!(o.status, OrderStatus::Open);
    }

    #[test]
    fn apply_status_on_terminal_order_errors() {
        let mut o = order();
        o.status = OrderStatus::Filled;
        let err = o.apply_status(OrderStatus::Cancelled, Utc::now());
        assert!(matches!(err, Err(Error::AlreadyTerminal)));
    }

    #[test]
    fn remaining_size_subtracts_filled() {
        let mut o = order();
        o.filled_size_usd = dec!(30);
        assert_eq!(o.remaining_size(), dec!(70));
    }

    #[test]
    fn opposite_side_flips_buy_and_sell() {
        assert_eq!(OrderSide::Buy.opposite(), OrderSide::Sell);
        assert_eq!(OrderSide::Sell.opposite(), OrderSide::Buy);
    }
}
