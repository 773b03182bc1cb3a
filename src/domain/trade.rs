//! Trade (fill) records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::{MarketId, OrderId, OutcomeId, TradeId};
use super::money::{Price, Size};
use super::order::OrderSide;
use super::venue::Venue;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trade {
    pub id: TradeId,
    pub venue: Venue,
    pub order_id: OrderId,
    pub market_id: MarketId,
    pub outcome_id: OutcomeId,
    pub side: OrderSide,
    pub price: Price,
    pub size: Size,
    pub fee: Price,
    pub executed_at: DateTime<Utc>,
}

impl Trade {
    /// Notional value of the fill before fees.
    #[must_use]
    pub fn notional(&self) -> Size {
        self.price * self.size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn notional_is_price_times_size() {
        let trade = Trade {
            id: TradeId::new("1"),
            venue: Venue::Kalshi,
            order_id: OrderId::new("o1"),
            market_id: MarketId::new("m1"),
            outcome_id: OutcomeId::new("yes"),
            side: OrderSide::Buy,
            price: dec!(0.30),
            size: dec!(50),
            fee: dec!(0.10),
            executed_at: Utc::now(),
        };
        assert_eq!(trade.notional(), dec!(15.00));
    }
}
