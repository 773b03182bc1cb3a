//! Paper-trading mirror: an in-memory [`VenueClient`] that fills against the
//! live cached order book instead of a real exchange.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::domain::{
    Market, MarketId, Order, OrderId, OrderBook, OrderRequest, OrderSide, OrderStatus, OutcomeId,
    Position, PositionId, PositionSide, Trade, TradeId, Venue,
};
use crate::error::{Error, Result};
use crate::marketdata::{CacheKey, MarketDataService};
use crate::venue::{MarketFilter, VenueClient};

pub struct PaperVenueClient {
    venue: Venue,
    market_data: Arc<MarketDataService>,
    balance: Mutex<Decimal>,
    orders: Mutex<HashMap<OrderId, Order>>,
    positions: Mutex<HashMap<(MarketId, OutcomeId), Position>>,
    trades: Mutex<Vec<Trade>>,
}

impl PaperVenueClient {
    #[must_use]
    pub fn new(venue: Venue, market_data: Arc<MarketDataService>, starting_balance: Decimal) -> Self {
        Self {
            venue,
            market_data,
            balance: Mutex::new(starting_balance),
            orders: Mutex::new(HashMap::new()),
            positions: Mutex::new(HashMap::new()),
            trades: Mutex::new(Vec::new()),
        }
    }

    fn top_of_book_size(&self, book: &OrderBook, side: OrderSide, price: Decimal) -> Decimal {
        let levels = match side {
            OrderSide::Buy => &book.asks,
            OrderSide::Sell => &book.bids,
        };
        levels
            .iter()
            .find(|level| match side {
                OrderSide::Buy => level.price <= price,
                OrderSide::Sell => level.price >= price,
            })
            .map_or(Decimal::ZERO, |level| level.size)
    }

    fn apply_fill(&self, request: &OrderRequest, fill_size: Decimal, fill_price: Decimal) {
        let mut balance = self.balance.lock();
        let notional = fill_size * fill_price;
        match request.side {
            OrderSide::Buy => *balance -= notional,
            OrderSide::Sell => *balance += notional,
        }
        drop(balance);

        let key = (request.market_id.clone(), request.outcome_id.clone());
        let mut positions = self.positions.lock();
        let position = positions.entry(key).or_insert_with(|| Position {
            id: PositionId::generate(),
            venue: self.venue,
            market_id: request.market_id.clone(),
            outcome_id: request.outcome_id.clone(),
            side: if request.side == OrderSide::Buy { PositionSide::Long } else { PositionSide::Short },
            size: Decimal::ZERO,
            avg_entry_price: Decimal::ZERO,
            current_price: fill_price,
            realized_pnl: Decimal::ZERO,
            is_open: true,
            strategy_id: request.strategy_id.clone(),
            opened_at: Utc::now(),
        });
        position.current_price = fill_price;
        position.add_fill(fill_size, fill_price);
        position.is_open = !position.size.is_zero();
    }
}

#[async_trait]
impl VenueClient for PaperVenueClient {
    fn venue(&self) -> Venue {
        self.venue
    }

    async fn connect(&self) -> Result<()> {
        Ok(())
    }

    async fn get_markets(&self, _filter: MarketFilter) -> Result<Vec<Market>> {
        Ok(Vec::new())
    }

    async fn get_market(&self, external_id: &str) -> Result<Market> {
        Err(Error::NotFound(format!("paper venue has no market catalog for {external_id}")))
    }

    async fn get_order_book(&self, market_id: &MarketId, outcome_id: &OutcomeId) -> Result<OrderBook> {
        let key = CacheKey::new(self.venue, market_id.clone(), outcome_id.clone());
        self.market_data
            .get_order_book(&key)
            .ok_or_else(|| Error::DataStale(format!("{market_id:?}:{outcome_id:?}")))
    }

    /// Fills instantly at the request's limit price if the cached top-of-book
    /// size covers it, partially otherwise (never zero — paper orders always
    /// take at least the available depth, capped at the requested size).
    async fn place_order(&self, request: OrderRequest) -> Result<Order> {
        request.validate()?;
        let key = CacheKey::new(self.venue, request.market_id.clone(), request.outcome_id.clone());
        let book = self.market_data.get_order_book(&key);
        let now = Utc::now();

        let available = book.as_ref().map_or(Decimal::ZERO, |book| self.top_of_book_size(book, request.side, request.price));
        let filled = available.min(request.size_usd);
        let status = if filled.is_zero() {
            OrderStatus::Rejected
        } else if filled >= request.size_usd {
            OrderStatus::Filled
        } else {
            OrderStatus::Partial
        };

        if !filled.is_zero() {
            self.apply_fill(&request, filled, request.price);
            self.trades.lock().push(Trade {
                id: TradeId::generate(),
                venue: self.venue,
                order_id: OrderId::generate(),
                market_id: request.market_id.clone(),
                outcome_id: request.outcome_id.clone(),
                side: request.side,
                price: request.price,
                size: filled,
                fee: dec!(0),
                executed_at: now,
            });
        }

        let order = Order {
            id: OrderId::generate(),
            venue: self.venue,
            external_order_id: None,
            market_id: request.market_id.clone(),
            outcome_id: request.outcome_id.clone(),
            side: request.side,
            price: request.price,
            size_usd: request.size_usd,
            filled_size_usd: filled,
            avg_fill_price: if filled.is_zero() { None } else { Some(request.price) },
            order_type: request.order_type,
            status,
            strategy_id: request.strategy_id,
            created_at: now,
            updated_at: now,
        };
        self.orders.lock().insert(order.id.clone(), order.clone());
        Ok(order)
    }

    async fn cancel_order(&self, order_id: &OrderId) -> Result<()> {
        let mut orders = self.orders.lock();
        let order = orders.get_mut(order_id).ok_or_else(|| Error::NotFound(order_id.to_string()))?;
        order.apply_status(OrderStatus::Cancelled, Utc::now())
    }

    async fn cancel_all_orders(&self, market_id: Option<&MarketId>) -> Result<()> {
        let mut orders = self.orders.lock();
        for order in orders.values_mut() {
            if order.status.is_terminal() {
                continue;
            }
            if market_id.is_some_and(|m| m != &order.market_id) {
                continue;
            }
            let _ = order.apply_status(OrderStatus::Cancelled, Utc::now());
        }
        Ok(())
    }

    async fn get_balance(&self) -> Result<Decimal> {
        Ok(*self.balance.lock())
    }

    async fn get_positions(&self) -> Result<Vec<Position>> {
        Ok(self.positions.lock().values().cloned().collect())
    }

    async fn get_trades(&self, limit: Option<usize>) -> Result<Vec<Trade>> {
        let trades = self.trades.lock();
        Ok(match limit {
            Some(n) => trades.iter().rev().take(n).cloned().collect(),
            None => trades.clone(),
        })
    }
}
