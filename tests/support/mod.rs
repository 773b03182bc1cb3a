//! Shared integration-test helpers: a scriptable [`VenueClient`] stub.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use edgelord_core::domain::{
    Market, MarketId, Order, OrderBook, OrderId, OrderRequest, OrderStatus, OutcomeId, Position, Trade, Venue,
};
use edgelord_core::error::Result;
use edgelord_core::venue::{MarketFilter, VenueClient};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Fills every order at the requested price, at the status handed to
/// [`StubVenueClient::new`] — good enough to drive the Order Manager and
/// Trading Engine end to end without a real exchange.
pub struct StubVenueClient {
    venue: Venue,
    status: OrderStatus,
    fill_fraction: Decimal,
    markets: Vec<Market>,
    placed: Mutex<Vec<OrderRequest>>,
    cancel_all_calls: std::sync::atomic::AtomicUsize,
}

impl StubVenueClient {
    #[must_use]
    pub fn new(venue: Venue, status: OrderStatus) -> Self {
        Self {
            venue,
            status,
            fill_fraction: Decimal::ONE,
            markets: Vec::new(),
            placed: Mutex::new(Vec::new()),
            cancel_all_calls: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    #[must_use]
    pub fn cancel_all_calls(&self) -> usize {
        self.cancel_all_calls.load(std::sync::atomic::Ordering::SeqCst)
    }

    #[must_use]
    pub fn with_fill_fraction(mut self, fraction: Decimal) -> Self {
        self.fill_fraction = fraction;
        self
    }

    #[must_use]
    pub fn with_markets(mut self, markets: Vec<Market>) -> Self {
        self.markets = markets;
        self
    }

    #[must_use]
    pub fn placed_orders(&self) -> Vec<OrderRequest> {
        self.placed.lock().clone()
    }
}

#[async_trait]
impl VenueClient for StubVenueClient {
    fn venue(&self) -> Venue {
        self.venue
    }

    async fn connect(&self) -> Result<()> {
        Ok(())
    }

    async fn get_markets(&self, _filter: MarketFilter) -> Result<Vec<Market>> {
        Ok(self.markets.clone())
    }

    async fn get_market(&self, _external_id: &str) -> Result<Market> {
        unimplemented!("not exercised by these tests")
    }

    async fn get_order_book(&self, _market_id: &MarketId, _outcome_id: &OutcomeId) -> Result<OrderBook> {
        unimplemented!("not exercised by these tests")
    }

    async fn place_order(&self, request: OrderRequest) -> Result<Order> {
        self.placed.lock().push(request.clone());
        let now = Utc::now();
        let filled = if self.status == OrderStatus::Rejected { Decimal::ZERO } else { request.size_usd * self.fill_fraction };
        Ok(Order {
            id: OrderId::generate(),
            venue: request.venue,
            external_order_id: None,
            market_id: request.market_id,
            outcome_id: request.outcome_id,
            side: request.side,
            price: request.price,
            size_usd: request.size_usd,
            filled_size_usd: filled,
            avg_fill_price: Some(request.price),
            order_type: request.order_type,
            status: self.status,
            strategy_id: request.strategy_id,
            created_at: now,
            updated_at: now,
        })
    }

    async fn cancel_order(&self, _order_id: &OrderId) -> Result<()> {
        Ok(())
    }

    async fn cancel_all_orders(&self, _market_id: Option<&MarketId>) -> Result<()> {
        self.cancel_all_calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        Ok(())
    }

    async fn get_balance(&self) -> Result<Decimal> {
        Ok(dec!(0))
    }

    async fn get_positions(&self) -> Result<Vec<Position>> {
        Ok(Vec::new())
    }

    async fn get_trades(&self, _limit: Option<usize>) -> Result<Vec<Trade>> {
        Ok(Vec::new())
    }
}

#[must_use]
pub fn single_client_map(venue: Venue, client: Arc<dyn VenueClient>) -> HashMap<Venue, Arc<dyn VenueClient>> {
    let mut map = HashMap::new();
    map.insert(venue, client);
    map
}

use std::sync::atomic::{AtomicUsize, Ordering};

use edgelord_core::execution::OrderSink;

/// Fills the first `fill_count` calls, rejects every call after — used to
/// force a partial fill into the arbitrage executor's unwind path.
pub struct ScriptedOrderSink {
    fill_count: usize,
    calls: AtomicUsize,
}

impl ScriptedOrderSink {
    #[must_use]
    pub fn new(fill_count: usize) -> Self {
        Self { fill_count, calls: AtomicUsize::new(0) }
    }
}

#[async_trait]
impl OrderSink for ScriptedOrderSink {
    async fn place_order(&self, request: OrderRequest) -> Result<Order> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        let now = Utc::now();
        let status = if call < self.fill_count { OrderStatus::Filled } else { OrderStatus::Rejected };
        Ok(Order {
            id: OrderId::generate(),
            venue: request.venue,
            external_order_id: None,
            market_id: request.market_id,
            outcome_id: request.outcome_id,
            side: request.side,
            price: request.price,
            size_usd: request.size_usd,
            filled_size_usd: if status == OrderStatus::Filled { request.size_usd } else { dec!(0) },
            avg_fill_price: Some(request.price),
            order_type: request.order_type,
            status,
            strategy_id: None,
            created_at: now,
            updated_at: now,
        })
    }
}
