//! Order Manager (C11): the sole write path for orders, positions, and
//! trades. Every placement runs the pre-write policy in order — kill switch,
//! then position limits, then the venue's rate limiter — before reaching a
//! real venue client or the paper-trading mirror.

pub mod paper;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;

use crate::domain::{MarketId, Order, OrderId, OrderRequest, OrderStatus, OutcomeId, Position, Trade, TradeId, Venue};
use crate::error::{Error, Result};
use crate::events::{EventBus, OrderEvent};
use crate::execution::OrderSink;
use crate::persistence::ExecutionLog;
use crate::ratelimit::RateLimiterRegistry;
use crate::risk::RiskCore;
use crate::venue::VenueClient;

/// Which limiter name a venue's order-placement calls should acquire from,
/// matching [`RateLimiterRegistry::with_default_venues`].
fn order_limiter_name(venue: Venue) -> &'static str {
    match venue {
        Venue::Polymarket => "polymarket.orders",
        Venue::Kalshi => "kalshi.orders",
    }
}

pub struct OrderManager {
    risk: Arc<RiskCore>,
    limiters: Arc<RateLimiterRegistry>,
    clients: HashMap<Venue, Arc<dyn VenueClient>>,
    orders: RwLock<HashMap<OrderId, Order>>,
    positions: RwLock<HashMap<(MarketId, OutcomeId), Position>>,
    trades: RwLock<Vec<Trade>>,
    events: EventBus,
    execution_log: Option<Arc<ExecutionLog>>,
}

impl OrderManager {
    #[must_use]
    pub fn new(risk: Arc<RiskCore>, limiters: Arc<RateLimiterRegistry>, clients: HashMap<Venue, Arc<dyn VenueClient>>) -> Self {
        Self {
            risk,
            limiters,
            clients,
            orders: RwLock::new(HashMap::new()),
            positions: RwLock::new(HashMap::new()),
            trades: RwLock::new(Vec::new()),
            events: EventBus::default(),
            execution_log: None,
        }
    }

    /// Persists every fill to SQLite in addition to the in-memory store.
    /// Optional: unit tests and the paper-trading path run without it.
    #[must_use]
    pub fn with_execution_log(mut self, log: Arc<ExecutionLog>) -> Self {
        self.execution_log = Some(log);
        self
    }

    /// Risk Core and strategies subscribe here rather than holding a
    /// reference back to the manager.
    #[must_use]
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<OrderEvent> {
        self.events.subscribe()
    }

    pub async fn cancel_order(&self, venue: Venue, order_id: &OrderId) -> Result<()> {
        let client = self.client_for(venue)?;
        client.cancel_order(order_id).await?;
        if let Some(order) = self.orders.write().get_mut(order_id) {
            let _ = order.apply_status(OrderStatus::Cancelled, Utc::now());
            self.events.publish(OrderEvent::Cancelled(order.clone()));
        }
        Ok(())
    }

    pub async fn cancel_all_orders(&self, venue: Venue, market_id: Option<&MarketId>) -> Result<()> {
        let client = self.client_for(venue)?;
        client.cancel_all_orders(market_id).await?;
        let mut orders = self.orders.write();
        for order in orders.values_mut().filter(|o| o.venue == venue && !o.status.is_terminal()) {
            if market_id.is_some_and(|m| m != &order.market_id) {
                continue;
            }
            let _ = order.apply_status(OrderStatus::Cancelled, Utc::now());
            self.events.publish(OrderEvent::Cancelled(order.clone()));
        }
        Ok(())
    }

    #[must_use]
    pub fn get_open_orders(&self, venue: Option<Venue>) -> Vec<Order> {
        self.orders
            .read()
            .values()
            .filter(|o| !o.status.is_terminal() && venue.is_none_or_eq(o.venue))
            .cloned()
            .collect()
    }

    #[must_use]
    pub fn get_order(&self, order_id: &OrderId) -> Option<Order> {
        self.orders.read().get(order_id).cloned()
    }

    #[must_use]
    pub fn get_positions(&self, venue: Option<Venue>) -> Vec<Position> {
        self.positions.read().values().filter(|p| venue.is_none_or_eq(p.venue)).cloned().collect()
    }

    #[must_use]
    pub fn get_trades(&self) -> Vec<Trade> {
        self.trades.read().clone()
    }

    fn client_for(&self, venue: Venue) -> Result<Arc<dyn VenueClient>> {
        self.clients.get(&venue).cloned().ok_or_else(|| Error::Validation(format!("no client registered for {venue}")))
    }

    fn record_fill(&self, order: &Order) {
        if order.filled_size_usd.is_zero() {
            return;
        }
        let key = (order.market_id.clone(), order.outcome_id.clone());
        let mut positions = self.positions.write();
        let position = positions.entry(key).or_insert_with(|| Position {
            id: crate::domain::PositionId::generate(),
            venue: order.venue,
            market_id: order.market_id.clone(),
            outcome_id: order.outcome_id.clone(),
            side: if order.side == crate::domain::OrderSide::Buy { crate::domain::PositionSide::Long } else { crate::domain::PositionSide::Short },
            size: rust_decimal::Decimal::ZERO,
            avg_entry_price: rust_decimal::Decimal::ZERO,
            current_price: order.avg_fill_price.unwrap_or(order.price),
            realized_pnl: rust_decimal::Decimal::ZERO,
            is_open: true,
            strategy_id: order.strategy_id.clone(),
            opened_at: Utc::now(),
        });
        position.current_price = order.avg_fill_price.unwrap_or(order.price);
        position.add_fill(order.filled_size_usd, order.avg_fill_price.unwrap_or(order.price));
        position.is_open = !position.size.is_zero();
        drop(positions);

        self.risk.exposure.set(order.venue, order.market_id.clone(), order.outcome_id.clone(), order.filled_size_usd * order.avg_fill_price.unwrap_or(order.price));

        let fill_price = order.avg_fill_price.unwrap_or(order.price);
        let trade = Trade {
            id: TradeId::generate(),
            venue: order.venue,
            order_id: order.id.clone(),
            market_id: order.market_id.clone(),
            outcome_id: order.outcome_id.clone(),
            side: order.side,
            price: fill_price,
            size: order.filled_size_usd,
            fee: order.filled_size_usd * fill_price * self.risk.config().default_taker_fee,
            executed_at: Utc::now(),
        };
        if let Some(log) = &self.execution_log {
            if let Err(error) = log.record_trade(&trade) {
                tracing::warn!(%error, order_id = %order.id, "failed to persist execution log row");
            }
        }
        self.trades.write().push(trade);
    }
}

#[async_trait]
impl OrderSink for OrderManager {
    async fn place_order(&self, request: OrderRequest) -> Result<Order> {
        request.validate()?;
        self.risk.admit_order(&request.market_id, &request.outcome_id, request.size_usd)?;

        let limiter = self.limiters.get(order_limiter_name(request.venue));
        if let Some(limiter) = limiter {
            limiter.acquire(1, std::time::Duration::from_secs(5)).await?;
        }

        let client = self.client_for(request.venue)?;
        let venue = request.venue;
        let strategy_id = request.strategy_id.clone();
        let result = client.place_order(request).await;
        self.risk.api_errors.record(result.is_err(), Utc::now());
        let mut order = match result {
            Ok(order) => order,
            Err(error) => {
                self.events.publish(OrderEvent::Rejected { venue, reason: error.to_string() });
                return Err(error);
            }
        };
        order.strategy_id = strategy_id;

        self.orders.write().insert(order.id.clone(), order.clone());
        self.record_fill(&order);
        self.events.publish(match order.status {
            OrderStatus::Filled => OrderEvent::Filled(order.clone()),
            OrderStatus::Partial => OrderEvent::PartiallyFilled(order.clone()),
            OrderStatus::Rejected => OrderEvent::Rejected { venue: order.venue, reason: "rejected by venue".into() },
            _ => OrderEvent::Placed(order.clone()),
        });
        Ok(order)
    }
}

/// `None` matches everything; `Some(v)` matches only `v`.
trait VenueFilter {
    fn is_none_or_eq(self, venue: Venue) -> bool;
}

impl VenueFilter for Option<Venue> {
    fn is_none_or_eq(self, venue: Venue) -> bool {
        self.is_none_or(|v| v == venue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::risk::RiskConfig;
    use crate::domain::{Market, OrderSide, OrderType};
    use crate::venue::MarketFilter;
    use rust_decimal_macros::dec;

    struct StubClient {
        venue: Venue,
        status: OrderStatus,
    }

    #[async_trait]
    impl VenueClient for StubClient {
        fn venue(&self) -> Venue {
            self.venue
        }
        async fn connect(&self) -> Result<()> {
            Ok(())
        }
        async fn get_markets(&self, _filter: MarketFilter) -> Result<Vec<Market>> {
            Ok(Vec::new())
        }
        async fn get_market(&self, _external_id: &str) -> Result<Market> {
            unimplemented!()
        }
        async fn get_order_book(&self, _market_id: &MarketId, _outcome_id: &OutcomeId) -> Result<crate::domain::OrderBook> {
            unimplemented!()
        }
        async fn place_order(&self, request: OrderRequest) -> Result<Order> {
            let now = Utc::now();
            Ok(Order {
                id: OrderId::generate(),
                venue: request.venue,
                external_order_id: None,
                market_id: request.market_id,
                outcome_id: request.outcome_id,
                side: request.side,
                price: request.price,
                size_usd: request.size_usd,
                filled_size_usd: if self.status == OrderStatus::Rejected { dec!(0) } else { request.size_usd },
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
            Ok(())
        }
        async fn get_balance(&self) -> Result<rust_decimal::Decimal> {
            Ok(dec!(0))
        }
        async fn get_positions(&self) -> Result<Vec<Position>> {
            Ok(Vec::new())
        }
        async fn get_trades(&self, _limit: Option<usize>) -> Result<Vec<Trade>> {
            Ok(Vec::new())
        }
    }

    fn manager(status: OrderStatus) -> OrderManager {
        let mut clients: HashMap<Venue, Arc<dyn VenueClient>> = HashMap::new();
        clients.insert(Venue::Polymarket, Arc::new(StubClient { venue: Venue::Polymarket, status }));
        OrderManager::new(Arc::new(RiskCore::new(RiskConfig::default())), Arc::new(RateLimiterRegistry::with_default_venues()), clients)
    }

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

    #[tokio::test]
    async fn place_order_records_order_and_position() {
        let manager = manager(OrderStatus::Filled);
        let order = manager.place_order(request()).await.unwrap();
        assert_eq!(order.status, OrderStatus::Filled);
        assert_eq!(manager.get_positions(None).len(), 1);
        assert_eq!(manager.get_open_orders(None).len(), 0);
    }

    #[tokio::test]
    async fn place_order_rejects_when_kill_switch_active() {
        let manager = manager(OrderStatus::Filled);
        manager.risk.trigger_manual("test stop");
        let result = manager.place_order(request()).await;
        assert!(matches!(result, Err(Error::KillSwitchActive(_))));
    }

    #[tokio::test]
    async fn place_order_rejects_when_no_client_registered_for_venue() {
        let manager = manager(OrderStatus::Filled);
        let mut req = request();
        req.venue = Venue::Kalshi;
        assert!(manager.place_order(req).await.is_err());
    }
}
