//! Admin/ops façade (A5): a narrow trait exposing what an operator needs to
//! see into a running engine, with no HTTP framework wired in — mounting
//! this onto a server is explicitly out of scope.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{Order, OrderId, Venue};
use crate::error::Result;
use crate::order_manager::OrderManager;
use crate::risk::RiskCore;

#[derive(Debug, Clone, Serialize)]
pub struct HealthSnapshot {
    pub halted: bool,
    pub daily_pnl: rust_decimal::Decimal,
    pub open_order_count: usize,
    pub position_count: usize,
    pub as_of: DateTime<Utc>,
}

#[async_trait]
pub trait OpsPort: Send + Sync {
    fn list_orders(&self, venue: Option<Venue>) -> Vec<Order>;
    fn get_order(&self, order_id: &OrderId) -> Option<Order>;
    async fn cancel_order(&self, order_id: &OrderId) -> Result<()>;
    fn list_strategies(&self) -> Vec<String>;
    fn health_snapshot(&self) -> HealthSnapshot;
    fn metrics_text(&self) -> String;
}

/// Default `OpsPort`, wiring the Order Manager, Risk Core, and Prometheus
/// handle that a binary already builds at startup.
pub struct Ops {
    orders: Arc<OrderManager>,
    risk: Arc<RiskCore>,
    strategies: Vec<String>,
    metrics: Arc<crate::metrics::PrometheusHandle>,
}

impl Ops {
    #[must_use]
    pub fn new(orders: Arc<OrderManager>, risk: Arc<RiskCore>, strategies: Vec<String>, metrics: Arc<crate::metrics::PrometheusHandle>) -> Self {
        Self { orders, risk, strategies, metrics }
    }
}

#[async_trait]
impl OpsPort for Ops {
    fn list_orders(&self, venue: Option<Venue>) -> Vec<Order> {
        self.orders.get_open_orders(venue)
    }

    fn get_order(&self, order_id: &OrderId) -> Option<Order> {
        self.orders.get_order(order_id)
    }

    async fn cancel_order(&self, order_id: &OrderId) -> Result<()> {
        let order = self.orders.get_order(order_id).ok_or_else(|| crate::error::Error::NotFound(order_id.to_string()))?;
        self.orders.cancel_order(order.venue, order_id).await
    }

    fn list_strategies(&self) -> Vec<String> {
        self.strategies.clone()
    }

    fn health_snapshot(&self) -> HealthSnapshot {
        HealthSnapshot {
            halted: self.risk.is_halted(),
            daily_pnl: self.risk.daily_pnl(),
            open_order_count: self.orders.get_open_orders(None).len(),
            position_count: self.orders.get_positions(None).len(),
            as_of: Utc::now(),
        }
    }

    fn metrics_text(&self) -> String {
        self.metrics.render()
    }
}
