//! The venue-agnostic contract every connector implements (C2/C3).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tokio::sync::mpsc;

use crate::domain::{
    Market, MarketId, Order, OrderId, OrderRequest, OrderBook, OutcomeId, Position, Trade, Venue,
};
use crate::error::Result;

/// Filter applied by [`VenueClient::get_markets`].
#[derive(Debug, Clone, Default)]
pub struct MarketFilter {
    pub active_only: bool,
    /// Capped by the connector to the venue's hard per-call limit (500).
    pub limit: Option<usize>,
}

/// Normalized REST surface shared by both venues (spec-table §4.2).
///
/// Every method is individually rate-limited and retried with backoff by the
/// implementation; callers never see raw transport errors for transient
/// failures that the connector already exhausted its retry budget on.
#[async_trait]
pub trait VenueClient: Send + Sync {
    fn venue(&self) -> Venue;

    async fn connect(&self) -> Result<()>;

    async fn get_markets(&self, filter: MarketFilter) -> Result<Vec<Market>>;

    async fn get_market(&self, external_id: &str) -> Result<Market>;

    async fn get_order_book(&self, market_id: &MarketId, outcome_id: &OutcomeId) -> Result<OrderBook>;

    async fn place_order(&self, request: OrderRequest) -> Result<Order>;

    async fn cancel_order(&self, order_id: &OrderId) -> Result<()>;

    async fn cancel_all_orders(&self, market_id: Option<&MarketId>) -> Result<()>;

    async fn get_balance(&self) -> Result<Decimal>;

    async fn get_positions(&self) -> Result<Vec<Position>>;

    async fn get_trades(&self, limit: Option<usize>) -> Result<Vec<Trade>>;
}

/// `Disconnected -> Connecting -> (Authenticating) -> Connected -> Subscribed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Authenticating,
    Connected,
    Subscribed,
}

/// One `(channel, identifiers)` subscription unit, e.g. `("book", [asset_id])`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Subscription {
    pub channel: String,
    pub identifiers: Vec<String>,
}

impl Subscription {
    #[must_use]
    pub fn new(channel: impl Into<String>, identifiers: Vec<String>) -> Self {
        Self { channel: channel.into(), identifiers }
    }
}

/// Instruction sent from the Market Data Service (C4) to a running
/// WebSocket task (C3) to grow or shrink the tracked-market universe.
#[derive(Debug, Clone)]
pub enum SubscriptionCommand {
    Subscribe(Subscription),
    Unsubscribe(Subscription),
}

/// Normalized event emitted by a venue WebSocket, consumed by C4.
#[derive(Debug, Clone)]
pub enum MarketDataEvent {
    OrderBookSnapshot { market_id: MarketId, outcome_id: OutcomeId, book: OrderBook },
    OrderBookDelta { market_id: MarketId, outcome_id: OutcomeId, book: OrderBook, seq: u64 },
    Trade { market_id: MarketId, outcome_id: OutcomeId, price: Decimal, size: Decimal, at: DateTime<Utc> },
    OrderUpdate { order: Order },
    /// The feed's own transport dropped; C4 should continue serving the
    /// other venue and mark this one's data as unavailable.
    FeedDegraded { reason: String },
}

/// A running connection to a venue's real-time feed.
///
/// `run` owns the full `Disconnected -> ... -> Subscribed` lifecycle
/// including reconnect-with-backoff; it returns only on a non-recoverable
/// error or when `commands` closes (caller-initiated shutdown).
#[async_trait]
pub trait VenueWebSocket: Send + Sync {
    fn venue(&self) -> Venue;

    fn state(&self) -> ConnectionState;

    async fn run(
        &mut self,
        commands: mpsc::UnboundedReceiver<SubscriptionCommand>,
        events: mpsc::UnboundedSender<MarketDataEvent>,
    ) -> Result<()>;
}
