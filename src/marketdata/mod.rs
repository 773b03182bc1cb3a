//! Market Data Service (C4): fan-in from the venue WebSockets, an
//! orderbook/price cache keyed by `(venue, marketId, outcomeId)` with a
//! freshness TTL, and per-key debounced `PriceUpdate` fan-out.
//!
//! Ownership: this module exclusively owns the orderbook/price cache —
//! single writer per key (the WS handler for that venue), many readers.

mod poller;

pub use poller::run_rest_poller;

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::domain::{MarketId, OrderBook, OutcomeId, PriceSource, PriceUpdate, Venue};
use crate::venue::{MarketDataEvent, Subscription, SubscriptionCommand};

const DEFAULT_TTL: Duration = Duration::from_secs(10);
const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub venue: Venue,
    pub market_id: MarketId,
    pub outcome_id: OutcomeId,
}

impl CacheKey {
    #[must_use]
    pub fn new(venue: Venue, market_id: MarketId, outcome_id: OutcomeId) -> Self {
        Self { venue, market_id, outcome_id }
    }
}

struct CachedEntry<T> {
    value: T,
    inserted_at: DateTime<Utc>,
}

/// Configuration knobs exposed to the engine/config layer.
#[derive(Debug, Clone, Copy)]
pub struct MarketDataConfig {
    pub ttl: Duration,
    pub debounce_interval: Duration,
}

impl Default for MarketDataConfig {
    fn default() -> Self {
        Self { ttl: DEFAULT_TTL, debounce_interval: DEFAULT_DEBOUNCE }
    }
}

pub struct MarketDataService {
    config: MarketDataConfig,
    books: DashMap<CacheKey, CachedEntry<OrderBook>>,
    prices: DashMap<CacheKey, CachedEntry<PriceUpdate>>,
    pending_debounce: DashMap<CacheKey, PriceUpdate>,
    debounce_scheduled: DashMap<CacheKey, ()>,
    tracked: DashMap<Venue, HashSet<(MarketId, OutcomeId)>>,
    commands: DashMap<Venue, mpsc::UnboundedSender<SubscriptionCommand>>,
    orderbook_tx: mpsc::UnboundedSender<(CacheKey, OrderBook)>,
    price_tx: mpsc::UnboundedSender<PriceUpdate>,
    degraded_tx: mpsc::UnboundedSender<Venue>,
}

impl MarketDataService {
    #[must_use]
    pub fn new(
        config: MarketDataConfig,
        orderbook_tx: mpsc::UnboundedSender<(CacheKey, OrderBook)>,
        price_tx: mpsc::UnboundedSender<PriceUpdate>,
        degraded_tx: mpsc::UnboundedSender<Venue>,
    ) -> Self {
        Self {
            config,
            books: DashMap::new(),
            prices: DashMap::new(),
            pending_debounce: DashMap::new(),
            debounce_scheduled: DashMap::new(),
            tracked: DashMap::new(),
            commands: DashMap::new(),
            orderbook_tx,
            price_tx,
            degraded_tx,
        }
    }

    /// Register the command channel a venue's WebSocket task listens on, so
    /// `track_market`/`untrack_market` can push live subscribe/unsubscribe.
    pub fn register_venue(&self, venue: Venue, commands: mpsc::UnboundedSender<SubscriptionCommand>) {
        self.commands.insert(venue, commands);
    }

    /// Add a market to the tracked universe. If the venue is already
    /// connected this triggers a live subscription.
    pub fn track_market(&self, venue: Venue, market_id: MarketId, outcome_id: OutcomeId) {
        let mut set = self.tracked.entry(venue).or_default();
        if set.insert((market_id.clone(), outcome_id.clone())) {
            drop(set);
            if let Some(sender) = self.commands.get(&venue) {
                let sub = Subscription::new("book", vec![outcome_id.as_str().to_string()]);
                let _ = sender.send(SubscriptionCommand::Subscribe(sub));
            }
        }
    }

    /// Remove a market from the tracked universe: unsubscribes live and
    /// evicts its cache entries.
    pub fn untrack_market(&self, venue: Venue, market_id: &MarketId, outcome_id: &OutcomeId) {
        if let Some(mut set) = self.tracked.get_mut(&venue) {
            set.remove(&(market_id.clone(), outcome_id.clone()));
        }
        if let Some(sender) = self.commands.get(&venue) {
            let sub = Subscription::new("book", vec![outcome_id.as_str().to_string()]);
            let _ = sender.send(SubscriptionCommand::Unsubscribe(sub));
        }
        let key = CacheKey::new(venue, market_id.clone(), outcome_id.clone());
        self.books.remove(&key);
        self.prices.remove(&key);
    }

    #[must_use]
    pub fn tracked_markets(&self, venue: Venue) -> Vec<(MarketId, OutcomeId)> {
        self.tracked.get(&venue).map(|s| s.iter().cloned().collect()).unwrap_or_default()
    }

    /// Read the cached orderbook, honoring the freshness TTL. Returns
    /// `None` ("unknown") if the entry is missing or stale.
    #[must_use]
    pub fn get_order_book(&self, key: &CacheKey) -> Option<OrderBook> {
        let entry = self.books.get(key)?;
        if Utc::now() - entry.inserted_at > chrono::Duration::from_std(self.config.ttl).unwrap_or_default() {
            return None;
        }
        Some(entry.value.clone())
    }

    #[must_use]
    pub fn get_price(&self, key: &CacheKey) -> Option<PriceUpdate> {
        let entry = self.prices.get(key)?;
        if Utc::now() - entry.inserted_at > chrono::Duration::from_std(self.config.ttl).unwrap_or_default() {
            return None;
        }
        Some(entry.value.clone())
    }

    /// Ingest one normalized event from a venue WebSocket (C3).
    pub fn handle_event(self: &Arc<Self>, venue: Venue, event: MarketDataEvent) {
        match event {
            MarketDataEvent::OrderBookSnapshot { market_id, outcome_id, book }
            | MarketDataEvent::OrderBookDelta { market_id, outcome_id, book, .. } => {
                self.ingest_book(venue, market_id, outcome_id, book, PriceSource::Stream);
            }
            MarketDataEvent::Trade { .. } | MarketDataEvent::OrderUpdate { .. } => {}
            MarketDataEvent::FeedDegraded { reason } => {
                warn!(%venue, %reason, "market data feed degraded");
                let _ = self.degraded_tx.send(venue);
            }
        }
    }

    /// Ingest one polled top-of-book snapshot (C4's REST fallback poller).
    pub fn ingest_poll(self: &Arc<Self>, venue: Venue, market_id: MarketId, outcome_id: OutcomeId, book: OrderBook) {
        self.ingest_book(venue, market_id, outcome_id, book, PriceSource::Poll);
    }

    fn ingest_book(
        self: &Arc<Self>,
        venue: Venue,
        market_id: MarketId,
        outcome_id: OutcomeId,
        mut book: OrderBook,
        source: PriceSource,
    ) {
        book.normalize();
        let key = CacheKey::new(venue, market_id, outcome_id);
        let now = Utc::now();
        self.books.insert(key.clone(), CachedEntry { value: book.clone(), inserted_at: now });
        // Orderbook events are emitted immediately, without debounce.
        let _ = self.orderbook_tx.send((key.clone(), book.clone()));

        let update = PriceUpdate::from_book(venue, &book, source, now);
        self.prices.insert(key.clone(), CachedEntry { value: update.clone(), inserted_at: now });
        self.schedule_debounced_emit(key, update);
    }

    fn schedule_debounced_emit(self: &Arc<Self>, key: CacheKey, update: PriceUpdate) {
        self.pending_debounce.insert(key.clone(), update);
        if self.debounce_scheduled.insert(key.clone(), ()).is_some() {
            // Already scheduled; the pending entry above is what gets emitted.
            return;
        }
        let this = Arc::clone(self);
        let debounce_key = key.clone();
        tokio::spawn(async move {
            tokio::time::sleep(this.config.debounce_interval).await;
            this.debounce_scheduled.remove(&debounce_key);
            if let Some((_, update)) = this.pending_debounce.remove(&debounce_key) {
                debug!(venue = %debounce_key.venue, market = %debounce_key.market_id, "emitting debounced price update");
                let _ = this.price_tx.send(update);
            }
        });
    }
}
