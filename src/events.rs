//! One-way event bus (§9 redesign note): the Order Manager publishes
//! [`OrderEvent`]s after every write; Risk Core and strategies subscribe.
//! No component holds a reference back to its publisher — the broadcast
//! channel is the only coupling.

use tokio::sync::broadcast;

use crate::domain::{Order, Venue};

#[derive(Debug, Clone)]
pub enum OrderEvent {
    Placed(Order),
    Filled(Order),
    PartiallyFilled(Order),
    Cancelled(Order),
    Rejected { venue: Venue, reason: String },
}

/// Wraps a `broadcast::Sender<OrderEvent>`. Cloning an `EventBus` clones the
/// sender handle, not the channel — every clone publishes onto the same
/// channel and every `subscribe()` call gets its own lagging-tolerant
/// receiver.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<OrderEvent>,
}

impl EventBus {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity);
        Self { tx }
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<OrderEvent> {
        self.tx.subscribe()
    }

    /// Silently dropped if there are currently no subscribers — publishing
    /// is fire-and-forget, never a reason to fail an order placement.
    pub fn publish(&self, event: OrderEvent) {
        let _ = self.tx.send(event);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
