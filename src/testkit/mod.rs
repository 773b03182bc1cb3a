//! Test doubles shared by unit tests and the `tests/` integration suite
//! (A6). Enabled via `#[cfg(test)]` or the `testkit` feature, mirroring
//! the teacher's own `testkit`/`tests/harness` split: deterministic
//! venue/websocket doubles plus builders for the domain primitives they
//! need, so individual test modules don't each reinvent a `Market`.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tokio::sync::mpsc;

use crate::domain::{Market, MarketId, MarketStatus, Outcome, OutcomeId, Venue};
use crate::error::Result;
use crate::venue::{ConnectionState, MarketDataEvent, SubscriptionCommand, VenueWebSocket};

/// A scripted [`VenueWebSocket`]: `run` replays a fixed queue of events
/// then idles until `commands` closes. No network, no reconnect logic —
/// used to drive C4's debounce/cache behavior deterministically.
pub struct ScriptedVenueWebSocket {
    venue: Venue,
    events: Mutex<VecDeque<MarketDataEvent>>,
}

impl ScriptedVenueWebSocket {
    #[must_use]
    pub fn new(venue: Venue, events: Vec<MarketDataEvent>) -> Self {
        Self { venue, events: Mutex::new(events.into()) }
    }
}

#[async_trait]
impl VenueWebSocket for ScriptedVenueWebSocket {
    fn venue(&self) -> Venue {
        self.venue
    }

    fn state(&self) -> ConnectionState {
        ConnectionState::Subscribed
    }

    async fn run(&mut self, mut commands: mpsc::UnboundedReceiver<SubscriptionCommand>, events: mpsc::UnboundedSender<MarketDataEvent>) -> Result<()> {
        while let Some(event) = self.events.lock().expect("scripted stream mutex poisoned").pop_front() {
            if events.send(event).is_err() {
                return Ok(());
            }
        }
        while commands.recv().await.is_some() {}
        Ok(())
    }
}

/// Builds a two-outcome `{YES, NO}` market at the given `yes`/`no` ask
/// prices, bid one tick below. Good enough to exercise the arbitrage and
/// strategy detectors without a real venue round trip.
#[must_use]
pub fn binary_market(venue: Venue, market_id: &str, yes_ask: Decimal, no_ask: Decimal) -> Market {
    let tick = dec!(0.01);
    Market {
        id: MarketId::new(market_id),
        venue,
        external_id: market_id.to_string(),
        title: format!("test market {market_id}"),
        description: String::new(),
        category: None,
        end_date: Utc::now() + chrono::Duration::days(7),
        outcomes: vec![
            Outcome {
                id: OutcomeId::new("yes"),
                external_id: "yes".into(),
                name: "YES".into(),
                is_yes: true,
                probability: None,
                best_bid: Some(yes_ask - tick),
                best_ask: Some(yes_ask),
                bid_size: Some(dec!(500)),
                ask_size: Some(dec!(500)),
            },
            Outcome {
                id: OutcomeId::new("no"),
                external_id: "no".into(),
                name: "NO".into(),
                is_yes: false,
                probability: None,
                best_bid: Some(no_ask - tick),
                best_ask: Some(no_ask),
                bid_size: Some(dec!(500)),
                ask_size: Some(dec!(500)),
            },
        ],
        volume_24h: dec!(100_000),
        liquidity: dec!(50_000),
        status: MarketStatus::Active,
        is_active: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn scripted_websocket_replays_events_then_idles_on_commands_close() {
        let mut ws = ScriptedVenueWebSocket::new(
            Venue::Polymarket,
            vec![MarketDataEvent::FeedDegraded { reason: "test".into() }],
        );
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (event_tx, mut event_rx) = mpsc::unbounded_channel();
        drop(cmd_tx);

        ws.run(cmd_rx, event_tx).await.unwrap();
        assert!(matches!(event_rx.recv().await, Some(MarketDataEvent::FeedDegraded { .. })));
        assert!(event_rx.recv().await.is_none());
    }

    #[test]
    fn binary_market_builder_produces_a_quoted_pair() {
        let market = binary_market(Venue::Kalshi, "m1", dec!(0.48), dec!(0.49));
        assert!(market.is_binary());
        assert!(market.yes_outcome().unwrap().is_quoted());
    }
}
