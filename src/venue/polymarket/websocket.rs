//! Polymarket-like WebSocket feed: connect, subscribe, reconnect with
//! backoff, and normalize `book`/`price_change`/`last_trade_price` frames.

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, info, warn};

use super::dto::{SubscribeMessage, WsMessage};
use crate::domain::{MarketId, OrderBook, OutcomeId, PriceLevel, Venue};
use crate::error::Result;
use crate::venue::{ConnectionState, MarketDataEvent, Subscription, SubscriptionCommand, VenueWebSocket};

const MAX_BACKOFF: Duration = Duration::from_secs(30);
const INITIAL_BACKOFF: Duration = Duration::from_millis(500);

pub struct PolymarketWebSocket {
    url: String,
    state: Mutex<ConnectionState>,
}

impl PolymarketWebSocket {
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into(), state: Mutex::new(ConnectionState::Disconnected) }
    }

    fn set_state(&self, state: ConnectionState) {
        *self.state.lock() = state;
    }

    fn parse_levels(levels: &[super::dto::WsPriceLevel]) -> Vec<PriceLevel> {
        levels
            .iter()
            .filter_map(|l| Some(PriceLevel { price: l.price.parse().ok()?, size: l.size.parse().ok()? }))
            .collect()
    }
}

#[async_trait]
impl VenueWebSocket for PolymarketWebSocket {
    fn venue(&self) -> Venue {
        Venue::Polymarket
    }

    fn state(&self) -> ConnectionState {
        *self.state.lock()
    }

    async fn run(
        &mut self,
        mut commands: mpsc::UnboundedReceiver<SubscriptionCommand>,
        events: mpsc::UnboundedSender<MarketDataEvent>,
    ) -> Result<()> {
        let mut tracked: HashSet<Subscription> = HashSet::new();
        let mut backoff = INITIAL_BACKOFF;

        loop {
            self.set_state(ConnectionState::Connecting);
            let connected = connect_async(&self.url).await;

            let mut ws = match connected {
                Ok((ws, _response)) => ws,
                Err(err) => {
                    warn!(error = %err, backoff = ?backoff, "polymarket websocket connect failed");
                    let _ = events.send(MarketDataEvent::FeedDegraded { reason: err.to_string() });
                    tokio::time::sleep(jittered(backoff)).await;
                    backoff = (backoff * 2).min(MAX_BACKOFF);
                    continue;
                }
            };
            backoff = INITIAL_BACKOFF;
            self.set_state(ConnectionState::Connected);
            info!("polymarket websocket connected");

            for sub in &tracked {
                let msg = SubscribeMessage::new(sub.identifiers.clone(), sub.channel.clone());
                if let Ok(json) = serde_json::to_string(&msg) {
                    let _ = ws.send(Message::Text(json)).await;
                }
            }
            self.set_state(ConnectionState::Subscribed);

            let disconnect_reason = loop {
                tokio::select! {
                    command = commands.recv() => {
                        match command {
                            Some(SubscriptionCommand::Subscribe(sub)) => {
                                let msg = SubscribeMessage::new(sub.identifiers.clone(), sub.channel.clone());
                                if let Ok(json) = serde_json::to_string(&msg) {
                                    let _ = ws.send(Message::Text(json)).await;
                                }
                                tracked.insert(sub);
                            }
                            Some(SubscriptionCommand::Unsubscribe(sub)) => {
                                tracked.remove(&sub);
                            }
                            None => return Ok(()),
                        }
                    }
                    frame = ws.next() => {
                        match frame {
                            Some(Ok(Message::Text(text))) => {
                                match serde_json::from_str::<WsMessage>(&text) {
                                    Ok(parsed) => handle_message(parsed, &events),
                                    Err(err) => debug!(error = %err, "unparseable polymarket frame"),
                                }
                            }
                            Some(Ok(Message::Ping(payload))) => {
                                let _ = ws.send(Message::Pong(payload)).await;
                            }
                            Some(Ok(Message::Close(_))) | None => break "server closed connection".to_string(),
                            Some(Ok(_)) => {}
                            Some(Err(err)) => break err.to_string(),
                        }
                    }
                }
            };

            self.set_state(ConnectionState::Disconnected);
            warn!(reason = %disconnect_reason, "polymarket websocket disconnected, reconnecting");
            let _ = events.send(MarketDataEvent::FeedDegraded { reason: disconnect_reason });
            tokio::time::sleep(jittered(backoff)).await;
            backoff = (backoff * 2).min(MAX_BACKOFF);
        }
    }
}

fn handle_message(message: WsMessage, events: &mpsc::UnboundedSender<MarketDataEvent>) {
    match message {
        WsMessage::Book(book) => {
            let outcome_id = OutcomeId::new(book.asset_id.clone());
            let market_id = MarketId::new(book.market.clone().unwrap_or_default());
            let mut orderbook = OrderBook {
                market_id: market_id.clone(),
                outcome_id: outcome_id.clone(),
                bids: PolymarketWebSocket::parse_levels(&book.bids),
                asks: PolymarketWebSocket::parse_levels(&book.asks),
                timestamp: Utc::now(),
            };
            orderbook.normalize();
            let _ = events.send(MarketDataEvent::OrderBookSnapshot { market_id, outcome_id, book: orderbook });
        }
        WsMessage::PriceChange(change) => {
            let outcome_id = OutcomeId::new(change.asset_id.clone());
            let market_id = MarketId::new(change.market.clone().unwrap_or_default());
            let mut orderbook = OrderBook {
                market_id: market_id.clone(),
                outcome_id: outcome_id.clone(),
                bids: vec![],
                asks: vec![],
                timestamp: Utc::now(),
            };
            for level in &change.changes {
                let Some(price) = level.price.parse().ok() else { continue };
                let Some(size) = level.size.parse().ok() else { continue };
                if level.side.eq_ignore_ascii_case("buy") {
                    orderbook.bids.push(PriceLevel { price, size });
                } else {
                    orderbook.asks.push(PriceLevel { price, size });
                }
            }
            orderbook.normalize();
            let _ = events.send(MarketDataEvent::OrderBookDelta { market_id, outcome_id, book: orderbook, seq: 0 });
        }
        WsMessage::Trade(trade) => {
            let outcome_id = OutcomeId::new(trade.asset_id.clone());
            let market_id = MarketId::new(trade.market.clone().unwrap_or_default());
            let price: Decimal = trade.price.parse().unwrap_or_default();
            let size: Decimal = trade.size.parse().unwrap_or_default();
            let _ = events.send(MarketDataEvent::Trade { market_id, outcome_id, price, size, at: Utc::now() });
        }
        WsMessage::Unknown => {}
    }
}

fn jittered(base: Duration) -> Duration {
    use rand::Rng;
    let jitter_ms = rand::thread_rng().gen_range(0..250);
    base + Duration::from_millis(jitter_ms)
}
