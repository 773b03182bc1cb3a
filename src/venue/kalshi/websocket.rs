//! Kalshi-like WebSocket feed: signed connect, subscribe, sequence-gap
//! detection forcing a fresh snapshot, reconnect with backoff.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, info, warn};

use super::client::cents_to_price;
use super::dto::{AuthFrame, SubscribeCommand, WsMessage};
use crate::domain::{MarketId, OrderBook, OutcomeId, PriceLevel, Venue};
use crate::error::Result;
use crate::venue::auth::RsaPssSigner;
use crate::venue::{ConnectionState, MarketDataEvent, Subscription, SubscriptionCommand, VenueWebSocket};

const MAX_BACKOFF: Duration = Duration::from_secs(30);
const INITIAL_BACKOFF: Duration = Duration::from_millis(500);
const AUTH_TIMEOUT: Duration = Duration::from_secs(5);

pub struct KalshiWebSocket {
    url: String,
    signer: RsaPssSigner,
    state: Mutex<ConnectionState>,
}

impl KalshiWebSocket {
    #[must_use]
    pub fn new(url: impl Into<String>, signer: RsaPssSigner) -> Self {
        Self { url: url.into(), signer, state: Mutex::new(ConnectionState::Disconnected) }
    }

    fn set_state(&self, state: ConnectionState) {
        *self.state.lock() = state;
    }
}

#[async_trait]
impl VenueWebSocket for KalshiWebSocket {
    fn venue(&self) -> Venue {
        Venue::Kalshi
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
        // Last seen sequence number per market ticker, for gap detection.
        let mut last_seq: HashMap<String, u64> = HashMap::new();
        let mut backoff = INITIAL_BACKOFF;

        loop {
            self.set_state(ConnectionState::Connecting);
            let mut ws = match connect_async(&self.url).await {
                Ok((ws, _)) => ws,
                Err(err) => {
                    warn!(error = %err, "kalshi websocket connect failed");
                    let _ = events.send(MarketDataEvent::FeedDegraded { reason: err.to_string() });
                    tokio::time::sleep(jittered(backoff)).await;
                    backoff = (backoff * 2).min(MAX_BACKOFF);
                    continue;
                }
            };

            self.set_state(ConnectionState::Authenticating);
            let timestamp_ms = Utc::now().timestamp_millis();
            let auth_result = self
                .signer
                .sign(timestamp_ms, "GET", "/trade-api/v2/ws")
                .and_then(|headers| {
                    serde_json::to_string(&AuthFrame {
                        cmd: "auth",
                        access_key: headers.access_key,
                        timestamp: headers.timestamp_ms,
                        signature: headers.signature,
                    })
                    .map_err(Into::into)
                });

            let auth_frame = match auth_result {
                Ok(frame) => frame,
                Err(err) => {
                    warn!(error = %err, "failed to build kalshi auth frame");
                    tokio::time::sleep(jittered(backoff)).await;
                    backoff = (backoff * 2).min(MAX_BACKOFF);
                    continue;
                }
            };
            if ws.send(Message::Text(auth_frame)).await.is_err() {
                tokio::time::sleep(jittered(backoff)).await;
                backoff = (backoff * 2).min(MAX_BACKOFF);
                continue;
            }

            match tokio::time::timeout(AUTH_TIMEOUT, ws.next()).await {
                Ok(Some(Ok(_))) => {}
                _ => {
                    warn!("kalshi websocket auth ack not received within timeout");
                    let _ = events.send(MarketDataEvent::FeedDegraded { reason: "auth timeout".into() });
                    tokio::time::sleep(jittered(backoff)).await;
                    backoff = (backoff * 2).min(MAX_BACKOFF);
                    continue;
                }
            }

            backoff = INITIAL_BACKOFF;
            self.set_state(ConnectionState::Connected);
            info!("kalshi websocket connected and authenticated");

            if !tracked.is_empty() {
                send_subscribe(&mut ws, &tracked).await;
            }
            self.set_state(ConnectionState::Subscribed);

            let disconnect_reason = loop {
                tokio::select! {
                    command = commands.recv() => {
                        match command {
                            Some(SubscriptionCommand::Subscribe(sub)) => {
                                let set: HashSet<Subscription> = [sub.clone()].into_iter().collect();
                                send_subscribe(&mut ws, &set).await;
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
                                    Ok(parsed) => handle_message(parsed, &mut last_seq, &events),
                                    Err(err) => debug!(error = %err, "unparseable kalshi frame"),
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
            warn!(reason = %disconnect_reason, "kalshi websocket disconnected, reconnecting");
            let _ = events.send(MarketDataEvent::FeedDegraded { reason: disconnect_reason });
            tokio::time::sleep(jittered(backoff)).await;
            backoff = (backoff * 2).min(MAX_BACKOFF);
        }
    }
}

async fn send_subscribe(
    ws: &mut tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>,
    subs: &HashSet<Subscription>,
) {
    let channels: Vec<String> = subs.iter().map(|s| s.channel.clone()).collect();
    let tickers: Vec<String> = subs.iter().flat_map(|s| s.identifiers.clone()).collect();
    let command = SubscribeCommand { cmd: "subscribe", channels, market_tickers: tickers };
    if let Ok(json) = serde_json::to_string(&command) {
        let _ = ws.send(Message::Text(json)).await;
    }
}

fn handle_message(
    message: WsMessage,
    last_seq: &mut HashMap<String, u64>,
    events: &mpsc::UnboundedSender<MarketDataEvent>,
) {
    match message {
        WsMessage::Subscribed | WsMessage::Unknown => {}
        WsMessage::OrderbookSnapshot(snapshot) => {
            last_seq.insert(snapshot.market_ticker.clone(), snapshot.seq);
            let market_id = MarketId::new(snapshot.market_ticker.clone());
            let outcome_id = OutcomeId::new(format!("{}-yes", snapshot.market_ticker));
            let mut book = OrderBook {
                market_id: market_id.clone(),
                outcome_id: outcome_id.clone(),
                bids: snapshot
                    .yes
                    .iter()
                    .map(|&(p, s)| PriceLevel { price: cents_to_price(p), size: Decimal::from(s) })
                    .collect(),
                asks: snapshot
                    .no
                    .iter()
                    .map(|&(p, s)| PriceLevel { price: cents_to_price(100 - p), size: Decimal::from(s) })
                    .collect(),
                timestamp: Utc::now(),
            };
            book.normalize();
            let _ = events.send(MarketDataEvent::OrderBookSnapshot { market_id, outcome_id, book });
        }
        WsMessage::OrderbookDelta(delta) => {
            let expected = last_seq.get(&delta.market_ticker).copied().unwrap_or(0) + 1;
            if delta.seq != expected && last_seq.contains_key(&delta.market_ticker) {
                warn!(
                    ticker = %delta.market_ticker,
                    expected,
                    got = delta.seq,
                    "kalshi sequence gap detected, requesting fresh snapshot"
                );
                let _ = events.send(MarketDataEvent::FeedDegraded {
                    reason: format!("sequence gap on {}", delta.market_ticker),
                });
                last_seq.remove(&delta.market_ticker);
                return;
            }
            last_seq.insert(delta.market_ticker.clone(), delta.seq);

            let market_id = MarketId::new(delta.market_ticker.clone());
            let outcome_id = OutcomeId::new(format!("{}-yes", delta.market_ticker));
            let price = cents_to_price(delta.price);
            let size = Decimal::from(delta.delta.abs());
            let mut book = OrderBook {
                market_id: market_id.clone(),
                outcome_id: outcome_id.clone(),
                bids: vec![],
                asks: vec![],
                timestamp: Utc::now(),
            };
            if delta.side.eq_ignore_ascii_case("yes") {
                book.bids.push(PriceLevel { price, size });
            } else {
                book.asks.push(PriceLevel { price: Decimal::ONE - price, size });
            }
            book.normalize();
            let _ = events.send(MarketDataEvent::OrderBookDelta { market_id, outcome_id, book, seq: delta.seq });
        }
        WsMessage::Trade(trade) => {
            let market_id = MarketId::new(trade.market_ticker.clone());
            let outcome_id = OutcomeId::new(format!("{}-yes", trade.market_ticker));
            let _ = events.send(MarketDataEvent::Trade {
                market_id,
                outcome_id,
                price: cents_to_price(trade.yes_price),
                size: Decimal::from(trade.count),
                at: Utc::now(),
            });
        }
        WsMessage::Fill(_) => {
            // Fill/order_update frames are forwarded via the REST poll path in this
            // connector; a dedicated order-update event is wired once the Order
            // Manager resolves venue external ids.
        }
    }
}

fn jittered(base: Duration) -> Duration {
    use rand::Rng;
    let jitter_ms = rand::thread_rng().gen_range(0..250);
    base + Duration::from_millis(jitter_ms)
}
