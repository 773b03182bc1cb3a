//! Wire types for the Kalshi-like REST and WebSocket surfaces.
//!
//! Prices travel the wire as integer cents `[0,100]`; sizes are integer
//! contract counts. Both are normalized to decimal `[0,1]` / USD at the
//! client boundary (see [`super::client::cents_to_price`] and
//! [`super::client::contracts_to_usd`]) — nothing past this module ever
//! sees a cent value or a bare contract count.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct MarketsResponse {
    pub markets: Vec<WireMarket>,
}

#[derive(Debug, Deserialize)]
pub struct WireMarket {
    pub ticker: String,
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub category: Option<String>,
    pub close_time: Option<DateTime<Utc>>,
    pub yes_bid: Option<i64>,
    pub yes_ask: Option<i64>,
    pub no_bid: Option<i64>,
    pub no_ask: Option<i64>,
    pub volume_24h: Option<i64>,
    pub liquidity: Option<i64>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MarketResponse {
    pub market: WireMarket,
}

#[derive(Debug, Deserialize)]
pub struct WireOrderBook {
    pub orderbook: WireOrderBookLevels,
}

#[derive(Debug, Deserialize)]
pub struct WireOrderBookLevels {
    /// `[price_cents, size_contracts]` pairs for the YES side.
    #[serde(default)]
    pub yes: Vec<(i64, i64)>,
    /// `[price_cents, size_contracts]` pairs for the NO side.
    #[serde(default)]
    pub no: Vec<(i64, i64)>,
}

#[derive(Debug, Serialize)]
pub struct WireOrderRequest {
    pub ticker: String,
    pub side: &'static str,
    pub action: &'static str,
    pub count: i64,
    pub yes_price: Option<i64>,
    pub no_price: Option<i64>,
    #[serde(rename = "type")]
    pub order_type: &'static str,
    pub time_in_force: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct WireOrderResponse {
    pub order: WireOrder,
}

#[derive(Debug, Deserialize)]
pub struct WireOrder {
    pub order_id: String,
    pub status: String,
    #[serde(default)]
    pub filled_count: i64,
    pub yes_price: Option<i64>,
    pub no_price: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct WireBalance {
    /// Cents of USD.
    pub balance: i64,
}

#[derive(Debug, Deserialize)]
pub struct WirePositionsResponse {
    pub market_positions: Vec<WirePosition>,
}

#[derive(Debug, Deserialize)]
pub struct WirePosition {
    pub ticker: String,
    pub position: i64,
    pub market_exposure: i64,
}

#[derive(Debug, Deserialize)]
pub struct WireFillsResponse {
    pub fills: Vec<WireFill>,
}

#[derive(Debug, Deserialize)]
pub struct WireFill {
    pub trade_id: String,
    pub order_id: String,
    pub ticker: String,
    pub side: String,
    pub action: String,
    pub count: i64,
    pub yes_price: i64,
    pub no_price: i64,
    pub created_time: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct SubscribeCommand {
    pub cmd: &'static str,
    pub channels: Vec<String>,
    pub market_tickers: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct AuthFrame {
    pub cmd: &'static str,
    #[serde(rename = "KALSHI-ACCESS-KEY")]
    pub access_key: String,
    #[serde(rename = "KALSHI-ACCESS-TIMESTAMP")]
    pub timestamp: String,
    #[serde(rename = "KALSHI-ACCESS-SIGNATURE")]
    pub signature: String,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
pub enum WsMessage {
    #[serde(rename = "subscribed")]
    Subscribed,
    #[serde(rename = "orderbook_snapshot")]
    OrderbookSnapshot(WsOrderbookSnapshot),
    #[serde(rename = "orderbook_delta")]
    OrderbookDelta(WsOrderbookDelta),
    #[serde(rename = "trade")]
    Trade(WsTrade),
    #[serde(rename = "fill")]
    Fill(WsFill),
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Deserialize)]
pub struct WsOrderbookSnapshot {
    pub market_ticker: String,
    pub seq: u64,
    #[serde(default)]
    pub yes: Vec<(i64, i64)>,
    #[serde(default)]
    pub no: Vec<(i64, i64)>,
}

#[derive(Debug, Deserialize)]
pub struct WsOrderbookDelta {
    pub market_ticker: String,
    pub seq: u64,
    pub price: i64,
    pub delta: i64,
    pub side: String,
}

#[derive(Debug, Deserialize)]
pub struct WsTrade {
    pub market_ticker: String,
    pub yes_price: i64,
    pub count: i64,
}

#[derive(Debug, Deserialize)]
pub struct WsFill {
    pub order_id: String,
}
