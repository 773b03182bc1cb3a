//! Wire types for the Polymarket-like REST and WebSocket surfaces.
//!
//! Prices travel the wire as decimal strings in `[0,1]` and sizes as
//! USD-denominated decimal strings — the lightest-touch normalization of
//! the two venues (contrast [`crate::venue::kalshi::dto`]).

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct MarketsResponse {
    pub data: Option<Vec<WireMarket>>,
}

#[derive(Debug, Deserialize)]
pub struct WireMarket {
    pub condition_id: String,
    pub question: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub end_date_iso: Option<DateTime<Utc>>,
    pub tokens: Vec<WireToken>,
    #[serde(default)]
    pub volume_24hr: Option<Decimal>,
    #[serde(default)]
    pub liquidity: Option<Decimal>,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub closed: bool,
}

#[derive(Debug, Deserialize)]
pub struct WireToken {
    pub token_id: String,
    pub outcome: String,
    #[serde(default)]
    pub price: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
pub struct WireOrderBook {
    pub bids: Vec<WireLevel>,
    pub asks: Vec<WireLevel>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireLevel {
    pub price: Decimal,
    pub size: Decimal,
}

#[derive(Debug, Serialize)]
pub struct WireOrderRequest {
    pub token_id: String,
    pub price: Decimal,
    pub size: Decimal,
    pub side: &'static str,
    #[serde(rename = "type")]
    pub order_type: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct WireOrderResponse {
    #[serde(rename = "orderID")]
    pub order_id: String,
    pub status: String,
    #[serde(default)]
    pub making_amount: Option<Decimal>,
    #[serde(default)]
    pub price: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
pub struct WireBalance {
    pub balance: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct WirePosition {
    pub token_id: String,
    pub size: Decimal,
    pub avg_price: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct WireTrade {
    pub id: String,
    pub token_id: String,
    pub side: String,
    pub price: Decimal,
    pub size: Decimal,
    #[serde(default)]
    pub fee: Option<Decimal>,
    pub timestamp: DateTime<Utc>,
}

/// Subscription request sent to the WebSocket feed: `{type, assets_ids, channel}`.
#[derive(Debug, Serialize)]
pub struct SubscribeMessage {
    #[serde(rename = "type")]
    pub msg_type: &'static str,
    pub assets_ids: Vec<String>,
    pub channel: String,
}

impl SubscribeMessage {
    #[must_use]
    pub fn new(asset_ids: Vec<String>, channel: impl Into<String>) -> Self {
        Self { msg_type: "Market", assets_ids: asset_ids, channel: channel.into() }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WsPriceLevel {
    pub price: String,
    pub size: String,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "event_type")]
pub enum WsMessage {
    #[serde(rename = "book")]
    Book(WsBook),
    #[serde(rename = "price_change")]
    PriceChange(WsPriceChange),
    #[serde(rename = "last_trade_price")]
    Trade(WsTrade),
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Deserialize)]
pub struct WsBook {
    pub asset_id: String,
    pub market: Option<String>,
    pub bids: Vec<WsPriceLevel>,
    pub asks: Vec<WsPriceLevel>,
}

#[derive(Debug, Deserialize)]
pub struct WsPriceChange {
    pub asset_id: String,
    pub market: Option<String>,
    pub changes: Vec<WsPriceChangeLevel>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WsPriceChangeLevel {
    pub price: String,
    pub size: String,
    pub side: String,
}

#[derive(Debug, Deserialize)]
pub struct WsTrade {
    pub asset_id: String,
    pub market: Option<String>,
    pub price: String,
    pub size: String,
}
