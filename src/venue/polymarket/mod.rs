//! Polymarket-like venue connector.

mod client;
mod dto;
mod websocket;

pub use client::{book_subscription, PolymarketClient};
pub use websocket::PolymarketWebSocket;
