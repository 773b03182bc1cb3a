//! Kalshi-like venue connector.

mod client;
mod dto;
mod websocket;

pub use client::{cents_to_price, contracts_to_usd, price_to_cents, usd_to_contracts, KalshiClient};
pub use websocket::KalshiWebSocket;
