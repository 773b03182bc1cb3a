//! Venue connectors (C2/C3): normalized REST clients and WebSocket feeds for
//! the two supported exchanges, plus their request-signing schemes.
//!
//! Everything outside this module talks to a venue only through
//! [`VenueClient`] and [`VenueWebSocket`] — price/size normalization and
//! wire-format quirks never leak past this boundary.

pub mod auth;
pub mod kalshi;
pub mod polymarket;

mod traits;

pub use traits::{
    ConnectionState, MarketDataEvent, MarketFilter, Subscription, SubscriptionCommand,
    VenueClient, VenueWebSocket,
};
