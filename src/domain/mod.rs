//! Core domain types shared by every subsystem.
//!
//! ## Identifiers
//!
//! - [`MarketId`], [`OutcomeId`], [`OrderId`], [`PositionId`], [`TradeId`],
//!   [`SignalId`], [`OpportunityId`], [`StrategyId`] — newtypes so that
//!   detectors and strategies hold *weak* references (ids only) into the
//!   stores owned by the Market Data Service and the Order Manager.
//!
//! ## Market data
//!
//! - [`Venue`], [`Market`], [`Outcome`], [`MarketStatus`], [`OrderBook`],
//!   [`PriceLevel`], [`PriceUpdate`].
//!
//! ## Trading
//!
//! - [`Order`], [`OrderSide`], [`OrderType`], [`OrderStatus`],
//!   [`OrderRequest`], [`Position`], [`PositionSide`], [`Trade`].
//!
//! ## Signals & opportunities
//!
//! - [`TradingSignal`], [`BatchLeg`], [`ArbitrageOpportunity`],
//!   [`OpportunityKind`], [`OpportunityLeg`].

mod id;
mod market;
mod money;
mod opportunity;
mod order;
mod order_book;
mod position;
mod price_update;
mod signal;
mod trade;
mod venue;

pub use id::{
    MarketId, OpportunityId, OrderId, OutcomeId, PositionId, SignalId, StrategyId, TradeId,
};
pub use market::{Market, MarketStatus, Outcome};
pub use money::{Price, Size};
pub use opportunity::{ArbitrageOpportunity, OpportunityKind, OpportunityLeg};
pub use order::{Order, OrderRequest, OrderSide, OrderStatus, OrderType};
pub use order_book::{OrderBook, PriceLevel};
pub use position::{Position, PositionSide};
pub use price_update::{PriceSource, PriceUpdate};
pub use signal::{BatchLeg, TradingSignal};
pub use trade::Trade;
pub use venue::Venue;
