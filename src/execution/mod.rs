//! Execution (C9/C10): turns a [`TradingSignal`](crate::domain::TradingSignal)
//! or [`ArbitrageOpportunity`](crate::domain::ArbitrageOpportunity) into
//! orders. Neither executor writes to the order/position store directly —
//! both submit through an [`OrderSink`], the Order Manager's (C11) sole
//! external write path, so kill-switch and limit checks always run first.

pub mod arbitrage_executor;
pub mod history;
pub mod signal_executor;

use async_trait::async_trait;

use crate::domain::{Order, OrderRequest};
use crate::error::Result;

/// The Order Manager's write surface, as seen by the executors. Kept as a
/// trait so C9/C10 can be tested against a stub without C11's kill-switch
/// and limit plumbing.
#[async_trait]
pub trait OrderSink: Send + Sync {
    async fn place_order(&self, request: OrderRequest) -> Result<Order>;
}

pub use arbitrage_executor::{ArbitrageExecutionResult, ArbitrageExecutor, ArbitrageExecutorConfig};
pub use history::ExecutionHistory;
pub use signal_executor::{SignalExecutionResult, SignalExecutor};
