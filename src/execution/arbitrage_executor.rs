//! Arbitrage Executor (C10): the critical execution path. Submits every leg
//! of an [`ArbitrageOpportunity`] in parallel as FOK, unwinding on partial
//! fill.

use std::sync::Arc;
use std::time::{Duration, Instant};

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tokio::sync::Mutex as AsyncMutex;

use crate::domain::{ArbitrageOpportunity, Order, OrderRequest, OrderSide, OrderStatus, OrderType, OpportunityLeg, Price};
use crate::error::{Error, Result};

use super::history::{ExecutionHistory, ExecutionOutcome, ExecutionRecord};
use super::OrderSink;

#[derive(Debug, Clone)]
pub struct ArbitrageExecutorConfig {
    pub leg_timeout: Duration,
    pub unwind_timeout: Duration,
}

impl Default for ArbitrageExecutorConfig {
    fn default() -> Self {
        Self { leg_timeout: Duration::from_millis(5_000), unwind_timeout: Duration::from_millis(10_000) }
    }
}

#[derive(Debug, Clone)]
pub struct ArbitrageExecutionResult {
    pub success: bool,
    pub filled_legs: usize,
    pub requested_legs: usize,
    pub realized_pnl: Price,
    pub unwound: bool,
    pub execution_time_ms: u64,
    pub error: Option<String>,
}

const FILL_PRICE_BUY: Decimal = dec!(0.99);
const FILL_PRICE_SELL: Decimal = dec!(0.01);

/// Enforces the single-execution-in-flight rule: concurrent `execute` calls
/// while one is already running are rejected with no side effects.
pub struct ArbitrageExecutor {
    sink: Arc<dyn OrderSink>,
    config: ArbitrageExecutorConfig,
    lock: AsyncMutex<()>,
    history: ExecutionHistory,
}

impl ArbitrageExecutor {
    #[must_use]
    pub fn new(sink: Arc<dyn OrderSink>, config: ArbitrageExecutorConfig) -> Self {
        Self { sink, config, lock: AsyncMutex::new(()), history: ExecutionHistory::new() }
    }

    #[must_use]
    pub fn history(&self) -> &ExecutionHistory {
        &self.history
    }

    pub async fn execute(&self, opportunity: &ArbitrageOpportunity) -> ArbitrageExecutionResult {
        let Ok(_guard) = self.lock.try_lock() else {
            return ArbitrageExecutionResult {
                success: false,
                filled_legs: 0,
                requested_legs: opportunity.legs.len(),
                realized_pnl: Decimal::ZERO,
                unwound: false,
                execution_time_ms: 0,
                error: Some(Error::ExecutionInProgress.to_string()),
            };
        };

        let started = Instant::now();
        let filled = self.submit_legs(&opportunity.legs, OrderType::Fok, self.config.leg_timeout).await;
        let filled_count = filled.iter().filter(|leg| leg.is_some()).count();
        let requested = opportunity.legs.len();

        let result = if filled_count == requested {
            let realized_pnl = opportunity.net_spread * opportunity.max_size;
            self.history.record(ExecutionRecord { outcome: ExecutionOutcome::Success, realized_pnl, latency_ms: elapsed_ms(started) });
            ArbitrageExecutionResult {
                success: true,
                filled_legs: filled_count,
                requested_legs: requested,
                realized_pnl,
                unwound: false,
                execution_time_ms: elapsed_ms(started),
                error: None,
            }
        } else if filled_count == 0 {
            self.history.record(ExecutionRecord { outcome: ExecutionOutcome::Failure, realized_pnl: Decimal::ZERO, latency_ms: elapsed_ms(started) });
            ArbitrageExecutionResult {
                success: false,
                filled_legs: 0,
                requested_legs: requested,
                realized_pnl: Decimal::ZERO,
                unwound: false,
                execution_time_ms: elapsed_ms(started),
                error: Some(Error::PartialFill { filled: 0, requested }.to_string()),
            }
        } else {
            let realized_pnl = self.unwind(&opportunity.legs, &filled).await;
            self.history.record(ExecutionRecord { outcome: ExecutionOutcome::PartialUnwound, realized_pnl, latency_ms: elapsed_ms(started) });
            ArbitrageExecutionResult {
                success: false,
                filled_legs: filled_count,
                requested_legs: requested,
                realized_pnl,
                unwound: true,
                execution_time_ms: elapsed_ms(started),
                error: Some(Error::PartialFill { filled: filled_count, requested }.to_string()),
            }
        };
        result
    }

    async fn submit_legs(&self, legs: &[OpportunityLeg], order_type: OrderType, timeout: Duration) -> Vec<Option<Order>> {
        let futures = legs.iter().map(|leg| self.submit_one(leg, leg.side, leg.price, leg.size, order_type, timeout));
        futures_util::future::join_all(futures).await
    }

    async fn submit_one(&self, leg: &OpportunityLeg, side: OrderSide, price: Price, size: Price, order_type: OrderType, timeout: Duration) -> Option<Order> {
        let request = OrderRequest {
            venue: leg.venue,
            market_id: leg.market_id.clone(),
            outcome_id: leg.outcome_id.clone(),
            side,
            price,
            size_usd: size,
            order_type,
            strategy_id: None,
        };
        match tokio::time::timeout(timeout, self.sink.place_order(request)).await {
            Ok(Ok(order)) if matches!(order.status, OrderStatus::Filled | OrderStatus::Partial) => Some(order),
            _ => None,
        }
    }

    /// For each filled leg, submits the opposite-side leg sized to the
    /// filled quantity, priced for near-certain fill, as `GTC`.
    async fn unwind(&self, legs: &[OpportunityLeg], filled: &[Option<Order>]) -> Price {
        let unwind_futures = legs.iter().zip(filled.iter()).filter_map(|(leg, order)| {
            let order = order.as_ref()?;
            let exit_side = leg.side.opposite();
            let exit_price = match exit_side {
                OrderSide::Buy => FILL_PRICE_BUY,
                OrderSide::Sell => FILL_PRICE_SELL,
            };
            Some(async move {
                let filled_qty = order.filled_size_usd;
                let entry_price = order.avg_fill_price.unwrap_or(order.price);
                let exit_order = self
                    .submit_one(leg, exit_side, exit_price, filled_qty, OrderType::Gtc, self.config.unwind_timeout)
                    .await;
                leg_unwind_pnl(leg.side, entry_price, exit_price, filled_qty, exit_order.is_some())
            })
        });
        futures_util::future::join_all(unwind_futures).await.into_iter().sum()
    }
}

/// `entry - exit` for longs (a filled BUY unwound by a SELL), inverted for
/// shorts; zero if the unwind leg itself failed to fill (rare — the unwind
/// price is set for near-certain fill).
fn leg_unwind_pnl(entry_side: OrderSide, entry_price: Price, exit_price: Price, filled_qty: Price, exit_filled: bool) -> Price {
    if !exit_filled {
        return Decimal::ZERO;
    }
    match entry_side {
        OrderSide::Buy => (exit_price - entry_price) * filled_qty,
        OrderSide::Sell => (entry_price - exit_price) * filled_qty,
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MarketId, OpportunityId, OpportunityKind, OrderId, OutcomeId, Venue};
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct ScriptedSink {
        fail_after: usize,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl OrderSink for ScriptedSink {
        async fn place_order(&self, request: OrderRequest) -> Result<Order> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            let now = Utc::now();
            let status = if call < self.fail_after { OrderStatus::Filled } else { OrderStatus::Rejected };
            Ok(Order {
                id: OrderId::generate(),
                venue: request.venue,
                external_order_id: None,
                market_id: request.market_id,
                outcome_id: request.outcome_id,
                side: request.side,
                price: request.price,
                size_usd: request.size_usd,
                filled_size_usd: if status == OrderStatus::Filled { request.size_usd } else { Decimal::ZERO },
                avg_fill_price: Some(request.price),
                order_type: request.order_type,
                status,
                strategy_id: None,
                created_at: now,
                updated_at: now,
            })
        }
    }

    fn opportunity() -> ArbitrageOpportunity {
        let now = Utc::now();
        ArbitrageOpportunity {
            id: OpportunityId::generate(),
            kind: OpportunityKind::SinglePlatform,
            legs: vec![
                OpportunityLeg { venue: Venue::Polymarket, market_id: MarketId::new("m1"), outcome_id: OutcomeId::new("yes"), side: OrderSide::Buy, price: dec!(0.48), size: dec!(100), max_size: dec!(100) },
                OpportunityLeg { venue: Venue::Polymarket, market_id: MarketId::new("m1"), outcome_id: OutcomeId::new("no"), side: OrderSide::Buy, price: dec!(0.49), size: dec!(100), max_size: dec!(100) },
            ],
            gross_spread: dec!(0.03),
            net_spread: dec!(0.03),
            spread_bps: dec!(300),
            max_size: dec!(100),
            max_profit: dec!(3),
            confidence: dec!(0.9),
            detected_at: now,
            expires_at: now + chrono::Duration::seconds(30),
            is_valid: true,
        }
    }

    #[tokio::test]
    async fn all_legs_filled_is_a_success() {
        let executor = ArbitrageExecutor::new(Arc::new(ScriptedSink { fail_after: 99, calls: AtomicUsize::new(0) }), ArbitrageExecutorConfig::default());
        let result = executor.execute(&opportunity()).await;
        assert!(result.success);
        assert_eq!(result.filled_legs, 2);
        assert_eq!(result.realized_pnl, dec!(3));
    }

    #[tokio::test]
    async fn all_legs_failed_is_a_clean_failure() {
        let executor = ArbitrageExecutor::new(Arc::new(ScriptedSink { fail_after: 0, calls: AtomicUsize::new(0) }), ArbitrageExecutorConfig::default());
        let result = executor.execute(&opportunity()).await;
        assert!(!result.success);
        assert!(!result.unwound);
        assert_eq!(result.filled_legs, 0);
    }

    #[tokio::test]
    async fn partial_fill_triggers_unwind() {
        let executor = ArbitrageExecutor::new(Arc::new(ScriptedSink { fail_after: 1, calls: AtomicUsize::new(0) }), ArbitrageExecutorConfig::default());
        let result = executor.execute(&opportunity()).await;
        assert!(!result.success);
        assert!(result.unwound);
        assert_eq!(result.filled_legs, 1);
    }

    #[tokio::test]
    async fn concurrent_execution_is_rejected_without_side_effects() {
        let executor = Arc::new(ArbitrageExecutor::new(Arc::new(ScriptedSink { fail_after: 99, calls: AtomicUsize::new(0) }), ArbitrageExecutorConfig::default()));
        let guard = executor.lock.try_lock().unwrap();
        let result = executor.execute(&opportunity()).await;
        assert!(!result.success);
        assert!(result.error.unwrap().contains("in progress"));
        drop(guard);
    }
}
