//! Signal Executor (C9): single- and batch-leg order placement with a
//! slippage buffer around the signal's quoted price.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashSet;

use crate::config::trading::TradingConfig;
use crate::domain::{Order, OrderRequest, OrderSide, OrderStatus, OrderType, Price, SignalId, Size, TradingSignal};
use crate::error::{Error, Result};

use super::OrderSink;

#[derive(Debug, Clone)]
pub struct SignalExecutionResult {
    pub success: bool,
    pub order_ids: Vec<crate::domain::OrderId>,
    pub filled_size: Size,
    pub filled_price: Option<Price>,
    pub execution_time_ms: u64,
    pub error: Option<String>,
}

/// Price floor/ceiling applied so a slippage-buffered limit never crosses
/// the `(0,1)` boundary a binary-market price must stay within.
const MIN_PRICE: Decimal = dec!(0.01);
const MAX_PRICE: Decimal = dec!(0.99);

#[must_use]
pub fn limit_price(side: OrderSide, price: Price, max_slippage: Decimal) -> Price {
    match side {
        OrderSide::Buy => (price * (Decimal::ONE + max_slippage)).min(MAX_PRICE),
        OrderSide::Sell => (price * (Decimal::ONE - max_slippage)).max(MIN_PRICE),
    }
}

pub struct SignalExecutor {
    sink: Arc<dyn OrderSink>,
    config: TradingConfig,
    in_flight: Mutex<HashSet<SignalId>>,
}

impl SignalExecutor {
    #[must_use]
    pub fn new(sink: Arc<dyn OrderSink>, config: TradingConfig) -> Self {
        Self { sink, config, in_flight: Mutex::new(HashSet::new()) }
    }

    pub async fn execute(&self, signal: TradingSignal, venue: crate::domain::Venue) -> SignalExecutionResult {
        let started = Instant::now();
        if let Err(error) = self.admit(&signal) {
            return rejected(error, started);
        }

        let result = match &signal.batch {
            Some(legs) if !legs.is_empty() => self.execute_batch(&signal, venue, legs).await,
            _ => self.execute_single(&signal, venue).await,
        };

        self.in_flight.lock().remove(&signal.id);
        match result {
            Ok(result) => SignalExecutionResult { execution_time_ms: elapsed_ms(started), ..result },
            Err(error) => rejected(error, started),
        }
    }

    fn admit(&self, signal: &TradingSignal) -> Result<()> {
        if signal.confidence < self.config.min_confidence {
            return Err(Error::Validation(format!(
                "confidence {} below minimum {}",
                signal.confidence, self.config.min_confidence
            )));
        }
        if Utc::now() > signal.expires_at {
            return Err(Error::SignalExpired);
        }
        let mut in_flight = self.in_flight.lock();
        if !in_flight.insert(signal.id.clone()) {
            return Err(Error::DuplicateExecution(signal.id.to_string()));
        }
        Ok(())
    }

    async fn execute_single(&self, signal: &TradingSignal, venue: crate::domain::Venue) -> Result<SignalExecutionResult> {
        let price = limit_price(signal.side, signal.price, self.config.max_slippage);
        let request = OrderRequest {
            venue,
            market_id: signal.market_id.clone(),
            outcome_id: signal.outcome_id.clone(),
            side: signal.side,
            price,
            size_usd: signal.size,
            order_type: OrderType::Gtc,
            strategy_id: Some(signal.strategy_id.clone()),
        };
        let order = self.sink.place_order(request).await?;
        Ok(from_order(&order))
    }

    async fn execute_batch(&self, signal: &TradingSignal, venue: crate::domain::Venue, legs: &[crate::domain::BatchLeg]) -> Result<SignalExecutionResult> {
        let futures = legs.iter().map(|leg| {
            let price = limit_price(leg.side, leg.price, self.config.max_slippage);
            let request = OrderRequest {
                venue,
                market_id: leg.market_id.clone(),
                outcome_id: leg.outcome_id.clone(),
                side: leg.side,
                price,
                size_usd: leg.size,
                order_type: OrderType::Gtc,
                strategy_id: Some(signal.strategy_id.clone()),
            };
            self.sink.place_order(request)
        });
        let results = futures_util::future::join_all(futures).await;

        let mut order_ids = Vec::with_capacity(results.len());
        let mut filled_size = Size::ZERO;
        let mut weighted_price = Decimal::ZERO;
        for result in &results {
            match result {
                Ok(order) if matches!(order.status, OrderStatus::Filled | OrderStatus::Partial) => {
                    order_ids.push(order.id.clone());
                    filled_size += order.filled_size_usd;
                    weighted_price += order.avg_fill_price.unwrap_or(order.price) * order.filled_size_usd;
                }
                _ => {
                    return Err(Error::Validation("batch leg failed to fill".into()));
                }
            }
        }
        let filled_price = if filled_size.is_zero() { None } else { Some(weighted_price / filled_size) };
        Ok(SignalExecutionResult { success: true, order_ids, filled_size, filled_price, execution_time_ms: 0, error: None })
    }
}

fn from_order(order: &Order) -> SignalExecutionResult {
    let success = matches!(order.status, OrderStatus::Filled | OrderStatus::Partial);
    SignalExecutionResult {
        success,
        order_ids: vec![order.id.clone()],
        filled_size: order.filled_size_usd,
        filled_price: order.avg_fill_price,
        execution_time_ms: 0,
        error: if success { None } else { Some(format!("order {:?} not filled", order.status)) },
    }
}

fn rejected(error: Error, started: Instant) -> SignalExecutionResult {
    SignalExecutionResult {
        success: false,
        order_ids: Vec::new(),
        filled_size: Size::ZERO,
        filled_price: None,
        execution_time_ms: elapsed_ms(started),
        error: Some(error.to_string()),
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MarketId, OutcomeId, OrderId, StrategyId, Venue};
    use async_trait::async_trait;
    use chrono::Duration;

    struct StubSink {
        status: OrderStatus,
    }

    #[async_trait]
    impl OrderSink for StubSink {
        async fn place_order(&self, request: OrderRequest) -> Result<Order> {
            let now = Utc::now();
            Ok(Order {
                id: OrderId::generate(),
                venue: request.venue,
                external_order_id: None,
                market_id: request.market_id,
                outcome_id: request.outcome_id,
                side: request.side,
                price: request.price,
                size_usd: request.size_usd,
                filled_size_usd: if self.status == OrderStatus::Rejected { Decimal::ZERO } else { request.size_usd },
                avg_fill_price: Some(request.price),
                order_type: request.order_type,
                status: self.status,
                strategy_id: request.strategy_id,
                created_at: now,
                updated_at: now,
            })
        }
    }

    fn signal(confidence: Decimal, expires_in_secs: i64) -> TradingSignal {
        let now = Utc::now();
        TradingSignal {
            id: SignalId::generate(),
            strategy_id: StrategyId::new("probability_sum"),
            market_id: MarketId::new("m1"),
            outcome_id: OutcomeId::new("yes"),
            side: OrderSide::Buy,
            price: dec!(0.48),
            size: dec!(100),
            confidence,
            reason: "test".into(),
            created_at: now,
            expires_at: now + Duration::seconds(expires_in_secs),
            batch: None,
        }
    }

    #[test]
    fn limit_price_buy_adds_slippage_capped_at_099() {
        assert_eq!(limit_price(OrderSide::Buy, dec!(0.98), dec!(0.05)), dec!(0.99));
    }

    #[test]
    fn limit_price_sell_subtracts_slippage_floored_at_001() {
        assert_eq!(limit_price(OrderSide::Sell, dec!(0.02), dec!(0.90)), dec!(0.01));
    }

    #[tokio::test]
    async fn rejects_low_confidence_signal() {
        let executor = SignalExecutor::new(Arc::new(StubSink { status: OrderStatus::Filled }), TradingConfig::default());
        let result = executor.execute(signal(dec!(0.1), 30), Venue::Polymarket).await;
        assert!(!result.success);
        assert!(result.error.unwrap().contains("confidence"));
    }

    #[tokio::test]
    async fn rejects_expired_signal() {
        let executor = SignalExecutor::new(Arc::new(StubSink { status: OrderStatus::Filled }), TradingConfig::default());
        let result = executor.execute(signal(dec!(0.9), -5), Venue::Polymarket).await;
        assert!(!result.success);
        assert!(matches!(result.error, Some(ref e) if e.contains("expired")));
    }

    #[tokio::test]
    async fn executes_admitted_signal_successfully() {
        let executor = SignalExecutor::new(Arc::new(StubSink { status: OrderStatus::Filled }), TradingConfig::default());
        let result = executor.execute(signal(dec!(0.9), 30), Venue::Polymarket).await;
        assert!(result.success);
        assert_eq!(result.filled_size, dec!(100));
    }

    #[tokio::test]
    async fn rejected_order_surfaces_failure() {
        let executor = SignalExecutor::new(Arc::new(StubSink { status: OrderStatus::Rejected }), TradingConfig::default());
        let result = executor.execute(signal(dec!(0.9), 30), Venue::Polymarket).await;
        assert!(!result.success);
    }
}
