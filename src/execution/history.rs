//! Fixed-size execution history ring shared by the arbitrage executor for
//! diagnostics (success/partial counts, average latency, realized profit).

use std::collections::VecDeque;

use parking_lot::Mutex;
use rust_decimal::Decimal;

const CAPACITY: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionOutcome {
    Success,
    Failure,
    PartialUnwound,
}

#[derive(Debug, Clone)]
pub struct ExecutionRecord {
    pub outcome: ExecutionOutcome,
    pub realized_pnl: Decimal,
    pub latency_ms: u64,
}

#[derive(Debug, Clone, Default)]
pub struct ExecutionSummary {
    pub count: usize,
    pub success_count: usize,
    pub partial_count: usize,
    pub failure_count: usize,
    pub avg_latency_ms: f64,
    pub realized_profit: Decimal,
}

#[derive(Default)]
pub struct ExecutionHistory {
    records: Mutex<VecDeque<ExecutionRecord>>,
}

impl ExecutionHistory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, record: ExecutionRecord) {
        let mut records = self.records.lock();
        if records.len() == CAPACITY {
            records.pop_front();
        }
        records.push_back(record);
    }

    #[must_use]
    pub fn summary(&self) -> ExecutionSummary {
        let records = self.records.lock();
        let count = records.len();
        if count == 0 {
            return ExecutionSummary::default();
        }
        let mut summary = ExecutionSummary { count, ..Default::default() };
        let mut latency_total: u64 = 0;
        for record in records.iter() {
            match record.outcome {
                ExecutionOutcome::Success => summary.success_count += 1,
                ExecutionOutcome::PartialUnwound => summary.partial_count += 1,
                ExecutionOutcome::Failure => summary.failure_count += 1,
            }
            latency_total += record.latency_ms;
            summary.realized_profit += record.realized_pnl;
        }
        summary.avg_latency_ms = latency_total as f64 / count as f64;
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn summary_aggregates_counts_and_profit() {
        let history = ExecutionHistory::new();
        history.record(ExecutionRecord { outcome: ExecutionOutcome::Success, realized_pnl: dec!(5), latency_ms: 100 });
        history.record(ExecutionRecord { outcome: ExecutionOutcome::PartialUnwound, realized_pnl: dec!(-2), latency_ms: 300 });
        let summary = history.summary();
        assert_eq!(summary.count, 2);
        assert_eq!(summary.success_count, 1);
        assert_eq!(summary.partial_count, 1);
        assert_eq!(summary.realized_profit, dec!(3));
        assert!((summary.avg_latency_ms - 200.0).abs() < f64::EPSILON);
    }

    #[test]
    fn ring_evicts_oldest_beyond_capacity() {
        let history = ExecutionHistory::new();
        for i in 0..150u64 {
            history.record(ExecutionRecord { outcome: ExecutionOutcome::Success, realized_pnl: Decimal::from(i), latency_ms: 10 });
        }
        assert_eq!(history.summary().count, 100);
    }
}
