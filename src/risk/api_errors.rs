//! Rolling API error-rate tracker feeding the kill switch's `ApiErrorRate`
//! trigger.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rust_decimal::Decimal;

struct Call {
    at: DateTime<Utc>,
    failed: bool,
}

#[derive(Default)]
pub struct ApiErrorTracker {
    calls: Mutex<VecDeque<Call>>,
}

impl ApiErrorTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, failed: bool, now: DateTime<Utc>) {
        self.calls.lock().push_back(Call { at: now, failed });
    }

    /// Error rate over the trailing `window`, pruning calls older than the
    /// window as a side effect. Zero calls in the window is a rate of 0.
    pub fn error_rate(&self, window: chrono::Duration, now: DateTime<Utc>) -> Decimal {
        let cutoff = now - window;
        let mut calls = self.calls.lock();
        while calls.front().is_some_and(|c| c.at < cutoff) {
            calls.pop_front();
        }
        if calls.is_empty() {
            return Decimal::ZERO;
        }
        let failed = calls.iter().filter(|c| c.failed).count();
        Decimal::from(failed) / Decimal::from(calls.len())
    }
}
