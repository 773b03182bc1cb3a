//! Token-bucket rate limiting (C1).
//!
//! Each named limiter refills continuously based on wall-clock elapsed time
//! (no background timer). Waiters are served in FIFO order via a simple
//! ticket/turn counter; the bucket itself is protected by one
//! [`parking_lot::Mutex`] held only during token accounting — no I/O or
//! sleeping happens while the lock is held.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::error::{Error, Result};

const POLL_INTERVAL: Duration = Duration::from_millis(10);

struct Inner {
    tokens: f64,
    capacity: f64,
    refill_rate: f64,
    last_refill: Instant,
    next_ticket: u64,
    serving: u64,
    generation: u64,
    /// Tickets whose caller gave up before `serving` reached them. Without
    /// this, a non-front timeout would leave a hole no live waiter polls
    /// for, stalling every ticket behind it forever.
    abandoned: HashSet<u64>,
}

impl Inner {
    fn refill(&mut self, now: Instant) {
        let elapsed = now.saturating_duration_since(self.last_refill).as_secs_f64();
        if elapsed > 0.0 {
            self.tokens = (self.tokens + elapsed * self.refill_rate).min(self.capacity);
            self.last_refill = now;
        }
    }

    /// Advance `serving` past any tickets already marked abandoned.
    fn skip_abandoned(&mut self) {
        while self.abandoned.remove(&self.serving) {
            self.serving += 1;
        }
    }
}

/// A single named token bucket.
pub struct RateLimiter {
    name: String,
    inner: Mutex<Inner>,
}

impl RateLimiter {
    #[must_use]
    pub fn new(name: impl Into<String>, capacity: u32, refill_rate_per_sec: f64, allow_burst: bool) -> Self {
        let capacity = f64::from(capacity);
        Self {
            name: name.into(),
            inner: Mutex::new(Inner {
                // When bursting is disallowed, start empty so the first
                // caller pays the same refill cost as steady-state traffic.
                tokens: if allow_burst { capacity } else { 0.0 },
                capacity,
                refill_rate: refill_rate_per_sec,
                last_refill: Instant::now(),
                next_ticket: 0,
                serving: 0,
                generation: 0,
                abandoned: HashSet::new(),
            }),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current token count, capped at `[0, capacity]`. Exposed for metrics
    /// and the invariant tests (`token count of v's bucket in [0, capacity]`).
    #[must_use]
    pub fn available_tokens(&self) -> f64 {
        let mut inner = self.inner.lock();
        inner.refill(Instant::now());
        inner.tokens
    }

    #[must_use]
    pub fn capacity(&self) -> f64 {
        self.inner.lock().capacity
    }

    /// Nonblocking: succeeds only if `n` tokens are immediately available
    /// and no FIFO waiter is already ahead in the queue.
    pub fn try_acquire(&self, n: u32) -> bool {
        let mut inner = self.inner.lock();
        inner.refill(Instant::now());
        inner.skip_abandoned();
        if inner.serving != inner.next_ticket {
            // Someone is already queued; don't let a non-blocking caller
            // cut ahead of them.
            return false;
        }
        let n = f64::from(n);
        if inner.tokens >= n {
            inner.tokens -= n;
            inner.next_ticket += 1;
            inner.serving += 1;
            true
        } else {
            false
        }
    }

    /// Suspend the caller until `n` tokens are available or `timeout`
    /// elapses. Waiters are serviced in FIFO order.
    pub async fn acquire(&self, n: u32, timeout: Duration) -> Result<()> {
        let n = f64::from(n);
        let deadline = Instant::now() + timeout;
        let (ticket, generation) = {
            let mut inner = self.inner.lock();
            let ticket = inner.next_ticket;
            inner.next_ticket += 1;
            (ticket, inner.generation)
        };

        loop {
            {
                let mut inner = self.inner.lock();
                if inner.generation != generation {
                    return Err(Error::RateLimiterReset);
                }
                inner.skip_abandoned();
                if inner.serving == ticket {
                    inner.refill(Instant::now());
                    if inner.tokens >= n {
                        inner.tokens -= n;
                        inner.serving += 1;
                        return Ok(());
                    }
                    if Instant::now() >= deadline {
                        // Release our place in line so later waiters aren't
                        // blocked by a timed-out caller.
                        inner.serving += 1;
                        warn!(limiter = %self.name, "rate limit acquire timed out");
                        return Err(Error::RateLimitTimeout(timeout));
                    }
                } else if Instant::now() >= deadline {
                    // Not our turn yet, but we're giving up anyway — mark
                    // our ticket so `serving` doesn't stall on it once it
                    // gets here; nobody will be polling for it after this.
                    inner.abandoned.insert(ticket);
                    warn!(limiter = %self.name, "rate limit acquire timed out before its turn");
                    return Err(Error::RateLimitTimeout(timeout));
                }
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    /// Drain the wait queue, failing all current and future-until-acquired
    /// waiters of this generation with [`Error::RateLimiterReset`], and
    /// refill the bucket to capacity.
    pub fn reset(&self) {
        let mut inner = self.inner.lock();
        inner.generation += 1;
        inner.serving = inner.next_ticket;
        inner.tokens = inner.capacity;
        inner.abandoned.clear();
        debug!(limiter = %self.name, "rate limiter reset");
    }
}

/// A named collection of per-venue/per-endpoint-class limiters.
#[derive(Default)]
pub struct RateLimiterRegistry {
    limiters: HashMap<String, Arc<RateLimiter>>,
}

impl RateLimiterRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, limiter: RateLimiter) -> Arc<RateLimiter> {
        let handle = Arc::new(limiter);
        self.limiters.insert(handle.name().to_string(), handle.clone());
        handle
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<RateLimiter>> {
        self.limiters.get(name).cloned()
    }

    /// Pre-configured limiters matching the defaults in the design:
    /// Polymarket-like orders `{500, 60/s, burst=on}`, reads `{100, 50/s,
    /// burst=on}`; Kalshi-like fixed-rate tiers (burst disabled).
    #[must_use]
    pub fn with_default_venues() -> Self {
        let mut registry = Self::new();
        registry.register(RateLimiter::new("polymarket.orders", 500, 60.0, true));
        registry.register(RateLimiter::new("polymarket.reads", 100, 50.0, true));
        registry.register(RateLimiter::new("kalshi.orders", 200, 20.0, false));
        registry.register(RateLimiter::new("kalshi.reads", 400, 100.0, false));
        registry
    }
}
