//! S6: a burst of order placements beyond a venue's token bucket capacity
//! queues instead of failing outright, and every queued waiter is
//! eventually satisfied once the bucket refills.

use std::sync::Arc;
use std::time::Duration;

use edgelord_core::error::Error;
use edgelord_core::ratelimit::RateLimiter;

#[test]
fn burst_beyond_capacity_is_rejected_by_try_acquire() {
    let limiter = RateLimiter::new("polymarket.orders", 2, 1.0, true);
    assert!(limiter.try_acquire(1));
    assert!(limiter.try_acquire(1));
    assert!(!limiter.try_acquire(1), "third immediate call should exhaust the bucket");
}

#[tokio::test(start_paused = true)]
async fn burst_of_queued_acquires_all_complete_once_the_bucket_refills() {
    let limiter = Arc::new(RateLimiter::new("kalshi.orders", 2, 1.0, true));
    assert!(limiter.try_acquire(1));
    assert!(limiter.try_acquire(1));

    let mut handles = Vec::new();
    for _ in 0..4 {
        let limiter = limiter.clone();
        handles.push(tokio::spawn(async move { limiter.acquire(1, Duration::from_secs(30)).await }));
    }

    tokio::time::advance(Duration::from_millis(10)).await;
    tokio::time::advance(Duration::from_secs(10)).await;

    for handle in handles {
        assert!(handle.await.unwrap().is_ok());
    }
}

#[tokio::test(start_paused = true)]
async fn acquire_past_deadline_times_out_without_starving_later_waiters() {
    let limiter = Arc::new(RateLimiter::new("polymarket.reads", 1, 0.001, false));

    let first = limiter.acquire(1, Duration::from_millis(50));
    let result = first.await;
    assert!(matches!(result, Err(Error::RateLimitTimeout(_))));

    assert!(limiter.try_acquire(0), "bucket must still be usable for a fresh caller after a timeout");
}

#[tokio::test(start_paused = true)]
async fn a_waiter_that_times_out_before_its_turn_does_not_stall_the_queue_behind_it() {
    let limiter = Arc::new(RateLimiter::new("kalshi.reads", 1, 1.0, true));
    assert!(limiter.try_acquire(1));

    let front = {
        let limiter = limiter.clone();
        tokio::spawn(async move { limiter.acquire(1, Duration::from_secs(30)).await })
    };
    let gives_up_early = {
        let limiter = limiter.clone();
        tokio::spawn(async move { limiter.acquire(1, Duration::from_millis(20)).await })
    };
    let later = {
        let limiter = limiter.clone();
        tokio::spawn(async move { limiter.acquire(1, Duration::from_secs(30)).await })
    };

    tokio::time::advance(Duration::from_millis(30)).await;
    assert!(matches!(gives_up_early.await.unwrap(), Err(Error::RateLimitTimeout(_))));

    tokio::time::advance(Duration::from_secs(2)).await;
    assert!(front.await.unwrap().is_ok(), "front waiter must still be served once the bucket refills");

    tokio::time::advance(Duration::from_secs(2)).await;
    assert!(later.await.unwrap().is_ok(), "waiter behind the abandoned ticket must not wait forever");
}
