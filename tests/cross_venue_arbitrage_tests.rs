//! S2: cross-venue complementary-leg arbitrage, with a partial fill that
//! forces the executor's unwind path.

mod support;

use std::sync::Arc;
use std::time::Duration;

use edgelord_core::config::risk::RiskConfig;
use edgelord_core::detect;
use edgelord_core::domain::Venue;
use edgelord_core::execution::{ArbitrageExecutor, ArbitrageExecutorConfig};
use edgelord_core::matcher::{HeuristicVerifier, MarketMatcher};
use edgelord_core::testkit::binary_market;
use rust_decimal_macros::dec;

fn matched_pair() -> (edgelord_core::domain::Market, edgelord_core::domain::Market) {
    let mut poly = binary_market(Venue::Polymarket, "poly-1", dec!(0.46), dec!(0.47));
    poly.title = "Will the Fed cut rates in March?".into();
    let mut kalshi = binary_market(Venue::Kalshi, "kalshi-1", dec!(0.46), dec!(0.47));
    kalshi.title = "Will the Fed cut rates in March?".into();
    (poly, kalshi)
}

#[tokio::test]
async fn matched_markets_with_complementary_legs_produce_a_cross_venue_opportunity() {
    let (poly, kalshi) = matched_pair();
    let mut matcher = MarketMatcher::new();
    let candidates = MarketMatcher::candidates(std::slice::from_ref(&poly), std::slice::from_ref(&kalshi));
    let accepted = matcher.verify_and_store(candidates, &HeuristicVerifier).await.unwrap();
    assert_eq!(accepted, 1);

    let pair = matcher.pairs().next().expect("one pair stored");
    let opportunity = detect::detect_cross_venue(pair, &poly, &kalshi, &RiskConfig::default(), dec!(10)).expect("cross-venue arbitrage present");
    assert_eq!(opportunity.legs.len(), 2);
    assert_ne!(opportunity.legs[0].venue, opportunity.legs[1].venue);
}

#[tokio::test]
async fn partial_fill_triggers_unwind_of_the_filled_leg() {
    let (poly, kalshi) = matched_pair();
    let mut matcher = MarketMatcher::new();
    let candidates = MarketMatcher::candidates(std::slice::from_ref(&poly), std::slice::from_ref(&kalshi));
    matcher.verify_and_store(candidates, &HeuristicVerifier).await.unwrap();
    let pair = matcher.pairs().next().expect("one pair stored");
    let opportunity = detect::detect_cross_venue(pair, &poly, &kalshi, &RiskConfig::default(), dec!(10)).expect("cross-venue arbitrage present");

    let sink = Arc::new(support::ScriptedOrderSink::new(1));
    let executor = ArbitrageExecutor::new(sink, ArbitrageExecutorConfig { leg_timeout: Duration::from_millis(500), unwind_timeout: Duration::from_millis(500) });

    let result = executor.execute(&opportunity).await;
    assert!(!result.success);
    assert!(result.unwound);
    assert_eq!(result.filled_legs, 1);
    assert_eq!(result.requested_legs, 2);
}
