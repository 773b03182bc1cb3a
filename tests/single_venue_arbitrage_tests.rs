//! S1: single-venue probability-sum arbitrage, detected then fully filled
//! through the Order Manager.

mod support;

use std::sync::Arc;

use edgelord_core::config::risk::RiskConfig;
use edgelord_core::detect;
use edgelord_core::domain::{OrderStatus, OrderRequest, OrderType, Venue};
use edgelord_core::execution::OrderSink;
use edgelord_core::order_manager::OrderManager;
use edgelord_core::ratelimit::RateLimiterRegistry;
use edgelord_core::risk::RiskCore;
use edgelord_core::testkit::binary_market;
use rust_decimal_macros::dec;

#[test]
fn sum_of_asks_below_one_is_detected_as_arbitrage() {
    let market = binary_market(Venue::Polymarket, "m1", dec!(0.47), dec!(0.48));
    let risk = RiskConfig::default();
    let opportunity = detect::detect_single_venue(&market, &risk, dec!(10)).expect("should detect arbitrage");
    assert_eq!(opportunity.legs.len(), 2);
    assert!(opportunity.net_spread > dec!(0));
}

#[test]
fn sum_of_asks_at_or_above_one_is_not_arbitrage() {
    let market = binary_market(Venue::Polymarket, "m1", dec!(0.51), dec!(0.51));
    let risk = RiskConfig::default();
    assert!(detect::detect_single_venue(&market, &risk, dec!(10)).is_none());
}

#[tokio::test]
async fn detected_opportunity_fills_fully_through_order_manager() {
    let market = binary_market(Venue::Polymarket, "m1", dec!(0.47), dec!(0.48));
    let opportunity = detect::detect_single_venue(&market, &RiskConfig::default(), dec!(10)).expect("arbitrage present");

    let client = Arc::new(support::StubVenueClient::new(Venue::Polymarket, OrderStatus::Filled));
    let clients = support::single_client_map(Venue::Polymarket, client.clone());
    let risk = Arc::new(RiskCore::new(RiskConfig::default()));
    let manager = OrderManager::new(risk, Arc::new(RateLimiterRegistry::with_default_venues()), clients);

    for leg in &opportunity.legs {
        let order = manager
            .place_order(OrderRequest {
                venue: leg.venue,
                market_id: leg.market_id.clone(),
                outcome_id: leg.outcome_id.clone(),
                side: leg.side,
                price: leg.price,
                size_usd: dec!(50),
                order_type: OrderType::Fok,
                strategy_id: None,
            })
            .await
            .unwrap();
        assert_eq!(order.status, OrderStatus::Filled);
    }

    assert_eq!(client.placed_orders().len(), 2);
    assert_eq!(manager.get_positions(None).len(), 2);
    assert_eq!(manager.get_trades().len(), 2);
}
