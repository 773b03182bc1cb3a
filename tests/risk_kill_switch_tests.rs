//! S5: a daily loss beyond the configured limit fires the kill switch and
//! every subsequent order placement is rejected without reaching a venue.

mod support;

use std::sync::Arc;

use edgelord_core::config::risk::RiskConfig;
use edgelord_core::domain::{MarketId, OrderRequest, OrderSide, OrderStatus, OrderType, OutcomeId, Venue};
use edgelord_core::error::Error;
use edgelord_core::execution::OrderSink;
use edgelord_core::order_manager::OrderManager;
use edgelord_core::ratelimit::RateLimiterRegistry;
use edgelord_core::risk::RiskCore;
use rust_decimal_macros::dec;

fn request() -> OrderRequest {
    OrderRequest {
        venue: Venue::Polymarket,
        market_id: MarketId::new("m1"),
        outcome_id: OutcomeId::new("yes"),
        side: OrderSide::Buy,
        price: dec!(0.48),
        size_usd: dec!(100),
        order_type: OrderType::Gtc,
        strategy_id: None,
    }
}

#[tokio::test]
async fn daily_loss_breach_halts_all_further_order_placement() {
    let risk = Arc::new(RiskCore::new(RiskConfig { max_daily_loss: dec!(100), ..RiskConfig::default() }));
    let client = Arc::new(support::StubVenueClient::new(Venue::Polymarket, OrderStatus::Filled));
    let clients = support::single_client_map(Venue::Polymarket, client.clone());
    let manager = OrderManager::new(risk.clone(), Arc::new(RateLimiterRegistry::with_default_venues()), clients);

    manager.place_order(request()).await.unwrap();
    assert_eq!(client.placed_orders().len(), 1);

    risk.record_realized_pnl(dec!(-150));
    risk.check();
    assert!(risk.is_halted());

    let result = manager.place_order(request()).await;
    assert!(matches!(result, Err(Error::KillSwitchActive(_))));
    assert_eq!(client.placed_orders().len(), 1, "halted order must never reach the venue client");
}
