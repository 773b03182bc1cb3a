//! spec §4.12: while the kill switch is active, the Trading Engine cancels
//! every open order on every connected venue, not just on graceful shutdown.

mod support;

use std::sync::Arc;

use edgelord_core::config::risk::RiskConfig;
use edgelord_core::config::strategy::StrategiesConfig;
use edgelord_core::config::trading::TradingConfig;
use edgelord_core::domain::{OrderStatus, Venue};
use edgelord_core::engine::TradingEngine;
use edgelord_core::history::PriceHistory;
use edgelord_core::marketdata::{MarketDataConfig, MarketDataService};
use edgelord_core::risk::RiskCore;
use tokio::sync::{mpsc, oneshot};

#[tokio::test(start_paused = true)]
async fn kill_switch_activation_cancels_open_orders_on_every_venue() {
    let risk = Arc::new(RiskCore::new(RiskConfig::default()));
    let (orderbook_tx, _orderbook_rx) = mpsc::unbounded_channel();
    let (price_tx, price_rx) = mpsc::unbounded_channel();
    let (degraded_tx, _degraded_rx) = mpsc::unbounded_channel();
    let market_data = Arc::new(MarketDataService::new(MarketDataConfig::default(), orderbook_tx, price_tx, degraded_tx));
    let history = Arc::new(PriceHistory::new(100));

    let client = Arc::new(support::StubVenueClient::new(Venue::Polymarket, OrderStatus::Filled));
    let clients = support::single_client_map(Venue::Polymarket, client.clone());
    let sink = Arc::new(support::ScriptedOrderSink::new(0));

    let engine = Arc::new(TradingEngine::new(
        market_data,
        history,
        risk.clone(),
        sink,
        clients,
        RiskConfig::default(),
        TradingConfig::default(),
        StrategiesConfig::default(),
    ));

    risk.trigger_manual("operator stop");
    assert!(risk.is_halted());

    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let engine_task = tokio::spawn(engine.run(price_rx, shutdown_rx));

    // The scan ticker's first tick fires immediately; give the inner spawned
    // task a few turns to run `enforce_kill_switch` to completion.
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }

    assert!(client.cancel_all_calls() >= 1, "kill switch activation must trigger a cancel-all, not just graceful shutdown");

    let _ = shutdown_tx.send(());
    let _ = engine_task.await;
}
