use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use edgelord_core::config::Config;
use edgelord_core::domain::Venue;
use edgelord_core::engine::TradingEngine;
use edgelord_core::marketdata::{run_rest_poller, MarketDataConfig, MarketDataService};
use edgelord_core::order_manager::paper::PaperVenueClient;
use edgelord_core::order_manager::OrderManager;
use edgelord_core::ratelimit::RateLimiterRegistry;
use edgelord_core::risk::RiskCore;
use edgelord_core::venue::auth::{HmacSigner, RsaPssSigner};
use edgelord_core::venue::kalshi::{KalshiClient, KalshiWebSocket};
use edgelord_core::venue::polymarket::{PolymarketClient, PolymarketWebSocket};
use edgelord_core::venue::{VenueClient, VenueWebSocket};
use rust_decimal_macros::dec;
use tokio::signal;
use tokio::sync::{mpsc, oneshot};
use tracing::{error, info, warn};

const TRACK_TOP_N: usize = 50;
const REST_POLL_INTERVAL: Duration = Duration::from_secs(15);
const PAPER_STARTING_BALANCE: rust_decimal::Decimal = dec!(10_000);

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    let config = match Config::load("config.toml") {
        Ok(c) => c,
        Err(e) => {
            eprintln!("failed to load config: {e}");
            std::process::exit(1);
        }
    };
    config.logging.init();

    info!("tradebot starting");

    tokio::select! {
        result = run(config) => {
            if let Err(error) = result {
                error!(%error, "fatal error");
                std::process::exit(1);
            }
        }
        _ = signal::ctrl_c() => {
            info!("shutdown signal received");
        }
    }

    info!("tradebot stopped");
}

async fn run(config: Config) -> edgelord_core::error::Result<()> {
    let limiters = Arc::new(RateLimiterRegistry::with_default_venues());

    let poly_signer = HmacSigner::new(
        config.polymarket.api_key.clone(),
        config.polymarket.api_secret.clone(),
        config.polymarket.passphrase.clone(),
        config.polymarket.funder_address.clone(),
        config.polymarket.signature_type,
    );
    let kalshi_signer = RsaPssSigner::from_pem(config.kalshi.key_id.clone(), &config.kalshi.private_key_pem)?;

    let poly_client: Arc<dyn VenueClient> = Arc::new(PolymarketClient::new(
        config.polymarket.api_url.clone(),
        poly_signer,
        limiters.get("polymarket.orders").expect("default venues registered"),
        limiters.get("polymarket.reads").expect("default venues registered"),
    ));
    let kalshi_client: Arc<dyn VenueClient> = Arc::new(KalshiClient::new(
        config.kalshi.api_url.clone(),
        kalshi_signer.clone(),
        limiters.get("kalshi.orders").expect("default venues registered"),
        limiters.get("kalshi.reads").expect("default venues registered"),
    ));

    let mut clients: HashMap<Venue, Arc<dyn VenueClient>> = HashMap::new();
    clients.insert(Venue::Polymarket, poly_client.clone());
    clients.insert(Venue::Kalshi, kalshi_client.clone());

    let (orderbook_tx, mut orderbook_rx) = mpsc::unbounded_channel();
    let (price_tx, price_rx) = mpsc::unbounded_channel();
    let (degraded_tx, mut degraded_rx) = mpsc::unbounded_channel();
    let market_data = Arc::new(MarketDataService::new(MarketDataConfig::default(), orderbook_tx, price_tx, degraded_tx));

    spawn_polymarket_feed(&market_data, PolymarketWebSocket::new(config.polymarket.ws_url.clone()));
    spawn_kalshi_feed(&market_data, KalshiWebSocket::new(config.kalshi.ws_url.clone(), kalshi_signer));

    tokio::spawn(run_rest_poller(market_data.clone(), poly_client, REST_POLL_INTERVAL));
    tokio::spawn(run_rest_poller(market_data.clone(), kalshi_client, REST_POLL_INTERVAL));

    // Orderbook snapshots are cached by the Market Data Service on arrival;
    // this loop only exists to drain the channel so publishers never block.
    tokio::spawn(async move { while orderbook_rx.recv().await.is_some() {} });

    let pool = edgelord_core::persistence::create_pool(&config.database_path)?;
    edgelord_core::persistence::run_migrations(&pool)?;
    let execution_log = Arc::new(edgelord_core::persistence::ExecutionLog::new(pool));

    let risk = Arc::new(RiskCore::new(config.risk.clone()));
    if let Ok(seed) = execution_log.daily_pnl(chrono::Utc::now().date_naive()) {
        risk.record_realized_pnl(seed);
    }

    let order_sink: Arc<dyn edgelord_core::execution::OrderSink> = if config.trading.features.paper_trading {
        Arc::new(PaperVenueClientSink::new(market_data.clone(), clients.clone()))
    } else {
        Arc::new(OrderManager::new(risk.clone(), limiters.clone(), clients.clone()).with_execution_log(execution_log.clone()))
    };

    let history = Arc::new(edgelord_core::history::PriceHistory::new(500));
    let engine = Arc::new(
        TradingEngine::new(
            market_data.clone(),
            history,
            risk.clone(),
            order_sink,
            clients,
            config.risk.clone(),
            config.trading.clone(),
            config.strategies.clone(),
        )
        .with_execution_log(execution_log),
    );

    engine.bootstrap(TRACK_TOP_N).await?;

    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    tokio::spawn(async move {
        while let Some(venue) = degraded_rx.recv().await {
            warn!(%venue, "venue feed degraded, relying on REST poller fallback");
        }
    });

    let engine_task = tokio::spawn(engine.run(price_rx, shutdown_rx));
    signal::ctrl_c().await.ok();
    let _ = shutdown_tx.send(());
    let _ = engine_task.await;
    Ok(())
}

fn spawn_polymarket_feed(market_data: &Arc<MarketDataService>, mut ws: PolymarketWebSocket) {
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    market_data.register_venue(Venue::Polymarket, cmd_tx);

    tokio::spawn(async move {
        if let Err(error) = ws.run(cmd_rx, event_tx).await {
            error!(%error, venue = %Venue::Polymarket, "websocket feed terminated");
        }
    });

    let market_data = market_data.clone();
    tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            market_data.handle_event(Venue::Polymarket, event);
        }
    });
}

fn spawn_kalshi_feed(market_data: &Arc<MarketDataService>, mut ws: KalshiWebSocket) {
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    market_data.register_venue(Venue::Kalshi, cmd_tx);

    tokio::spawn(async move {
        if let Err(error) = ws.run(cmd_rx, event_tx).await {
            error!(%error, venue = %Venue::Kalshi, "websocket feed terminated");
        }
    });

    let market_data = market_data.clone();
    tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            market_data.handle_event(Venue::Kalshi, event);
        }
    });
}

/// Routes every order through [`PaperVenueClient`] instead of a real venue,
/// keyed by the requested venue so paper trading still respects per-venue
/// quoting.
struct PaperVenueClientSink {
    clients: HashMap<Venue, Arc<PaperVenueClient>>,
}

impl PaperVenueClientSink {
    fn new(market_data: Arc<MarketDataService>, _live_clients: HashMap<Venue, Arc<dyn VenueClient>>) -> Self {
        let mut clients = HashMap::new();
        for venue in [Venue::Polymarket, Venue::Kalshi] {
            clients.insert(venue, Arc::new(PaperVenueClient::new(venue, market_data.clone(), PAPER_STARTING_BALANCE)));
        }
        Self { clients }
    }
}

#[async_trait::async_trait]
impl edgelord_core::execution::OrderSink for PaperVenueClientSink {
    async fn place_order(&self, request: edgelord_core::domain::OrderRequest) -> edgelord_core::error::Result<edgelord_core::domain::Order> {
        let client = self.clients.get(&request.venue).ok_or_else(|| edgelord_core::error::Error::Validation(format!("no paper client for {}", request.venue)))?;
        client.place_order(request).await
    }
}
