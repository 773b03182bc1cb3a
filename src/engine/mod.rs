//! Trading Engine (C13): wires the venue connectors, Market Data Service,
//! detectors, and executors into one scan loop.
//!
//! Data/control flow: venue WebSockets emit raw updates -> Market Data
//! Service normalizes, caches, and debounces -> this module receives
//! [`PriceUpdate`]s -> feeds price history and the detectors -> the best
//! candidate dispatches to the Signal or Arbitrage Executor -> which submits
//! through the Order Manager -> which consults Risk Core before every write.

mod market_cache;

pub use market_cache::MarketCache;

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::config::risk::RiskConfig;
use crate::config::strategy::StrategiesConfig;
use crate::config::trading::TradingConfig;
use crate::detect::{self, strategies};
use crate::domain::{ArbitrageOpportunity, MarketId, PriceUpdate, TradingSignal, Venue};
use crate::execution::{ArbitrageExecutor, OrderSink, SignalExecutor};
use crate::history::PriceHistory;
use crate::marketdata::MarketDataService;
use crate::matcher::MarketMatcher;
use crate::persistence::ExecutionLog;
use crate::risk::RiskCore;
use crate::venue::VenueClient;

const SCAN_DEBOUNCE: Duration = Duration::from_millis(500);

/// Candidate produced by one scan round: at most one of the two detector
/// families wins dispatch, arbitrage always taking priority over a signal
/// when both fire for the same key (arbitrage is the closer-to-risk-free
/// trade).
enum Candidate {
    Arbitrage(ArbitrageOpportunity),
    Signal(TradingSignal),
}

pub struct TradingEngine {
    market_data: Arc<MarketDataService>,
    market_cache: Arc<MarketCache>,
    history: Arc<PriceHistory>,
    matcher: parking_lot::RwLock<MarketMatcher>,
    cooldowns: strategies::cooldown::CooldownTracker,
    last_scan: DashMap<MarketId, Instant>,
    risk: Arc<RiskCore>,
    signal_executor: SignalExecutor,
    arbitrage_executor: ArbitrageExecutor,
    clients: HashMap<Venue, Arc<dyn VenueClient>>,
    risk_config: RiskConfig,
    trading_config: TradingConfig,
    strategies_config: StrategiesConfig,
    /// Set once all open orders have been cancelled for the kill switch's
    /// current activation, so a saturated scan loop doesn't re-issue
    /// cancel-all on every tick; cleared when the switch is reset.
    halt_cancelled: AtomicBool,
    /// Persists realized P&L alongside `RiskCore`'s in-memory accumulator so
    /// it survives a restart. Optional: unit tests run without it.
    execution_log: Option<Arc<ExecutionLog>>,
}

impl TradingEngine {
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        market_data: Arc<MarketDataService>,
        history: Arc<PriceHistory>,
        risk: Arc<RiskCore>,
        sink: Arc<dyn OrderSink>,
        clients: HashMap<Venue, Arc<dyn VenueClient>>,
        risk_config: RiskConfig,
        trading_config: TradingConfig,
        strategies_config: StrategiesConfig,
    ) -> Self {
        let arbitrage_config = crate::execution::ArbitrageExecutorConfig {
            leg_timeout: Duration::from_millis(trading_config.leg_timeout_ms),
            unwind_timeout: Duration::from_millis(trading_config.unwind_timeout_ms),
        };
        Self {
            market_data,
            market_cache: Arc::new(MarketCache::new()),
            history,
            matcher: parking_lot::RwLock::new(MarketMatcher::new()),
            cooldowns: strategies::cooldown::CooldownTracker::new(),
            last_scan: DashMap::new(),
            risk,
            signal_executor: SignalExecutor::new(sink.clone(), trading_config.clone()),
            arbitrage_executor: ArbitrageExecutor::new(sink, arbitrage_config),
            clients,
            risk_config,
            trading_config,
            strategies_config,
            halt_cancelled: AtomicBool::new(false),
            execution_log: None,
        }
    }

    /// Persists realized P&L to SQLite in addition to `RiskCore`'s in-memory
    /// accumulator. Optional: unit tests and paper trading run without it.
    #[must_use]
    pub fn with_execution_log(mut self, log: Arc<ExecutionLog>) -> Self {
        self.execution_log = Some(log);
        self
    }

    /// Step 1-3 of the wiring: connect every venue, pull its market
    /// universe into the cache, subscribe the top-N by 24h volume to the
    /// Market Data Service, and (if enabled) run the matcher over the
    /// combined universe.
    pub async fn bootstrap(&self, track_top_n: usize) -> crate::error::Result<()> {
        let mut by_venue: HashMap<Venue, Vec<crate::domain::Market>> = HashMap::new();

        for (venue, client) in &self.clients {
            client.connect().await?;
            let mut markets = client.get_markets(crate::venue::MarketFilter { active_only: true, limit: None }).await?;
            markets.sort_by(|a, b| b.volume_24h.cmp(&a.volume_24h));
            markets.truncate(track_top_n.max(1));
            info!(venue = %venue, count = markets.len(), "bootstrapped market universe");

            for market in &markets {
                self.market_cache.upsert(market.clone());
                for outcome in &market.outcomes {
                    self.market_data.track_market(*venue, market.id.clone(), outcome.id.clone());
                }
            }
            by_venue.insert(*venue, markets);
        }

        if self.trading_config.features.cross_venue_arbitrage {
            if let (Some(poly), Some(kalshi)) = (by_venue.get(&Venue::Polymarket), by_venue.get(&Venue::Kalshi)) {
                let candidates = MarketMatcher::candidates(poly, kalshi);
                let verifier = crate::matcher::HeuristicVerifier;
                let accepted = self.matcher.write().verify_and_store(candidates, &verifier).await?;
                info!(accepted, "matched cross-venue market pairs");
            }
        }
        Ok(())
    }

    /// Drives the engine until `shutdown` fires: consumes debounced
    /// `PriceUpdate`s from the Market Data Service, runs the risk monitor,
    /// and falls back to a full scan every `scanIntervalMs` in case a key
    /// never produces another update.
    pub async fn run(self: Arc<Self>, mut price_rx: mpsc::UnboundedReceiver<PriceUpdate>, mut shutdown: oneshot::Receiver<()>) {
        let (risk_shutdown_tx, risk_shutdown_rx) = oneshot::channel();
        let risk_task = tokio::spawn(crate::risk::run_monitor(self.risk.clone(), risk_shutdown_rx));

        let mut scan_ticker = tokio::time::interval(Duration::from_millis(self.trading_config.scan_interval_ms));
        scan_ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                Some(update) = price_rx.recv() => {
                    let engine = self.clone();
                    tokio::spawn(async move {
                        engine.enforce_kill_switch().await;
                        engine.handle_price_update(update).await;
                    });
                }
                _ = scan_ticker.tick() => {
                    let engine = self.clone();
                    tokio::spawn(async move {
                        engine.enforce_kill_switch().await;
                        engine.scan_all().await;
                    });
                }
                _ = &mut shutdown => {
                    info!("trading engine shutting down");
                    break;
                }
            }
        }

        let _ = risk_shutdown_tx.send(());
        let _ = risk_task.await;
        self.cancel_all_open_orders().await;
    }

    async fn scan_all(&self) {
        for market in self.market_cache.all() {
            self.scan_market(&market.id).await;
        }
    }

    async fn handle_price_update(&self, update: PriceUpdate) {
        self.market_cache.apply_price_update(&update);
        self.history.record(&update.market_id, &update.outcome_id, update.mid_price.unwrap_or_default(), None, update.timestamp);
        self.scan_market(&update.market_id).await;
    }

    async fn scan_market(&self, market_id: &MarketId) {
        if !self.should_scan(market_id) {
            return;
        }
        if self.risk.is_halted() || self.cooldowns.is_active(market_id) {
            return;
        }
        let Some(market) = self.market_cache.get(market_id) else { return };

        if let Some(candidate) = self.best_candidate(&market) {
            self.dispatch(market_id.clone(), candidate).await;
        }
    }

    /// At most one scan per key per [`SCAN_DEBOUNCE`], on top of C4's own
    /// debounce on the update stream itself.
    fn should_scan(&self, market_id: &MarketId) -> bool {
        let now = Instant::now();
        let mut allow = true;
        self.last_scan
            .entry(market_id.clone())
            .and_modify(|last| {
                if now.duration_since(*last) < SCAN_DEBOUNCE {
                    allow = false;
                } else {
                    *last = now;
                }
            })
            .or_insert(now);
        allow
    }

    fn best_candidate(&self, market: &crate::domain::Market) -> Option<Candidate> {
        let mut opportunities = Vec::new();
        if self.trading_config.features.single_venue_arbitrage {
            if let Some(opp) = detect::detect_single_venue(market, &self.risk_config, self.trading_config.min_spread_bps) {
                opportunities.push(opp);
            }
        }
        if self.trading_config.features.cross_venue_arbitrage {
            opportunities.extend(self.cross_venue_opportunities(market));
        }
        let opportunities: Vec<_> = opportunities.into_iter().filter(|o| detect::revalidate(o, &self.market_data)).collect();
        if let Some(best) = detect::rank(opportunities).into_iter().next() {
            return Some(Candidate::Arbitrage(best));
        }

        let mut signals = self.strategy_signals(market);
        signals.sort_by(|a, b| b.confidence.cmp(&a.confidence));
        signals.into_iter().next().map(Candidate::Signal)
    }

    fn cross_venue_opportunities(&self, market: &crate::domain::Market) -> Vec<ArbitrageOpportunity> {
        let matcher = self.matcher.read();
        let mut found = Vec::new();
        for pair in matcher.active_pairs() {
            let (poly_id, kalshi_id) = (pair.poly_market_id(), pair.kalshi_market_id());
            if market.id != *poly_id && market.id != *kalshi_id {
                continue;
            }
            let Some(poly) = self.market_cache.get(poly_id) else { continue };
            let Some(kalshi) = self.market_cache.get(kalshi_id) else { continue };
            if let Some(opp) = detect::detect_cross_venue(pair, &poly, &kalshi, &self.risk_config, self.trading_config.min_spread_bps) {
                found.push(opp);
            }
        }
        found
    }

    fn strategy_signals(&self, market: &crate::domain::Market) -> Vec<TradingSignal> {
        let enabled = &self.strategies_config.enabled;
        let size = self.risk_config.max_position_per_market;
        let mut signals = Vec::new();

        if enabled.iter().any(|s| s == "probability_sum") {
            signals.extend(strategies::probability_sum::detect(market, &self.strategies_config.probability_sum, size));
        }
        if enabled.iter().any(|s| s == "endgame") {
            signals.extend(strategies::endgame::detect(market, &self.strategies_config.endgame, size, chrono::Utc::now()));
        }
        for outcome in &market.outcomes {
            let stats = self.history.stats(&market.id, &outcome.id);
            if enabled.iter().any(|s| s == "momentum") {
                signals.extend(strategies::momentum::detect(market, outcome, &stats, &self.strategies_config.momentum, size));
            }
            if enabled.iter().any(|s| s == "mean_reversion") {
                signals.extend(strategies::mean_reversion::detect(market, outcome, &stats, &self.strategies_config.mean_reversion, size));
            }
            if enabled.iter().any(|s| s == "imbalance") {
                signals.extend(strategies::imbalance::detect(market, outcome, &self.strategies_config.imbalance, size));
            }
        }
        signals
    }

    async fn dispatch(&self, market_id: MarketId, candidate: Candidate) {
        match candidate {
            Candidate::Arbitrage(opportunity) => {
                let result = self.arbitrage_executor.execute(&opportunity).await;
                debug!(success = result.success, realized = %result.realized_pnl, "arbitrage execution completed");
                if result.success || result.unwound {
                    self.risk.record_realized_pnl(result.realized_pnl);
                    if let Some(log) = &self.execution_log {
                        if let Err(error) = log.record_realized_pnl(result.realized_pnl) {
                            warn!(%error, "failed to persist realized pnl");
                        }
                    }
                    self.enter_cooldown(&market_id);
                }
            }
            Candidate::Signal(signal) => {
                let Some(venue) = self.market_cache.get(&market_id).map(|m| m.venue) else { return };
                let result = self.signal_executor.execute(signal, venue).await;
                debug!(success = result.success, "signal execution completed");
                if result.success {
                    self.enter_cooldown(&market_id);
                }
            }
        }
    }

    fn enter_cooldown(&self, market_id: &MarketId) {
        self.cooldowns.start(market_id.clone(), Duration::from_millis(self.trading_config.cooldown_after_execution_ms));
    }

    /// Cancels every open order on the kill switch's `Inactive -> Active`
    /// edge, exactly once per activation; re-arms once the switch is reset
    /// so a later activation cancels again.
    async fn enforce_kill_switch(&self) {
        if self.risk.is_halted() {
            if !self.halt_cancelled.swap(true, Ordering::SeqCst) {
                warn!("kill switch active, cancelling all open orders");
                self.cancel_all_open_orders().await;
            }
        } else {
            self.halt_cancelled.store(false, Ordering::SeqCst);
        }
    }

    /// Best-effort shutdown: cancel every open order on every connected
    /// venue, ignoring individual failures.
    async fn cancel_all_open_orders(&self) {
        for (venue, client) in &self.clients {
            if let Err(error) = client.cancel_all_orders(None).await {
                warn!(%venue, %error, "failed to cancel open orders during shutdown");
            }
        }
    }
}
