//! Mean-Reversion Strategy: z-score deviation from `sma(20)` beyond a band
//! triggers a fade toward the mean.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::config::strategy::MeanReversionConfig;
use crate::domain::{Market, OrderSide, Outcome, SignalId, StrategyId, TradingSignal};
use crate::history::PriceStats;

const SIGNAL_TTL_SECS: i64 = 20;

#[must_use]
pub fn detect(market: &Market, outcome: &Outcome, stats: &PriceStats, config: &MeanReversionConfig, size: Decimal) -> Option<TradingSignal> {
    let sma = stats.sma_20?;
    let ask = outcome.best_ask?;
    if sma.is_zero() {
        return None;
    }

    let deviation = (ask - sma) / sma;
    let abs_deviation = deviation.abs();
    if abs_deviation < config.tau_lo / dec!(100) || abs_deviation > config.tau_hi / dec!(100) {
        return None;
    }

    // Price deviated above the mean: expect reversion down -> short; below: long.
    let side = if deviation > Decimal::ZERO { OrderSide::Sell } else { OrderSide::Buy };

    let strength = ((abs_deviation * dec!(100) - config.tau_lo) / (config.tau_hi - config.tau_lo)).clamp(Decimal::ZERO, Decimal::ONE);
    let confidence = (dec!(0.5) + strength * dec!(0.4)).min(Decimal::ONE);

    let now = chrono::Utc::now();
    Some(TradingSignal {
        id: SignalId::generate(),
        strategy_id: StrategyId::new("mean_reversion"),
        market_id: market.id.clone(),
        outcome_id: outcome.id.clone(),
        side,
        price: ask,
        size,
        confidence,
        reason: format!("mean reversion: {deviation} from sma20 {sma}"),
        created_at: now,
        expires_at: now + chrono::Duration::seconds(SIGNAL_TTL_SECS),
        batch: None,
    })
}
