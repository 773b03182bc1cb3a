//! Momentum Strategy: confirms trend + RSI + `sma(5)` positioning before
//! riding a move.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::config::strategy::MomentumConfig;
use crate::domain::{Market, OrderSide, Outcome, SignalId, StrategyId, TradingSignal};
use crate::history::{PriceStats, Trend};

const SIGNAL_TTL_SECS: i64 = 20;
const SMA5_TOLERANCE: Decimal = dec!(0.002);
const RSI_EXTREME: Decimal = dec!(70);

/// `outcome` is the one `stats` was computed from; `size` is the notional
/// to trade.
#[must_use]
pub fn detect(market: &Market, outcome: &Outcome, stats: &PriceStats, config: &MomentumConfig, size: Decimal) -> Option<TradingSignal> {
    let momentum = stats.momentum?;
    let change_percent = stats.change_percent?;
    let trend = stats.trend?;
    let rsi = stats.rsi_14?;
    let sma5 = stats.sma_5?;
    let ask = outcome.best_ask?;

    if momentum.abs() < config.tau_momentum || change_percent.abs() < config.tau_change_percent {
        return None;
    }

    let side = if momentum > Decimal::ZERO { OrderSide::Buy } else { OrderSide::Sell };

    match (side, trend) {
        (OrderSide::Buy, Trend::Up) | (OrderSide::Sell, Trend::Down) => {}
        _ => return None,
    }

    // RSI must not be at the extreme that opposes this direction.
    if side == OrderSide::Buy && rsi >= RSI_EXTREME + dec!(15) {
        return None;
    }
    if side == OrderSide::Sell && rsi <= dec!(100) - RSI_EXTREME - dec!(15) {
        return None;
    }

    let price_vs_sma5 = (ask - sma5).abs() / sma5.max(Decimal::ONE);
    if price_vs_sma5 > SMA5_TOLERANCE * dec!(5) {
        return None;
    }

    let rsi_strength = if side == OrderSide::Buy { (rsi / dec!(100)).min(Decimal::ONE) } else { ((dec!(100) - rsi) / dec!(100)).min(Decimal::ONE) };
    let volume_bonus = if stats.volume_spike { dec!(0.1) } else { Decimal::ZERO };
    let confidence = ((momentum.abs() * dec!(50) + rsi_strength * dec!(0.5) + volume_bonus).min(Decimal::ONE)).max(dec!(0.3));

    let now = chrono::Utc::now();
    Some(TradingSignal {
        id: SignalId::generate(),
        strategy_id: StrategyId::new("momentum"),
        market_id: market.id.clone(),
        outcome_id: outcome.id.clone(),
        side,
        price: ask,
        size,
        confidence,
        reason: format!("momentum {momentum} trend {trend:?} rsi {rsi}"),
        created_at: now,
        expires_at: now + chrono::Duration::seconds(SIGNAL_TTL_SECS),
        batch: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MarketId, MarketStatus, OutcomeId, Venue};
    use chrono::Utc;

    fn market_and_outcome(ask: Decimal) -> (Market, Outcome) {
        let outcome = Outcome {
            id: OutcomeId::new("yes"),
            external_id: "yes".into(),
            name: "YES".into(),
            is_yes: true,
            probability: None,
            best_bid: None,
            best_ask: Some(ask),
            bid_size: None,
            ask_size: Some(dec!(100)),
        };
        let market = Market {
            id: MarketId::new("m1"),
            venue: Venue::Polymarket,
            external_id: "m1".into(),
            title: "t".into(),
            description: String::new(),
            category: None,
            end_date: Utc::now() + chrono::Duration::hours(24),
            outcomes: vec![outcome.clone()],
            volume_24h: dec!(0),
            liquidity: dec!(0),
            status: MarketStatus::Active,
            is_active: true,
        };
        (market, outcome)
    }

    fn stats(momentum: Decimal, change_percent: Decimal, trend: Trend, rsi: Decimal, sma5: Decimal) -> PriceStats {
        PriceStats {
            sma_5: Some(sma5),
            sma_20: Some(sma5),
            vwap: Some(sma5),
            rsi_14: Some(rsi),
            momentum: Some(momentum),
            change_percent: Some(change_percent),
            trend: Some(trend),
            volume_spike: false,
            sample_count: 30,
        }
    }

    #[test]
    fn emits_buy_on_confirmed_uptrend() {
        let (market, outcome) = market_and_outcome(dec!(0.50));
        let stats = stats(dec!(0.01), dec!(2), Trend::Up, dec!(60), dec!(0.50));
        let signal = momentum_detect(&market, &outcome, &stats);
        assert!(signal.is_some());
        assert_eq!(signal.unwrap().side, OrderSide::Buy);
    }

    #[test]
    fn no_signal_on_weak_momentum() {
        let (market, outcome) = market_and_outcome(dec!(0.50));
        let stats = stats(dec!(0.0001), dec!(0.1), Trend::Up, dec!(60), dec!(0.50));
        assert!(momentum_detect(&market, &outcome, &stats).is_none());
    }

    #[test]
    fn no_signal_when_trend_disagrees_with_momentum_sign() {
        let (market, outcome) = market_and_outcome(dec!(0.50));
        let stats = stats(dec!(0.01), dec!(2), Trend::Down, dec!(60), dec!(0.50));
        assert!(momentum_detect(&market, &outcome, &stats).is_none());
    }

    fn momentum_detect(market: &Market, outcome: &Outcome, stats: &PriceStats) -> Option<TradingSignal> {
        detect(market, outcome, stats, &MomentumConfig::default(), dec!(100))
    }
}
