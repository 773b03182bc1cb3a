//! Endgame Strategy: buy near-certain outcomes close to resolution for an
//! annualized return that clears the configured floor.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::config::strategy::EndgameConfig;
use crate::domain::{Market, OrderSide, Outcome, SignalId, StrategyId, TradingSignal};

const SIGNAL_TTL_SECS: i64 = 30;
const HOURS_PER_YEAR: f64 = 8760.0;

#[must_use]
pub fn detect(market: &Market, config: &EndgameConfig, size: Decimal, now: chrono::DateTime<chrono::Utc>) -> Option<TradingSignal> {
    let hours = market.hours_to_resolution(now);
    if hours < config.min_hours_to_res || hours > config.max_hours_to_res {
        return None;
    }

    let mut best: Option<(&Outcome, Decimal, Decimal)> = None;
    for outcome in &market.outcomes {
        let Some(ask) = outcome.best_ask else { continue };
        if ask < config.min_prob || ask > config.max_prob {
            continue;
        }
        let profit_pct = (Decimal::ONE - ask) / ask * dec!(100);
        let annualized = annualize(profit_pct, hours);
        if annualized < config.min_annualized_return {
            continue;
        }
        let better = match &best {
            Some((_, _, current)) => annualized > *current,
            None => true,
        };
        if better {
            best = Some((outcome, ask, annualized));
        }
    }

    let (outcome, ask, _annualized) = best?;
    Some(TradingSignal {
        id: SignalId::generate(),
        strategy_id: StrategyId::new("endgame"),
        market_id: market.id.clone(),
        outcome_id: outcome.id.clone(),
        side: OrderSide::Buy,
        price: ask,
        size,
        confidence: ask,
        reason: format!("endgame: {hours:.1}h to resolution, ask {ask}"),
        created_at: now,
        expires_at: now + chrono::Duration::seconds(SIGNAL_TTL_SECS),
        batch: None,
    })
}

fn annualize(profit_pct: Decimal, hours: f64) -> Decimal {
    if hours <= 0.0 {
        return Decimal::ZERO;
    }
    let factor = Decimal::from_f64_retain(HOURS_PER_YEAR / hours).unwrap_or(Decimal::ZERO);
    profit_pct * factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MarketId, MarketStatus, OutcomeId, Venue};
    use chrono::Utc;

    fn market(hours_to_res: i64, ask: Decimal) -> Market {
        let now = Utc::now();
        Market {
            id: MarketId::new("m1"),
            venue: Venue::Polymarket,
            external_id: "m1".into(),
            title: "t".into(),
            description: String::new(),
            category: None,
            end_date: now + chrono::Duration::hours(hours_to_res),
            outcomes: vec![
                Outcome { id: OutcomeId::new("yes"), external_id: "yes".into(), name: "YES".into(), is_yes: true, probability: None, best_bid: None, best_ask: Some(ask), bid_size: None, ask_size: Some(dec!(100)) },
                Outcome { id: OutcomeId::new("no"), external_id: "no".into(), name: "NO".into(), is_yes: false, probability: None, best_bid: None, best_ask: Some(Decimal::ONE - ask), bid_size: None, ask_size: Some(dec!(100)) },
            ],
            volume_24h: dec!(0),
            liquidity: dec!(0),
            status: MarketStatus::Active,
            is_active: true,
        }
    }

    #[test]
    fn emits_signal_for_near_certain_outcome_near_resolution() {
        let config = EndgameConfig::default();
        let m = market(12, dec!(0.95));
        let signal = detect(&m, &config, dec!(100), Utc::now());
        assert!(signal.is_some());
    }

    #[test]
    fn no_signal_outside_resolution_window() {
        let config = EndgameConfig::default();
        let m = market(200, dec!(0.95));
        assert!(detect(&m, &config, dec!(100), Utc::now()).is_none());
    }

    #[test]
    fn no_signal_when_ask_outside_probability_band() {
        let config = EndgameConfig::default();
        let m = market(12, dec!(0.5));
        assert!(detect(&m, &config, dec!(100), Utc::now()).is_none());
    }
}
