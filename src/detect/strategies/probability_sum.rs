//! Probability-Sum Strategy: intra-market batch intent when
//! `ask(YES) + ask(NO) < 1 - epsilon`.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::config::strategy::ProbabilitySumConfig;
use crate::domain::{BatchLeg, Market, OrderSide, SignalId, StrategyId, TradingSignal};

const SIGNAL_TTL_SECS: i64 = 10;

/// Splits sizes proportional to asks so the number of contracts per outcome
/// is equal at resolution, and emits one batch signal covering both legs.
#[must_use]
pub fn detect(market: &Market, config: &ProbabilitySumConfig, notional: Decimal) -> Option<TradingSignal> {
    if !market.is_binary() {
        return None;
    }
    let yes = market.yes_outcome()?;
    let no = market.no_outcome()?;
    let yes_ask = yes.best_ask?;
    let no_ask = no.best_ask?;

    let total = yes_ask + no_ask;
    if total >= Decimal::ONE - config.epsilon {
        return None;
    }

    let profit_pct = (Decimal::ONE - total) / total * dec!(100);
    let confidence = (dec!(0.7) + profit_pct / dec!(20)).min(Decimal::ONE);

    // Equal contract count per outcome: split notional proportional to ask price.
    let yes_size = notional * (yes_ask / total);
    let no_size = notional * (no_ask / total);

    let now = chrono::Utc::now();
    Some(TradingSignal {
        id: SignalId::generate(),
        strategy_id: StrategyId::new("probability_sum"),
        market_id: market.id.clone(),
        outcome_id: yes.id.clone(),
        side: OrderSide::Buy,
        price: yes_ask,
        size: yes_size,
        confidence,
        reason: format!("probability sum {total} < 1 - {}", config.epsilon),
        created_at: now,
        expires_at: now + chrono::Duration::seconds(SIGNAL_TTL_SECS),
        batch: Some(vec![
            BatchLeg { market_id: market.id.clone(), outcome_id: yes.id.clone(), side: OrderSide::Buy, price: yes_ask, size: yes_size },
            BatchLeg { market_id: market.id.clone(), outcome_id: no.id.clone(), side: OrderSide::Buy, price: no_ask, size: no_size },
        ]),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MarketId, MarketStatus, Outcome, OutcomeId, Venue};
    use chrono::Utc;

    fn market(yes_ask: Decimal, no_ask: Decimal) -> Market {
        Market {
            id: MarketId::new("m1"),
            venue: Venue::Polymarket,
            external_id: "m1".into(),
            title: "t".into(),
            description: String::new(),
            category: None,
            end_date: Utc::now() + chrono::Duration::hours(24),
            outcomes: vec![
                Outcome { id: OutcomeId::new("yes"), external_id: "yes".into(), name: "YES".into(), is_yes: true, probability: None, best_bid: None, best_ask: Some(yes_ask), bid_size: None, ask_size: Some(dec!(100)) },
                Outcome { id: OutcomeId::new("no"), external_id: "no".into(), name: "NO".into(), is_yes: false, probability: None, best_bid: None, best_ask: Some(no_ask), bid_size: None, ask_size: Some(dec!(100)) },
            ],
            volume_24h: dec!(0),
            liquidity: dec!(0),
            status: MarketStatus::Active,
            is_active: true,
        }
    }

    #[test]
    fn emits_batch_signal_when_sum_under_threshold() {
        let signal = detect(&market(dec!(0.45), dec!(0.45)), &ProbabilitySumConfig::default(), dec!(1000)).unwrap();
        assert!(signal.is_batch());
        assert_eq!(signal.batch.unwrap().len(), 2);
    }

    #[test]
    fn no_signal_when_sum_at_or_above_threshold() {
        assert!(detect(&market(dec!(0.51), dec!(0.51)), &ProbabilitySumConfig::default(), dec!(1000)).is_none());
    }
}
