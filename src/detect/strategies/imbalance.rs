//! Order-Book Imbalance Strategy: a lopsided bid/ask size ratio signals
//! short-term pressure toward the thicker side.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::config::strategy::ImbalanceConfig;
use crate::domain::{Market, OrderSide, Outcome, SignalId, StrategyId, TradingSignal};

const SIGNAL_TTL_SECS: i64 = 15;

#[must_use]
pub fn detect(market: &Market, outcome: &Outcome, config: &ImbalanceConfig, size: Decimal) -> Option<TradingSignal> {
    let bid_size = outcome.bid_size?;
    let ask_size = outcome.ask_size?;
    let ask = outcome.best_ask?;
    if bid_size.is_zero() || ask_size.is_zero() {
        return None;
    }

    let ratio = bid_size / ask_size;
    let (side, strength) = if ratio >= config.ratio_threshold {
        (OrderSide::Buy, ratio)
    } else if ask_size / bid_size >= config.ratio_threshold {
        (OrderSide::Sell, ask_size / bid_size)
    } else {
        return None;
    };

    let confidence = (dec!(0.4) + (strength - config.ratio_threshold) / (config.ratio_threshold * dec!(2))).clamp(dec!(0.4), dec!(0.9));

    let now = chrono::Utc::now();
    Some(TradingSignal {
        id: SignalId::generate(),
        strategy_id: StrategyId::new("imbalance"),
        market_id: market.id.clone(),
        outcome_id: outcome.id.clone(),
        side,
        price: ask,
        size,
        confidence,
        reason: format!("book imbalance ratio {ratio} (bid {bid_size} / ask {ask_size})"),
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

    fn market_and_outcome(bid_size: Decimal, ask_size: Decimal) -> (Market, Outcome) {
        let outcome = Outcome {
            id: OutcomeId::new("yes"),
            external_id: "yes".into(),
            name: "YES".into(),
            is_yes: true,
            probability: None,
            best_bid: Some(dec!(0.49)),
            best_ask: Some(dec!(0.50)),
            bid_size: Some(bid_size),
            ask_size: Some(ask_size),
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

    #[test]
    fn emits_buy_when_bid_size_dominates() {
        let (market, outcome) = market_and_outcome(dec!(400), dec!(100));
        let signal = detect(&market, &outcome, &ImbalanceConfig::default(), dec!(50));
        assert!(signal.is_some());
        assert_eq!(signal.unwrap().side, OrderSide::Buy);
    }

    #[test]
    fn emits_sell_when_ask_size_dominates() {
        let (market, outcome) = market_and_outcome(dec!(100), dec!(400));
        let signal = detect(&market, &outcome, &ImbalanceConfig::default(), dec!(50));
        assert!(signal.is_some());
        assert_eq!(signal.unwrap().side, OrderSide::Sell);
    }

    #[test]
    fn no_signal_when_book_is_balanced() {
        let (market, outcome) = market_and_outcome(dec!(120), dec!(100));
        assert!(detect(&market, &outcome, &ImbalanceConfig::default(), dec!(50)).is_none());
    }
}
