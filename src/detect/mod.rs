//! Arbitrage Detector (C7): single-venue probability-sum arbitrage and
//! cross-venue complementary-leg arbitrage over matched pairs.

pub mod strategies;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::config::risk::RiskConfig;
use crate::domain::{
    ArbitrageOpportunity, Market, OpportunityId, OpportunityKind, OpportunityLeg, OrderSide, Outcome, Venue,
};
use crate::marketdata::MarketDataService;
use crate::matcher::MarketPair;

const OPPORTUNITY_TTL_SECS: i64 = 15;

/// Single-venue probability-sum arbitrage: `gross = 1 - ask(YES) - ask(NO)`.
/// Returns `None` when no outcome is quoted, the spread doesn't clear
/// `min_spread_bps`, or the market isn't binary.
#[must_use]
pub fn detect_single_venue(market: &Market, risk: &RiskConfig, min_spread_bps: Decimal) -> Option<ArbitrageOpportunity> {
    if !market.is_binary() {
        return None;
    }
    let yes = market.yes_outcome()?;
    let no = market.no_outcome()?;
    let yes_ask = yes.best_ask?;
    let no_ask = no.best_ask?;

    let gross = Decimal::ONE - yes_ask - no_ask;
    let net = gross - risk.default_taker_fee * yes_ask - risk.default_taker_fee * no_ask;
    let spread_bps = net * dec!(10000);
    if spread_bps < min_spread_bps {
        return None;
    }

    let max_size = yes.ask_size.unwrap_or(Decimal::ZERO).min(no.ask_size.unwrap_or(Decimal::ZERO));
    let max_profit = net * max_size;
    let now = chrono::Utc::now();

    Some(ArbitrageOpportunity {
        id: OpportunityId::generate(),
        kind: OpportunityKind::SinglePlatform,
        legs: vec![
            leg(market.venue, market, yes, OrderSide::Buy, yes_ask),
            leg(market.venue, market, no, OrderSide::Buy, no_ask),
        ],
        gross_spread: gross,
        net_spread: net,
        spread_bps,
        max_size,
        max_profit,
        confidence: dec!(1),
        detected_at: now,
        expires_at: now + chrono::Duration::seconds(OPPORTUNITY_TTL_SECS),
        is_valid: true,
    })
}

/// Cross-venue complementary-leg arbitrage over a matched pair: evaluates
/// both `(A.YES, B.NO)` and `(A.NO, B.YES)` pairings and keeps the
/// higher-profit one, subtracting `cross_platform_buffer` from gross for
/// oracle/settlement risk.
#[must_use]
pub fn detect_cross_venue(
    pair: &MarketPair,
    poly_market: &Market,
    kalshi_market: &Market,
    risk: &RiskConfig,
    min_spread_bps: Decimal,
) -> Option<ArbitrageOpportunity> {
    let poly_yes = poly_market.yes_outcome()?;
    let poly_no = poly_market.no_outcome()?;
    let kalshi_yes = kalshi_market.yes_outcome()?;
    let kalshi_no = kalshi_market.no_outcome()?;

    let pairing_a = cross_pairing(poly_market, poly_yes, kalshi_market, kalshi_no, risk);
    let pairing_b = cross_pairing(poly_market, poly_no, kalshi_market, kalshi_yes, risk);

    let (gross, net, legs) = match (pairing_a, pairing_b) {
        (Some(a), Some(b)) if b.1 > a.1 => b,
        (Some(a), _) => a,
        (None, Some(b)) => b,
        (None, None) => return None,
    };

    let spread_bps = net * dec!(10000);
    if spread_bps < min_spread_bps {
        return None;
    }

    let max_size = legs.iter().map(|l| l.max_size).fold(Decimal::MAX, Decimal::min);
    let max_profit = net * max_size;
    let now = chrono::Utc::now();

    Some(ArbitrageOpportunity {
        id: OpportunityId::generate(),
        kind: OpportunityKind::CrossPlatform,
        legs,
        gross_spread: gross,
        net_spread: net,
        spread_bps,
        max_size,
        max_profit,
        confidence: Decimal::try_from(pair.confidence()).unwrap_or(dec!(0.8)),
        detected_at: now,
        expires_at: now + chrono::Duration::seconds(OPPORTUNITY_TTL_SECS),
        is_valid: true,
    })
}

#[allow(clippy::type_complexity)]
fn cross_pairing(
    a_market: &Market,
    a_outcome: &Outcome,
    b_market: &Market,
    b_outcome: &Outcome,
    risk: &RiskConfig,
) -> Option<(Decimal, Decimal, Vec<OpportunityLeg>)> {
    let a_ask = a_outcome.best_ask?;
    let b_ask = b_outcome.best_ask?;

    let gross = Decimal::ONE - a_ask - b_ask - risk.cross_platform_buffer;
    let net = gross - risk.default_taker_fee * a_ask - risk.default_taker_fee * b_ask;

    let legs = vec![
        leg(a_market.venue, a_market, a_outcome, OrderSide::Buy, a_ask),
        leg(b_market.venue, b_market, b_outcome, OrderSide::Buy, b_ask),
    ];
    Some((gross, net, legs))
}

fn leg(venue: Venue, market: &Market, outcome: &Outcome, side: OrderSide, price: Decimal) -> OpportunityLeg {
    let max_size = outcome.ask_size.unwrap_or(Decimal::ZERO);
    OpportunityLeg {
        venue,
        market_id: market.id.clone(),
        outcome_id: outcome.id.clone(),
        side,
        price,
        size: max_size,
        max_size,
    }
}

/// Pre-execution revalidation: every leg's best ask must still be within 1%
/// of the quoted price and size available >= 50% of requested, using the
/// current cache state from the Market Data Service.
#[must_use]
pub fn revalidate(opportunity: &ArbitrageOpportunity, market_data: &MarketDataService) -> bool {
    for leg in &opportunity.legs {
        let key = crate::marketdata::CacheKey::new(leg.venue, leg.market_id.clone(), leg.outcome_id.clone());
        let Some(book) = market_data.get_order_book(&key) else {
            return false;
        };
        let Some(best) = book.best_ask() else {
            return false;
        };
        let price_drift = (best.price - leg.price).abs() / leg.price;
        if price_drift > dec!(0.01) {
            return false;
        }
        if best.size < leg.size * dec!(0.5) {
            return false;
        }
    }
    true
}

/// Ranks candidate opportunities by `maxProfit` descending, earlier
/// `detectedAt` breaking ties.
pub fn rank(mut opportunities: Vec<ArbitrageOpportunity>) -> Vec<ArbitrageOpportunity> {
    opportunities.sort_by(|a, b| if a.ranks_above(b) { std::cmp::Ordering::Less } else { std::cmp::Ordering::Greater });
    opportunities
}
