//! Market Matcher (C6): finds the cross-venue `MarketPair`s the detectors
//! (C7/C8) need, in two stages — cheap Jaccard candidate search, then a
//! confidence-scored verification pass.

mod verify;

pub use verify::{HeuristicVerifier, MarketVerifier, VerificationOutcome};

use std::collections::{HashMap, HashSet};

use chrono::Duration as ChronoDuration;

use crate::domain::{Market, OutcomeId};
use crate::error::Result;

const MAX_END_DATE_DRIFT_DAYS: i64 = 7;
const MIN_JACCARD_SIMILARITY: f64 = 0.3;
const MAX_CANDIDATES: usize = 50;
const MIN_MATCH_CONFIDENCE: f64 = 0.8;

/// A verified cross-venue market pair, keyed `polyExt:kalshiExt` in storage.
#[derive(Debug, Clone)]
pub struct MarketPair {
    key: String,
    poly_market_id: crate::domain::MarketId,
    kalshi_market_id: crate::domain::MarketId,
    poly_outcome: OutcomeId,
    kalshi_outcome: OutcomeId,
    confidence: f64,
    active: bool,
}

impl MarketPair {
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[must_use]
    pub fn poly_market_id(&self) -> &crate::domain::MarketId {
        &self.poly_market_id
    }

    #[must_use]
    pub fn kalshi_market_id(&self) -> &crate::domain::MarketId {
        &self.kalshi_market_id
    }

    #[must_use]
    pub fn poly_outcome(&self) -> &OutcomeId {
        &self.poly_outcome
    }

    #[must_use]
    pub fn kalshi_outcome(&self) -> &OutcomeId {
        &self.kalshi_outcome
    }

    #[must_use]
    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    fn deactivate(&mut self) {
        self.active = false;
    }
}

/// Owns the verified pair store, keyed `polyExt:kalshiExt`.
#[derive(Default)]
pub struct MarketMatcher {
    pairs: HashMap<String, MarketPair>,
}

impl MarketMatcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn pairs(&self) -> impl Iterator<Item = &MarketPair> {
        self.pairs.values()
    }

    #[must_use]
    pub fn active_pairs(&self) -> Vec<&MarketPair> {
        self.pairs.values().filter(|p| p.active).collect()
    }

    /// Deactivate every stored pair that references `market_id` (either
    /// side) — called when a market deactivates upstream.
    pub fn deactivate_for_market(&mut self, market_id: &crate::domain::MarketId) {
        for pair in self.pairs.values_mut() {
            if pair.poly_market_id == *market_id || pair.kalshi_market_id == *market_id {
                pair.deactivate();
            }
        }
    }

    /// Stage 1: candidate search. Filters to active markets on both sides,
    /// keeps pairs whose end dates are within 7 days, scores by Jaccard
    /// similarity over normalized `title + description` word sets, retains
    /// similarity >= 0.3, and returns the top 50 by similarity descending.
    #[must_use]
    pub fn candidates<'a>(poly_markets: &'a [Market], kalshi_markets: &'a [Market]) -> Vec<(&'a Market, &'a Market, f64)> {
        let mut scored: Vec<(&Market, &Market, f64)> = Vec::new();
        for poly in poly_markets.iter().filter(|m| m.is_active) {
            let poly_words = normalized_words(&format!("{} {}", poly.title, poly.description));
            for kalshi in kalshi_markets.iter().filter(|m| m.is_active) {
                let drift = (poly.end_date - kalshi.end_date).num_days().abs();
                if drift > MAX_END_DATE_DRIFT_DAYS {
                    continue;
                }
                let kalshi_words = normalized_words(&format!("{} {}", kalshi.title, kalshi.description));
                let similarity = jaccard_similarity(&poly_words, &kalshi_words);
                if similarity >= MIN_JACCARD_SIMILARITY {
                    scored.push((poly, kalshi, similarity));
                }
            }
        }
        scored.sort_by(|a, b| b.2.partial_cmp(&a.2).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(MAX_CANDIDATES);
        scored
    }

    /// Stage 2: run `verifier` over every candidate and store the pairs that
    /// clear `confidence >= 0.8`.
    pub async fn verify_and_store(
        &mut self,
        candidates: Vec<(&Market, &Market, f64)>,
        verifier: &dyn MarketVerifier,
    ) -> Result<usize> {
        let mut accepted = 0;
        for (poly, kalshi, similarity) in candidates {
            let outcome = verifier.verify(poly, kalshi, similarity).await?;
            if outcome.confidence < MIN_MATCH_CONFIDENCE || !outcome.is_match {
                continue;
            }
            let Some(poly_outcome) = find_outcome(poly, outcome.poly_is_yes) else { continue };
            let Some(kalshi_outcome) = find_outcome(kalshi, outcome.kalshi_is_yes) else { continue };

            let key = format!("{}:{}", poly.external_id, kalshi.external_id);
            self.pairs.insert(
                key.clone(),
                MarketPair {
                    key,
                    poly_market_id: poly.id.clone(),
                    kalshi_market_id: kalshi.id.clone(),
                    poly_outcome: poly_outcome.id.clone(),
                    kalshi_outcome: kalshi_outcome.id.clone(),
                    confidence: outcome.confidence,
                    active: true,
                },
            );
            accepted += 1;
        }
        Ok(accepted)
    }
}

fn find_outcome(market: &Market, is_yes: bool) -> Option<&crate::domain::Outcome> {
    market.outcomes.iter().find(|o| o.is_yes == is_yes)
}

fn normalized_words(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(|w| w.chars().filter(|c| c.is_alphanumeric()).collect::<String>())
        .filter(|w| !w.is_empty())
        .collect()
}

fn jaccard_similarity(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    intersection as f64 / union as f64
}

#[must_use]
pub fn days_apart(a: chrono::DateTime<chrono::Utc>, b: chrono::DateTime<chrono::Utc>) -> ChronoDuration {
    a - b
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MarketId, MarketStatus, Outcome, OutcomeId, Venue};
    use chrono::{Duration, Utc};
    use rust_decimal_macros::dec;

    fn market(venue: Venue, external_id: &str, title: &str, end_in_days: i64) -> Market {
        Market {
            id: MarketId::new(format!("{}:{}", venue.as_str(), external_id)),
            venue,
            external_id: external_id.into(),
            title: title.into(),
            description: String::new(),
            category: None,
            end_date: Utc::now() + Duration::days(end_in_days),
            outcomes: vec![
                Outcome {
                    id: OutcomeId::new("yes"),
                    external_id: "yes".into(),
                    name: "YES".into(),
                    is_yes: true,
                    probability: None,
                    best_bid: None,
                    best_ask: Some(dec!(0.5)),
                    bid_size: None,
                    ask_size: None,
                },
                Outcome {
                    id: OutcomeId::new("no"),
                    external_id: "no".into(),
                    name: "NO".into(),
                    is_yes: false,
                    probability: None,
                    best_bid: None,
                    best_ask: Some(dec!(0.5)),
                    bid_size: None,
                    ask_size: None,
                },
            ],
            volume_24h: dec!(0),
            liquidity: dec!(0),
            status: MarketStatus::Active,
            is_active: true,
        }
    }

    #[test]
    fn candidates_retains_similar_pairs_within_date_window() {
        let poly = vec![market(Venue::Polymarket, "p1", "Will the Fed cut rates in March", 10)];
        let kalshi = vec![market(Venue::Kalshi, "k1", "Will the Fed cut rates in March 2026", 11)];
        let candidates = MarketMatcher::candidates(&poly, &kalshi);
        assert_eq!(candidates.len(), 1);
        assert!(candidates[0].2 >= MIN_JACCARD_SIMILARITY);
    }

    #[test]
    fn candidates_drops_pairs_outside_date_window() {
        let poly = vec![market(Venue::Polymarket, "p1", "Will the Fed cut rates", 1)];
        let kalshi = vec![market(Venue::Kalshi, "k1", "Will the Fed cut rates", 30)];
        assert!(MarketMatcher::candidates(&poly, &kalshi).is_empty());
    }

    #[test]
    fn candidates_drops_dissimilar_titles() {
        let poly = vec![market(Venue::Polymarket, "p1", "Will it rain in Seattle", 5)];
        let kalshi = vec![market(Venue::Kalshi, "k1", "Will the Lakers win the championship", 5)];
        assert!(MarketMatcher::candidates(&poly, &kalshi).is_empty());
    }

    #[tokio::test]
    async fn verify_and_store_accepts_high_confidence_matches() {
        let poly = market(Venue::Polymarket, "p1", "Will the Fed cut rates", 5);
        let kalshi = market(Venue::Kalshi, "k1", "Will the Fed cut rates", 5);
        let candidates = vec![(&poly, &kalshi, 0.9)];
        let mut matcher = MarketMatcher::new();
        let verifier = HeuristicVerifier::default();
        let accepted = matcher.verify_and_store(candidates, &verifier).await.unwrap();
        assert_eq!(accepted, 1);
        assert_eq!(matcher.active_pairs().len(), 1);
    }

    #[test]
    fn deactivate_for_market_marks_pairs_inactive() {
        let mut matcher = MarketMatcher::new();
        let poly_id = MarketId::new("polymarket:p1");
        matcher.pairs.insert(
            "p1:k1".into(),
            MarketPair {
                key: "p1:k1".into(),
                poly_market_id: poly_id.clone(),
                kalshi_market_id: MarketId::new("kalshi:k1"),
                poly_outcome: OutcomeId::new("yes"),
                kalshi_outcome: OutcomeId::new("yes"),
                confidence: 0.9,
                active: true,
            },
        );
        matcher.deactivate_for_market(&poly_id);
        assert!(!matcher.pairs["p1:k1"].is_active());
    }
}
