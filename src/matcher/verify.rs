//! Stage-2 verification: confirms a Jaccard candidate is really the same
//! underlying event on both venues and picks out which side is `YES`.

use async_trait::async_trait;

use crate::domain::Market;
use crate::error::Result;

/// Structured verdict a verifier returns for one candidate pair.
#[derive(Debug, Clone, Copy)]
pub struct VerificationOutcome {
    pub is_match: bool,
    pub confidence: f64,
    pub poly_is_yes: bool,
    pub kalshi_is_yes: bool,
}

/// Pluggable stage-2 verifier. An LLM-backed implementation returning the
/// same structured `{isMatch, confidence, polyOutcome, kalshiOutcome}` shape
/// plugs in here without the matcher knowing the difference; when no such
/// verifier is configured, [`HeuristicVerifier`] is the fallback.
#[async_trait]
pub trait MarketVerifier: Send + Sync {
    async fn verify(&self, poly: &Market, kalshi: &Market, jaccard_similarity: f64) -> Result<VerificationOutcome>;
}

const PATTERN_BONUS: f64 = 0.1;
const DATE_PROXIMITY_BONUS_MAX: f64 = 0.1;
const CONFIDENCE_CAP: f64 = 0.95;

/// Jaccard + light pattern matching ("Will X win", "X by YYYY", "Price of
/// X") + a date-proximity bonus, capped at 0.95 since it never claims
/// certainty the way a verified LLM match can.
#[derive(Debug, Default)]
pub struct HeuristicVerifier;

#[async_trait]
impl MarketVerifier for HeuristicVerifier {
    async fn verify(&self, poly: &Market, kalshi: &Market, jaccard_similarity: f64) -> Result<VerificationOutcome> {
        let mut score = jaccard_similarity;

        if shares_pattern(&poly.title, &kalshi.title) {
            score += PATTERN_BONUS;
        }

        let drift_days = (poly.end_date - kalshi.end_date).num_days().unsigned_abs();
        let proximity_bonus = DATE_PROXIMITY_BONUS_MAX * (1.0 - (drift_days as f64 / 7.0).min(1.0));
        score += proximity_bonus;

        let confidence = score.min(CONFIDENCE_CAP);
        Ok(VerificationOutcome {
            is_match: confidence >= 0.8,
            confidence,
            poly_is_yes: true,
            kalshi_is_yes: true,
        })
    }
}

const PATTERNS: [&str; 3] = ["will ", " by 20", "price of "];

fn shares_pattern(a: &str, b: &str) -> bool {
    let (a, b) = (a.to_lowercase(), b.to_lowercase());
    PATTERNS.iter().any(|p| a.contains(p) && b.contains(p))
}
