//! Central error taxonomy.
//!
//! Every fallible operation in the crate returns [`Result`]. The variants
//! correspond to the error kinds enumerated by the design: transport errors
//! retry locally, authentication/validation/rejection surface immediately,
//! and a handful of kinds (`KillSwitchActive`, `LimitExceeded`, ...) are
//! produced only by the risk core and executors.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Network/timeout failure. Recovered locally via retry with backoff.
    #[error("transport error: {0}")]
    Transport(String),

    /// Venue rejected credentials or a signature. Fatal for that venue.
    #[error("authentication failed for {venue}: {reason}")]
    Authentication { venue: String, reason: String },

    /// 429 or equivalent; recovered locally by waiting on the rate limiter.
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// The rate limiter's wait queue timed out before tokens were available.
    #[error("rate limiter timeout after {0:?}")]
    RateLimitTimeout(std::time::Duration),

    /// The rate limiter was reset while callers were waiting.
    #[error("rate limiter reset")]
    RateLimiterReset,

    /// Malformed client input. No retry.
    #[error("validation error: {0}")]
    Validation(String),

    /// Venue refused the order with a reason string.
    #[error("order rejected by {venue}: {reason}")]
    Rejected { venue: String, reason: String },

    /// Recognized by the arbitrage executor; not a failure per se, triggers unwind.
    #[error("partial fill: {filled}/{requested} legs filled")]
    PartialFill { filled: usize, requested: usize },

    /// The kill switch is active; all new orders are refused.
    #[error("kill switch active: {0}")]
    KillSwitchActive(String),

    /// A risk-core position/exposure cap was exceeded.
    #[error("limit exceeded: {0}")]
    LimitExceeded(String),

    /// The signal's `expires_at` has already passed.
    #[error("signal expired")]
    SignalExpired,

    /// An execution for this signal id is already in flight.
    #[error("duplicate execution for signal {0}")]
    DuplicateExecution(String),

    /// A cached quote exceeded its freshness TTL; treat as unknown.
    #[error("stale data for {0}")]
    DataStale(String),

    /// The requested entity does not exist at the venue.
    #[error("not found: {0}")]
    NotFound(String),

    /// The order/opportunity is already in a terminal state.
    #[error("already terminal")]
    AlreadyTerminal,

    /// An arbitrage/signal execution was already in progress.
    #[error("execution already in progress")]
    ExecutionInProgress,

    /// Configuration failed to load or validate.
    #[error("configuration error: {0}")]
    Config(String),

    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("url parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),

    #[error("database pool error: {0}")]
    Pool(String),

    #[error("signing error: {0}")]
    Signing(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// True for kinds that C2's retry-with-backoff wrapper should retry.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Transport(_) | Self::WebSocket(_) | Self::Http(_) | Self::Io(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_errors_are_retryable() {
        assert!(Error::Transport("timeout".into()).is_retryable());
    }

    #[test]
    fn validation_errors_are_not_retryable() {
        assert!(!Error::Validation("bad price".into()).is_retryable());
    }

    #[test]
    fn kill_switch_is_not_retryable() {
        assert!(!Error::KillSwitchActive("daily loss".into()).is_retryable());
    }
}
