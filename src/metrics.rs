//! Prometheus exposition (A4): installs the global `metrics` recorder and
//! renders its exposition text for [`crate::ops::OpsPort::metrics_text`].
//!
//! The label set matches what the venue clients and detectors already emit
//! ad hoc via `metrics::counter!`/`metrics::histogram!` — this module only
//! owns the recorder lifecycle and the one-time `describe_*` calls, it does
//! not wrap every call site in its own API.

use metrics_exporter_prometheus::PrometheusBuilder;

/// Installs the process-global Prometheus recorder and describes every
/// metric this crate emits, so `/metrics` text carries HELP/TYPE lines even
/// before the first observation. Call once at startup.
pub fn install() -> crate::error::Result<PrometheusHandle> {
    let builder = PrometheusBuilder::new();
    let handle = builder
        .install_recorder()
        .map_err(|error| crate::error::Error::Config(error.to_string()))?;

    metrics::describe_counter!("api_errors", "venue API call failures, labeled by venue and endpoint");
    metrics::describe_counter!("rate_limit_hits", "requests that had to wait for a rate limiter token");
    metrics::describe_counter!("arbitrage_opportunities", "arbitrage opportunities detected, labeled by kind");
    metrics::describe_counter!("arbitrage_executions", "arbitrage executions attempted, labeled by kind and status");
    metrics::describe_histogram!("arbitrage_profit_usd", "realized profit per arbitrage execution, in USD");
    metrics::describe_histogram!("order_latency_ms", "venue order-placement round-trip latency");

    Ok(PrometheusHandle { handle })
}

/// Thin wrapper so callers outside this module never need to name the
/// exporter crate directly.
pub struct PrometheusHandle {
    handle: metrics_exporter_prometheus::PrometheusHandle,
}

impl PrometheusHandle {
    #[must_use]
    pub fn render(&self) -> String {
        self.handle.render()
    }
}
