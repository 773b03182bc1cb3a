//! Risk Core (C12): kill switch, position limits, exposure tracker, and
//! drawdown monitor, wired together into one periodic check.

pub mod api_errors;
pub mod drawdown;
pub mod exposure;
pub mod kill_switch;
pub mod limits;

use std::time::Duration as StdDuration;

use chrono::Utc;
use rust_decimal::Decimal;

use crate::config::risk::RiskConfig;
use crate::domain::{MarketId, OutcomeId, Venue};
use crate::error::Result;

pub use api_errors::ApiErrorTracker;
pub use drawdown::DrawdownMonitor;
pub use exposure::ExposureTracker;
pub use kill_switch::{KillSwitch, KillSwitchState, KillSwitchTrigger};
pub use limits::PositionLimits;

/// Daily realized P&L, rolled over at UTC midnight by the caller (the
/// Trading Engine's scan loop observes the date change and calls
/// [`RiskCore::roll_daily_pnl`]).
#[derive(Default)]
pub struct RiskCore {
    pub kill_switch: KillSwitch,
    pub exposure: ExposureTracker,
    pub drawdown: DrawdownMonitor,
    pub api_errors: ApiErrorTracker,
    daily_pnl: parking_lot::Mutex<Decimal>,
    config: RiskConfig,
}

impl RiskCore {
    #[must_use]
    pub fn new(config: RiskConfig) -> Self {
        Self { config, ..Self::default() }
    }

    #[must_use]
    pub fn is_halted(&self) -> bool {
        self.kill_switch.is_active()
    }

    #[must_use]
    pub fn config(&self) -> &RiskConfig {
        &self.config
    }

    pub fn record_realized_pnl(&self, delta: Decimal) {
        *self.daily_pnl.lock() += delta;
    }

    #[must_use]
    pub fn daily_pnl(&self) -> Decimal {
        *self.daily_pnl.lock()
    }

    pub fn roll_daily_pnl(&self) {
        *self.daily_pnl.lock() = Decimal::ZERO;
    }

    /// Pre-write check the Order Manager runs before every placement:
    /// kill switch first, then position limits.
    pub fn admit_order(&self, market_id: &MarketId, outcome_id: &OutcomeId, additional_exposure: Decimal) -> Result<()> {
        if self.is_halted() {
            return Err(crate::error::Error::KillSwitchActive(self.halt_reason()));
        }
        PositionLimits::new(&self.config).check(&self.exposure, market_id, outcome_id, additional_exposure)
    }

    fn halt_reason(&self) -> String {
        match self.kill_switch.snapshot() {
            KillSwitchState::Active { reason, .. } => reason,
            KillSwitchState::Inactive => String::new(),
        }
    }

    /// Evaluates every trigger against current state, firing the kill
    /// switch on the first one that crosses its threshold. Intended to run
    /// on `config.check_interval_ms` cadence.
    pub fn check(&self) {
        let now = Utc::now();
        if self.daily_pnl() <= -self.config.max_daily_loss {
            self.kill_switch.fire(KillSwitchTrigger::DailyLossLimit, format!("daily pnl {} breached -{}", self.daily_pnl(), self.config.max_daily_loss), now);
        }
        let drawdown = self.drawdown.current_drawdown();
        if drawdown >= self.config.max_drawdown_pct {
            self.kill_switch.fire(KillSwitchTrigger::DrawdownLimit, format!("drawdown {drawdown} >= {}", self.config.max_drawdown_pct), now);
        }
        if self.exposure.total_exposure() >= self.config.max_total_exposure {
            self.kill_switch.fire(KillSwitchTrigger::PositionLimit, format!("total exposure {} >= {}", self.exposure.total_exposure(), self.config.max_total_exposure), now);
        }
        let window = chrono::Duration::seconds(self.config.api_error_window_secs as i64);
        let error_rate = self.api_errors.error_rate(window, now);
        if error_rate >= self.config.max_api_error_rate {
            self.kill_switch.fire(KillSwitchTrigger::ApiErrorRate, format!("api error rate {error_rate} >= {}", self.config.max_api_error_rate), now);
        }
    }

    pub fn trigger_manual(&self, reason: impl Into<String>) {
        self.kill_switch.fire(KillSwitchTrigger::Manual, reason, Utc::now());
    }

    #[must_use]
    pub const fn check_interval(&self) -> StdDuration {
        StdDuration::from_millis(self.config.check_interval_ms)
    }
}

/// Runs [`RiskCore::check`] on `config.check_interval_ms` cadence until the
/// channel closes.
pub async fn run_monitor(core: std::sync::Arc<RiskCore>, mut shutdown: tokio::sync::oneshot::Receiver<()>) {
    let mut ticker = tokio::time::interval(core.check_interval());
    loop {
        tokio::select! {
            _ = ticker.tick() => core.check(),
            _ = &mut shutdown => break,
        }
    }
}
