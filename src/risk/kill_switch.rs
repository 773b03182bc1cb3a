//! The Kill Switch monitor: one-shot `Inactive -> Active` transition across
//! five trigger conditions, reset only by an explicit operator action.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KillSwitchTrigger {
    DailyLossLimit,
    DrawdownLimit,
    PositionLimit,
    ApiErrorRate,
    Manual,
}

#[derive(Debug, Clone)]
pub enum KillSwitchState {
    Inactive,
    Active { trigger: KillSwitchTrigger, reason: String, since: DateTime<Utc> },
}

impl KillSwitchState {
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self, Self::Active { .. })
    }
}

#[derive(Default)]
pub struct KillSwitch {
    state: RwLock<KillSwitchState>,
}

impl Default for KillSwitchState {
    fn default() -> Self {
        Self::Inactive
    }
}

impl KillSwitch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state.read().is_active()
    }

    #[must_use]
    pub fn snapshot(&self) -> KillSwitchState {
        self.state.read().clone()
    }

    /// Fires `trigger` with `reason` unless already active. Firing while
    /// already active updates nothing — the first trigger to fire wins and
    /// is the one an operator sees until `reset`.
    pub fn fire(&self, trigger: KillSwitchTrigger, reason: impl Into<String>, now: DateTime<Utc>) {
        let mut state = self.state.write();
        if state.is_active() {
            return;
        }
        *state = KillSwitchState::Active { trigger, reason: reason.into(), since: now };
    }

    /// Explicit `Active -> Inactive` transition. The only way out of the
    /// active state; no trigger condition clearing itself re-arms the switch.
    pub fn reset(&self) {
        *self.state.write() = KillSwitchState::Inactive;
    }
}
