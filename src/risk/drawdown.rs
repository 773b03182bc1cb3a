//! Drawdown Monitor: ratchets a high-water-mark on equity and reports the
//! current retracement from it.

use parking_lot::RwLock;
use rust_decimal::Decimal;

struct State {
    peak: Decimal,
    equity: Decimal,
}

pub struct DrawdownMonitor {
    state: RwLock<State>,
}

impl Default for DrawdownMonitor {
    fn default() -> Self {
        Self { state: RwLock::new(State { peak: Decimal::ZERO, equity: Decimal::ZERO }) }
    }
}

impl DrawdownMonitor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `equity = cash + sum(position.size * position.current_price)`,
    /// ratcheting the high-water-mark forward when it's a new peak.
    pub fn record_equity(&self, equity: Decimal) {
        let mut state = self.state.write();
        state.equity = equity;
        if equity > state.peak {
            state.peak = equity;
        }
    }

    #[must_use]
    pub fn current_drawdown(&self) -> Decimal {
        let state = self.state.read();
        if state.peak <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        ((state.peak - state.equity) / state.peak).max(Decimal::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn drawdown_is_zero_at_new_peak() {
        let monitor = DrawdownMonitor::new();
        monitor.record_equity(dec!(1000));
        assert_eq!(monitor.current_drawdown(), dec!(0));
    }

    #[test]
    fn drawdown_reflects_retracement_from_peak() {
        let monitor = DrawdownMonitor::new();
        monitor.record_equity(dec!(1000));
        monitor.record_equity(dec!(900));
        assert_eq!(monitor.current_drawdown(), dec!(0.1));
    }

    #[test]
    fn peak_does_not_move_down_on_a_later_dip() {
        let monitor = DrawdownMonitor::new();
        monitor.record_equity(dec!(1000));
        monitor.record_equity(dec!(800));
        monitor.record_equity(dec!(950));
        assert_eq!(monitor.current_drawdown(), dec!(0.05));
    }
}
