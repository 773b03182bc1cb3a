//! Price History / Stats (C5): a bounded ring buffer per outcome and the
//! derived statistics strategies (C8) read off it.

use std::collections::{HashMap, VecDeque};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::domain::{MarketId, OutcomeId};

const DEFAULT_CAPACITY: usize = 500;
const VOLUME_SPIKE_WINDOW: usize = 20;
const VOLUME_SPIKE_MULTIPLE: f64 = 2.0;

#[derive(Debug, Clone, Copy)]
pub struct Sample {
    pub timestamp: DateTime<Utc>,
    pub price: Decimal,
    pub volume: Option<Decimal>,
}

/// `Up`/`Down` require the short SMA to have crossed the long SMA by more
/// than the hysteresis band; otherwise the trend holds at `Neutral`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Up,
    Down,
    Neutral,
}

/// Derived statistics for one outcome's price history. Fields are `None`
/// when fewer than the required sample count exist ("insufficient").
#[derive(Debug, Clone, Default)]
pub struct PriceStats {
    pub sma_5: Option<Decimal>,
    pub sma_20: Option<Decimal>,
    pub vwap: Option<Decimal>,
    pub rsi_14: Option<Decimal>,
    pub momentum: Option<Decimal>,
    pub change_percent: Option<Decimal>,
    pub trend: Option<Trend>,
    pub volume_spike: bool,
    pub sample_count: usize,
}

struct OutcomeSeries {
    capacity: usize,
    samples: VecDeque<Sample>,
}

impl OutcomeSeries {
    fn new(capacity: usize) -> Self {
        Self { capacity, samples: VecDeque::with_capacity(capacity) }
    }

    fn push(&mut self, sample: Sample) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }
}

/// Owns one ring buffer per `(marketId, outcomeId)` behind a single
/// `parking_lot::RwLock` — accounting only happens inside the guard, never
/// across an await.
pub struct PriceHistory {
    capacity: usize,
    series: RwLock<HashMap<(MarketId, OutcomeId), OutcomeSeries>>,
}

impl Default for PriceHistory {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl PriceHistory {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self { capacity, series: RwLock::new(HashMap::new()) }
    }

    pub fn record(&self, market_id: &MarketId, outcome_id: &OutcomeId, price: Decimal, volume: Option<Decimal>, at: DateTime<Utc>) {
        let mut guard = self.series.write();
        let key = (market_id.clone(), outcome_id.clone());
        let series = guard.entry(key).or_insert_with(|| OutcomeSeries::new(self.capacity));
        series.push(Sample { timestamp: at, price, volume });
    }

    #[must_use]
    pub fn sample_count(&self, market_id: &MarketId, outcome_id: &OutcomeId) -> usize {
        self.series
            .read()
            .get(&(market_id.clone(), outcome_id.clone()))
            .map_or(0, |s| s.samples.len())
    }

    #[must_use]
    pub fn stats(&self, market_id: &MarketId, outcome_id: &OutcomeId) -> PriceStats {
        let guard = self.series.read();
        let Some(series) = guard.get(&(market_id.clone(), outcome_id.clone())) else {
            return PriceStats::default();
        };
        compute_stats(&series.samples)
    }
}

fn compute_stats(samples: &VecDeque<Sample>) -> PriceStats {
    let n = samples.len();
    let prices: Vec<Decimal> = samples.iter().map(|s| s.price).collect();

    let sma_5 = sma(&prices, 5);
    let sma_20 = sma(&prices, 20);
    let vwap = vwap(samples, samples.len().min(20));
    let rsi_14 = rsi(&prices, 14);
    let momentum = momentum(&prices, 10);
    let change_percent = change_percent(&prices, 10);
    let trend = sma_5.zip(sma_20).map(|(short, long)| {
        let hysteresis = Decimal::new(2, 3); // 0.002
        if short - long > hysteresis {
            Trend::Up
        } else if long - short > hysteresis {
            Trend::Down
        } else {
            Trend::Neutral
        }
    });
    let volume_spike = volume_spike(samples);

    PriceStats { sma_5, sma_20, vwap, rsi_14, momentum, change_percent, trend, volume_spike, sample_count: n }
}

fn sma(prices: &[Decimal], n: usize) -> Option<Decimal> {
    if prices.len() < n || n == 0 {
        return None;
    }
    let window = &prices[prices.len() - n..];
    let sum: Decimal = window.iter().copied().sum();
    Some(sum / Decimal::from(n))
}

fn vwap(samples: &VecDeque<Sample>, window: usize) -> Option<Decimal> {
    if window == 0 || samples.len() < window {
        return None;
    }
    let slice: Vec<&Sample> = samples.iter().rev().take(window).collect();
    let mut notional = Decimal::ZERO;
    let mut volume = Decimal::ZERO;
    for sample in &slice {
        let v = sample.volume.unwrap_or(Decimal::ONE);
        notional += sample.price * v;
        volume += v;
    }
    if volume.is_zero() {
        return None;
    }
    Some(notional / volume)
}

/// Wilder's smoothed RSI, bounded to `[0, 100]`.
fn rsi(prices: &[Decimal], n: usize) -> Option<Decimal> {
    if prices.len() < n + 1 {
        return None;
    }
    let window = &prices[prices.len() - n - 1..];
    let mut gain_sum = Decimal::ZERO;
    let mut loss_sum = Decimal::ZERO;
    for pair in window.windows(2) {
        let delta = pair[1] - pair[0];
        if delta > Decimal::ZERO {
            gain_sum += delta;
        } else {
            loss_sum += -delta;
        }
    }
    let avg_gain = gain_sum / Decimal::from(n);
    let avg_loss = loss_sum / Decimal::from(n);
    if avg_loss.is_zero() {
        return Some(Decimal::from(100));
    }
    let rs = avg_gain / avg_loss;
    let hundred = Decimal::from(100);
    let rsi = hundred - (hundred / (Decimal::ONE + rs));
    Some(rsi.clamp(Decimal::ZERO, hundred))
}

/// Signed, normalized slope over the trailing `n` samples: `(last - first) /
/// first`, scaled to a per-sample rate.
fn momentum(prices: &[Decimal], n: usize) -> Option<Decimal> {
    if prices.len() < n || n < 2 {
        return None;
    }
    let window = &prices[prices.len() - n..];
    let first = window[0];
    let last = *window.last().unwrap();
    if first.is_zero() {
        return None;
    }
    Some((last - first) / first / Decimal::from(n - 1))
}

fn change_percent(prices: &[Decimal], n: usize) -> Option<Decimal> {
    if prices.len() < n || n == 0 {
        return None;
    }
    let window = &prices[prices.len() - n..];
    let first = window[0];
    let last = *window.last().unwrap();
    if first.is_zero() {
        return None;
    }
    Some((last - first) / first * Decimal::from(100))
}

/// True when the most recent sample's volume exceeds `2x` the median of the
/// trailing 20-sample window.
fn volume_spike(samples: &VecDeque<Sample>) -> bool {
    if samples.len() < VOLUME_SPIKE_WINDOW + 1 {
        return false;
    }
    let latest = match samples.back().and_then(|s| s.volume) {
        Some(v) => v,
        None => return false,
    };
    let mut window: Vec<f64> = samples
        .iter()
        .rev()
        .skip(1)
        .take(VOLUME_SPIKE_WINDOW)
        .filter_map(|s| s.volume)
        .filter_map(|d| d.to_f64())
        .collect();
    if window.len() < VOLUME_SPIKE_WINDOW {
        return false;
    }
    window.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let median = window[window.len() / 2];
    if median <= 0.0 {
        return false;
    }
    latest.to_f64().unwrap_or(0.0) > median * VOLUME_SPIKE_MULTIPLE
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn history() -> (PriceHistory, MarketId, OutcomeId) {
        (PriceHistory::new(50), MarketId::new("m1"), OutcomeId::new("yes"))
    }

    #[test]
    fn insufficient_samples_yield_none_stats() {
        let (history, market, outcome) = history();
        history.record(&market, &outcome, dec!(0.5), None, Utc::now());
        let stats = history.stats(&market, &outcome);
        assert!(stats.sma_5.is_none());
        assert!(stats.rsi_14.is_none());
    }

    #[test]
    fn sma_5_averages_last_five_samples() {
        let (history, market, outcome) = history();
        for price in [dec!(0.40), dec!(0.42), dec!(0.44), dec!(0.46), dec!(0.48)] {
            history.record(&market, &outcome, price, None, Utc::now());
        }
        let stats = history.stats(&market, &outcome);
        assert_eq!(stats.sma_5, Some(dec!(0.44)));
    }

    #[test]
    fn rsi_is_100_when_all_gains() {
        let (history, market, outcome) = history();
        for i in 0..20 {
            history.record(&market, &outcome, dec!(0.30) + Decimal::from(i) * dec!(0.01), None, Utc::now());
        }
        let stats = history.stats(&market, &outcome);
        assert_eq!(stats.rsi_14, Some(dec!(100)));
    }

    #[test]
    fn rsi_bounds_to_0_100_on_all_losses() {
        let (history, market, outcome) = history();
        for i in 0..20 {
            history.record(&market, &outcome, dec!(0.90) - Decimal::from(i) * dec!(0.01), None, Utc::now());
        }
        let stats = history.stats(&market, &outcome);
        assert_eq!(stats.rsi_14, Some(dec!(0)));
    }

    #[test]
    fn ring_buffer_evicts_oldest_beyond_capacity() {
        let history = PriceHistory::new(3);
        let market = MarketId::new("m1");
        let outcome = OutcomeId::new("yes");
        for price in [dec!(0.1), dec!(0.2), dec!(0.3), dec!(0.4)] {
            history.record(&market, &outcome, price, None, Utc::now());
        }
        assert_eq!(history.sample_count(&market, &outcome), 3);
    }

    #[test]
    fn volume_spike_detects_more_than_double_median() {
        let (history, market, outcome) = history();
        for _ in 0..20 {
            history.record(&market, &outcome, dec!(0.5), Some(dec!(10)), Utc::now());
        }
        history.record(&market, &outcome, dec!(0.5), Some(dec!(100)), Utc::now());
        let stats = history.stats(&market, &outcome);
        assert!(stats.volume_spike);
    }

    #[test]
    fn trend_up_requires_sma_crossover_beyond_hysteresis() {
        let (history, market, outcome) = history();
        for i in 0..20 {
            history.record(&market, &outcome, dec!(0.30) + Decimal::from(i) * dec!(0.01), None, Utc::now());
        }
        let stats = history.stats(&market, &outcome);
        assert_eq!(stats.trend, Some(Trend::Up));
    }
}
