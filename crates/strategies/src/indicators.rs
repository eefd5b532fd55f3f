// In crates/strategies/src/indicators.rs

use crate::types::WarmupPolicy;
use crate::{Error, Result};
use core_types::Candle;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, VecDeque};

/// Decimal places every published average is rounded to.
pub const MA_PRECISION: u32 = 3;

/// Fixed-capacity ring of the last `window` closes plus their running sum.
#[derive(Debug, Clone)]
struct RollingMean {
    window: usize,
    values: VecDeque<Decimal>,
    sum: Decimal,
}

impl RollingMean {
    fn new(window: usize) -> Self {
        Self {
            window,
            values: VecDeque::with_capacity(window),
            sum: Decimal::ZERO,
        }
    }

    fn push(&mut self, close: Decimal) {
        if self.values.len() == self.window {
            if let Some(evicted) = self.values.pop_front() {
                self.sum -= evicted;
            }
        }
        self.values.push_back(close);
        self.sum += close;
    }

    fn mean(&self) -> Option<Decimal> {
        if self.values.len() < self.window {
            return None;
        }
        Some(rounded_mean(self.sum, self.window))
    }

    fn partial_mean(&self) -> Option<Decimal> {
        if self.values.is_empty() {
            return None;
        }
        Some(rounded_mean(self.sum, self.values.len()))
    }

    fn clear(&mut self) {
        self.values.clear();
        self.sum = Decimal::ZERO;
    }
}

fn rounded_mean(sum: Decimal, count: usize) -> Decimal {
    (sum / Decimal::from(count)).round_dp(MA_PRECISION)
}

/// Maintains simple moving averages of the close for a set of window lengths.
///
/// Each update is O(1) per window: the evicted close is subtracted from the running
/// sum and the new one added, so cost does not grow with history.
#[derive(Debug, Clone)]
pub struct IndicatorEngine {
    means: BTreeMap<usize, RollingMean>,
    observed: usize,
}

impl IndicatorEngine {
    pub fn configure(windows: impl IntoIterator<Item = usize>) -> Result<Self> {
        let mut means = BTreeMap::new();
        for window in windows {
            if window == 0 {
                return Err(Error::InvalidWindow("window lengths must be positive".to_string()));
            }
            means.entry(window).or_insert_with(|| RollingMean::new(window));
        }
        if means.is_empty() {
            return Err(Error::InvalidWindow("at least one window length is required".to_string()));
        }
        Ok(Self { means, observed: 0 })
    }

    pub fn on_candle(&mut self, candle: &Candle) {
        self.on_close(candle.close);
    }

    pub fn on_close(&mut self, close: Decimal) {
        for mean in self.means.values_mut() {
            mean.push(close);
        }
        self.observed += 1;
    }

    /// The rounded mean of the last `window` closes, once that many have arrived.
    pub fn get(&self, window: usize) -> Option<Decimal> {
        self.means.get(&window).and_then(RollingMean::mean)
    }

    /// Like `get`, but averages over fewer closes while the window is still filling.
    pub fn get_partial(&self, window: usize) -> Option<Decimal> {
        self.means.get(&window).and_then(RollingMean::partial_mean)
    }

    pub fn value(&self, window: usize, warmup: WarmupPolicy) -> Option<Decimal> {
        match warmup {
            WarmupPolicy::Strict => self.get(window),
            WarmupPolicy::Partial => self.get_partial(window),
        }
    }

    pub fn windows(&self) -> impl Iterator<Item = usize> + '_ {
        self.means.keys().copied()
    }

    pub fn observed(&self) -> usize {
        self.observed
    }

    pub fn reset(&mut self) {
        self.means.values_mut().for_each(RollingMean::clear);
        self.observed = 0;
    }
}

/// The short and long averages at one candle. Either may still be undefined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MovingAverages {
    pub short: Option<Decimal>,
    pub long: Option<Decimal>,
}

impl MovingAverages {
    /// 1 when the short average sits strictly above the long one, otherwise 0.
    /// An undefined average compares as "not above".
    pub fn level(&self) -> u8 {
        match (self.short, self.long) {
            (Some(short), Some(long)) if short > long => 1,
            _ => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn feed(engine: &mut IndicatorEngine, closes: &[Decimal]) {
        closes.iter().for_each(|c| engine.on_close(*c));
    }

    #[test]
    fn configure_rejects_zero_and_empty() {
        assert!(matches!(IndicatorEngine::configure([3, 0]), Err(Error::InvalidWindow(_))));
        assert!(matches!(IndicatorEngine::configure(Vec::<usize>::new()), Err(Error::InvalidWindow(_))));
    }

    #[test]
    fn duplicate_windows_collapse() {
        let engine = IndicatorEngine::configure([5, 5, 2]).unwrap();
        assert_eq!(engine.windows().collect::<Vec<_>>(), vec![2, 5]);
    }

    #[test]
    fn undefined_until_window_fills() {
        let mut engine = IndicatorEngine::configure([3]).unwrap();
        feed(&mut engine, &[dec!(10), dec!(11)]);
        assert_eq!(engine.get(3), None);
        engine.on_close(dec!(12));
        assert_eq!(engine.get(3), Some(dec!(11)));
    }

    #[test]
    fn rolling_window_evicts_oldest() {
        let mut engine = IndicatorEngine::configure([3]).unwrap();
        feed(&mut engine, &[dec!(10), dec!(11), dec!(12), dec!(9)]);
        // (11 + 12 + 9) / 3 = 10.666.. -> 10.667
        assert_eq!(engine.get(3), Some(dec!(10.667)));
    }

    #[test]
    fn unconfigured_window_is_undefined() {
        let mut engine = IndicatorEngine::configure([2]).unwrap();
        feed(&mut engine, &[dec!(1), dec!(2), dec!(3)]);
        assert_eq!(engine.get(7), None);
    }

    #[test]
    fn partial_mean_averages_what_is_available() {
        let mut engine = IndicatorEngine::configure([4]).unwrap();
        assert_eq!(engine.get_partial(4), None);
        feed(&mut engine, &[dec!(10), dec!(20)]);
        assert_eq!(engine.get_partial(4), Some(dec!(15)));
        assert_eq!(engine.value(4, WarmupPolicy::Strict), None);
        assert_eq!(engine.value(4, WarmupPolicy::Partial), Some(dec!(15)));
    }

    #[test]
    fn rounding_is_half_to_even_at_three_places() {
        let mut engine = IndicatorEngine::configure([2]).unwrap();
        // 0.0005 rounds down to the even 0.000, 0.0015 rounds up to the even 0.002
        feed(&mut engine, &[dec!(0), dec!(0.001)]);
        assert_eq!(engine.get(2), Some(dec!(0.000)));
        engine.on_close(dec!(0.002));
        assert_eq!(engine.get(2), Some(dec!(0.002)));
    }

    #[test]
    fn reset_forgets_history() {
        let mut engine = IndicatorEngine::configure([2]).unwrap();
        feed(&mut engine, &[dec!(1), dec!(2)]);
        engine.reset();
        assert_eq!(engine.observed(), 0);
        assert_eq!(engine.get(2), None);
    }

    #[test]
    fn level_requires_both_averages() {
        let above = MovingAverages { short: Some(dec!(2)), long: Some(dec!(1)) };
        let equal = MovingAverages { short: Some(dec!(1)), long: Some(dec!(1)) };
        let warming = MovingAverages { short: Some(dec!(2)), long: None };
        assert_eq!(above.level(), 1);
        assert_eq!(equal.level(), 0);
        assert_eq!(warming.level(), 0);
    }
}
