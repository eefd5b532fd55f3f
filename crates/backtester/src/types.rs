// In crates/backtester/src/types.rs

use crate::{Error, Result};
use analytics::PerformanceReport;
use core_types::TradeRecord;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strategies::types::{MACrossoverSettings, WarmupPolicy};

/// Which signal rule drives the backtest ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalSource {
    /// Trade where `short > long` flips (position = level difference).
    #[default]
    Level,
    /// Trade on edge-triggered crosses, as the live stream does.
    Crossover,
}

fn default_short_window() -> usize {
    13
}

fn default_long_window() -> usize {
    48
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestSettings {
    /// Starting capital; held entirely in the quote asset.
    pub initial_quote_balance: Decimal,
    #[serde(default = "default_short_window")]
    pub short_window: usize,
    #[serde(default = "default_long_window")]
    pub long_window: usize,
    #[serde(default)]
    pub warmup: WarmupPolicy,
    #[serde(default)]
    pub signal_source: SignalSource,
}

impl BacktestSettings {
    pub fn new(initial_quote_balance: Decimal, short_window: usize, long_window: usize) -> Self {
        Self {
            initial_quote_balance,
            short_window,
            long_window,
            warmup: WarmupPolicy::Strict,
            signal_source: SignalSource::Level,
        }
    }

    pub fn strategy_settings(&self) -> MACrossoverSettings {
        MACrossoverSettings {
            short_window: self.short_window,
            long_window: self.long_window,
            warmup: self.warmup,
        }
    }

    /// Same settings with different windows. Used by the sweep.
    pub fn with_windows(&self, short_window: usize, long_window: usize) -> Self {
        Self {
            short_window,
            long_window,
            ..self.clone()
        }
    }
}

/// One row of the backtest table, after the candle has been applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationRow {
    pub timestamp: i64,
    pub close: Decimal,
    pub short_ma: Option<Decimal>,
    pub long_ma: Option<Decimal>,
    /// 1 while the short average is above the long one, else 0.
    pub level: u8,
    /// -1, 0 or +1.
    pub position_change: i8,
    pub quote_balance: Decimal,
    pub base_balance: Decimal,
    pub total_value: Decimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestResult {
    pub rows: Vec<ValuationRow>,
    pub trades: Vec<TradeRecord>,
    pub report: PerformanceReport,
}

impl BacktestResult {
    /// The rows where the position changed.
    pub fn position_changes(&self) -> Vec<&ValuationRow> {
        self.rows.iter().filter(|row| row.position_change != 0).collect()
    }
}

/// An inclusive `start..=end` range of window lengths walked in `step`s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamRange {
    pub start: usize,
    pub end: usize,
    #[serde(default = "default_step")]
    pub step: usize,
}

fn default_step() -> usize {
    1
}

impl ParamRange {
    pub fn new(start: usize, end: usize, step: usize) -> Self {
        Self { start, end, step }
    }

    pub fn values(&self) -> Result<Vec<usize>> {
        if self.step == 0 {
            return Err(Error::InvalidGrid("step must be greater than 0".to_string()));
        }
        if self.start > self.end {
            return Err(Error::InvalidGrid(format!(
                "range start ({}) is after its end ({})",
                self.start, self.end
            )));
        }
        Ok((self.start..=self.end).step_by(self.step).collect())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepGrid {
    pub short_window: ParamRange,
    pub long_window: ParamRange,
}

impl SweepGrid {
    /// Every `(short, long)` combination with `0 < short < long`.
    pub fn pairs(&self) -> Result<Vec<(usize, usize)>> {
        let shorts = self.short_window.values()?;
        let longs = self.long_window.values()?;
        let mut pairs = Vec::with_capacity(shorts.len() * longs.len());
        for &short in &shorts {
            for &long in &longs {
                if short > 0 && short < long {
                    pairs.push((short, long));
                } else {
                    tracing::debug!(short, long, "Skipping invalid window pair.");
                }
            }
        }
        Ok(pairs)
    }
}

/// The outcome of one backtest inside a sweep.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepOutcome {
    pub short_window: usize,
    pub long_window: usize,
    pub report: PerformanceReport,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_skips_pairs_without_short_below_long() {
        let grid = SweepGrid {
            short_window: ParamRange::new(2, 4, 1),
            long_window: ParamRange::new(3, 5, 2),
        };
        assert_eq!(grid.pairs().unwrap(), vec![(2, 3), (2, 5), (3, 5), (4, 5)]);
    }

    #[test]
    fn range_rejects_zero_step_and_reversed_bounds() {
        assert!(ParamRange::new(1, 5, 0).values().is_err());
        assert!(ParamRange::new(6, 5, 1).values().is_err());
        assert_eq!(ParamRange::new(5, 20, 5).values().unwrap(), vec![5, 10, 15, 20]);
    }

    #[test]
    fn settings_default_to_classic_windows() {
        let settings: BacktestSettings = toml::from_str("initial_quote_balance = 1000").unwrap();
        assert_eq!((settings.short_window, settings.long_window), (13, 48));
        assert_eq!(settings.signal_source, SignalSource::Level);
        assert_eq!(settings.warmup, WarmupPolicy::Strict);
    }
}
