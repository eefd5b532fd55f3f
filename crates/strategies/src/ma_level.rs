// In crates/strategies/src/ma_level.rs

use crate::indicators::{IndicatorEngine, MovingAverages};
use crate::types::MACrossoverSettings;
use crate::{Result, Signal, Strategy};
use core_types::Candle;

/// Emits a signal only where the level `short > long ? 1 : 0` changes from the
/// previously emitted level. The first observation sets the level without a signal.
#[derive(Debug, Clone, Default)]
pub struct LevelTracker {
    prev_level: Option<u8>,
}

impl LevelTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_update(&mut self, averages: &MovingAverages) -> Signal {
        let level = averages.level();
        let signal = match self.prev_level {
            Some(prev) if prev != level => {
                if level == 1 {
                    Signal::GoLong
                } else {
                    Signal::GoShort
                }
            }
            _ => Signal::Hold,
        };
        self.prev_level = Some(level);
        signal
    }

    pub fn level(&self) -> Option<u8> {
        self.prev_level
    }

    pub fn reset(&mut self) {
        self.prev_level = None;
    }
}

/// Moving-average regime strategy: long while the short average is above the long one.
///
/// Pairs with the full-notional ledger in backtests, where the position should only
/// change on the rows where the regime flips.
#[derive(Debug, Clone)]
pub struct MALevel {
    settings: MACrossoverSettings,
    indicators: IndicatorEngine,
    tracker: LevelTracker,
    last: MovingAverages,
}

impl MALevel {
    pub fn new(settings: MACrossoverSettings) -> Result<Self> {
        settings.validate()?;
        Ok(Self {
            indicators: IndicatorEngine::configure([settings.short_window, settings.long_window])?,
            tracker: LevelTracker::new(),
            settings,
            last: MovingAverages::default(),
        })
    }
}

impl Strategy for MALevel {
    fn name(&self) -> &'static str {
        "MALevel"
    }

    fn assess(&mut self, candle: &Candle) -> Signal {
        self.indicators.on_candle(candle);
        self.last = MovingAverages {
            short: self.indicators.value(self.settings.short_window, self.settings.warmup),
            long: self.indicators.value(self.settings.long_window, self.settings.warmup),
        };
        self.tracker.on_update(&self.last)
    }

    fn averages(&self) -> MovingAverages {
        self.last
    }

    fn reset(&mut self) {
        self.indicators.reset();
        self.tracker.reset();
        self.last = MovingAverages::default();
    }
}
