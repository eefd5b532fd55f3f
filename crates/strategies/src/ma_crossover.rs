// In crates/strategies/src/ma_crossover.rs

use crate::indicators::{IndicatorEngine, MovingAverages};
use crate::types::MACrossoverSettings;
use crate::{Error, Result, Signal, Strategy};
use core_types::Candle;
use rust_decimal::Decimal;

/// Edge-triggered comparison of a short and a long average against their previous values.
#[derive(Debug, Clone)]
pub struct SignalDetector {
    short_window: usize,
    long_window: usize,
    prev_short: Option<Decimal>,
    prev_long: Option<Decimal>,
}

impl SignalDetector {
    pub fn new(short_window: usize, long_window: usize) -> Result<Self> {
        if short_window == 0 || short_window >= long_window {
            return Err(Error::InvalidWindow(format!(
                "short window ({short_window}) must be positive and less than long window ({long_window})"
            )));
        }
        Ok(Self {
            short_window,
            long_window,
            prev_short: None,
            prev_long: None,
        })
    }

    pub fn short_window(&self) -> usize {
        self.short_window
    }

    pub fn long_window(&self) -> usize {
        self.long_window
    }

    /// Returns the crossover signal for the current pair and remembers it for the next call.
    pub fn on_update(&mut self, short_ma: Option<Decimal>, long_ma: Option<Decimal>) -> Signal {
        let signal = match (short_ma, long_ma, self.prev_short, self.prev_long) {
            (Some(short), Some(long), Some(prev_short), Some(prev_long)) => {
                if short > long && prev_short <= prev_long {
                    // Golden cross: short line just crossed above the long line.
                    Signal::GoLong
                } else if short < long && prev_short >= prev_long {
                    // Death cross: short line just crossed below the long line.
                    Signal::GoShort
                } else {
                    Signal::Hold
                }
            }
            _ => Signal::Hold,
        };

        self.prev_short = short_ma;
        self.prev_long = long_ma;
        signal
    }

    pub fn reset(&mut self) {
        self.prev_short = None;
        self.prev_long = None;
    }
}

/// The stateful struct for the moving-average crossover strategy.
#[derive(Debug, Clone)]
pub struct MACrossover {
    /// The configuration for this strategy instance.
    settings: MACrossoverSettings,
    indicators: IndicatorEngine,
    detector: SignalDetector,
    /// Averages as of the last assessed candle.
    last: MovingAverages,
}

impl MACrossover {
    /// Creates a new `MACrossover` strategy instance from its settings.
    pub fn new(settings: MACrossoverSettings) -> Result<Self> {
        settings.validate()?;
        Ok(Self {
            indicators: IndicatorEngine::configure([settings.short_window, settings.long_window])?,
            detector: SignalDetector::new(settings.short_window, settings.long_window)?,
            settings,
            last: MovingAverages::default(),
        })
    }

    pub fn settings(&self) -> &MACrossoverSettings {
        &self.settings
    }
}

impl Strategy for MACrossover {
    fn name(&self) -> &'static str {
        "MACrossover"
    }

    fn assess(&mut self, candle: &Candle) -> Signal {
        self.indicators.on_candle(candle);
        self.last = MovingAverages {
            short: self.indicators.value(self.settings.short_window, self.settings.warmup),
            long: self.indicators.value(self.settings.long_window, self.settings.warmup),
        };
        self.detector.on_update(self.last.short, self.last.long)
    }

    fn averages(&self) -> MovingAverages {
        self.last
    }

    fn reset(&mut self) {
        self.indicators.reset();
        self.detector.reset();
        self.last = MovingAverages::default();
    }
}
