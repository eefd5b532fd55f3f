// In crates/strategies/src/lib.rs

use core_types::{Candle, Signal};
pub mod error;
pub mod factory;
pub mod indicators;
pub mod ma_crossover;
pub mod ma_level;
pub mod types;

pub use error::{Error, Result};
pub use indicators::{IndicatorEngine, MovingAverages};

/// The universal interface for a trading strategy.
///
/// A strategy is fed one candle at a time, in arrival order, and produces a `Signal`.
/// It is a stateful entity: indicator buffers and the previous comparison state live
/// inside it between calls.
pub trait Strategy {
    /// The name of the strategy.
    fn name(&self) -> &'static str;

    fn assess(&mut self, candle: &Candle) -> Signal;

    /// The short/long averages as of the last assessed candle.
    fn averages(&self) -> MovingAverages;

    /// Drops all accumulated history, as if freshly constructed.
    fn reset(&mut self);
}
