// In crates/core-types/src/lib.rs

pub mod error;
pub mod series;
pub mod strategy;
pub mod types;

// Re-export the most important types for easy access from other crates.
pub use error::{Error, Result};
pub use series::CandleSeries;
pub use strategy::StrategyConfig;
pub use types::{
    Candle, CandleEvent, MAX_PRICE, Side, Signal, Symbol, TradeRecord, ValuationSnapshot, validate_close,
};
