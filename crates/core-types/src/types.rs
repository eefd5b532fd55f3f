// In crates/core-types/src/types.rs

use crate::{Error, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A trading pair identifier (e.g., "BTCUSDT").
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Symbol(pub String);

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Symbol {
    fn from(value: &str) -> Self {
        Symbol(value.to_string())
    }
}

/// A fixed-interval OHLCV summary for one pair. Only `close` feeds the indicators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Bar open time in epoch milliseconds.
    pub timestamp: i64,
    pub symbol: Symbol,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
}

impl Candle {
    /// Builds a candle whose OHLC fields all equal `close`. Historical rows only carry a close.
    pub fn from_close(symbol: Symbol, timestamp: i64, close: Decimal) -> Self {
        Self {
            timestamp,
            symbol,
            open: close,
            high: close,
            low: close,
            close,
            volume: Decimal::ZERO,
        }
    }
}

/// A raw candle event as delivered by a feed adapter. Prices are still decimal strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandleEvent {
    pub timestamp: i64,
    pub symbol: String,
    pub open: String,
    pub high: String,
    pub low: String,
    pub close: String,
    pub volume: String,
    /// Whether the bar is closed. Feeds that cannot tell leave this empty.
    #[serde(default)]
    pub is_final: Option<bool>,
}

impl CandleEvent {
    /// Parses and validates every field. Nothing downstream sees the event unless this succeeds.
    pub fn to_candle(&self) -> Result<Candle> {
        if self.symbol.trim().is_empty() {
            return Err(Error::InputFormat("candle event has an empty symbol".to_string()));
        }
        let parse = |field: &str, raw: &str| -> Result<Decimal> {
            Decimal::from_str(raw.trim()).map_err(|e| {
                Error::InputFormat(format!("field `{field}` = {raw:?} is not a decimal: {e}"))
            })
        };
        let candle = Candle {
            timestamp: self.timestamp,
            symbol: Symbol(self.symbol.clone()),
            open: parse("open", &self.open)?,
            high: parse("high", &self.high)?,
            low: parse("low", &self.low)?,
            close: parse("close", &self.close)?,
            volume: parse("volume", &self.volume)?,
        };
        validate_close(candle.close)?;
        if candle.volume < Decimal::ZERO {
            return Err(Error::InputFormat(format!(
                "volume must not be negative, got {}",
                candle.volume
            )));
        }
        Ok(candle)
    }
}

/// Largest close a candle may carry (10^15). Window sums and notional products stay far
/// inside the `Decimal` range below it.
pub const MAX_PRICE: Decimal = Decimal::from_parts(0xA4C6_8000, 0x0003_8D7E, 0, false, 0);

/// Accepts closes in `(0, MAX_PRICE]`.
pub fn validate_close(close: Decimal) -> Result<()> {
    if close <= Decimal::ZERO {
        return Err(Error::InputFormat(format!("close price must be positive, got {close}")));
    }
    if close > MAX_PRICE {
        return Err(Error::InputFormat(format!("close price {close} exceeds the maximum of {MAX_PRICE}")));
    }
    Ok(())
}

/// The direction of an executed ledger mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// Quote converted into base.
    Buy,
    /// Base converted into quote.
    Sell,
}

/// A crossover signal. Numerically +1 / -1 / 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Signal {
    /// Golden cross: the short average moved above the long one.
    GoLong,
    /// Death cross: the short average moved below the long one.
    GoShort,
    /// No edge on this candle.
    #[default]
    Hold,
}

impl Signal {
    pub fn value(self) -> i8 {
        match self {
            Signal::GoLong => 1,
            Signal::GoShort => -1,
            Signal::Hold => 0,
        }
    }

    /// The ledger direction this signal trades in, if any.
    pub fn side(self) -> Option<Side> {
        match self {
            Signal::GoLong => Some(Side::Buy),
            Signal::GoShort => Some(Side::Sell),
            Signal::Hold => None,
        }
    }

    pub fn is_hold(self) -> bool {
        matches!(self, Signal::Hold)
    }
}

/// Immutable record of one executed ledger mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub timestamp: i64,
    pub symbol: Symbol,
    pub direction: Side,
    pub signal: Signal,
    pub price: Decimal,
    pub quote_delta: Decimal,
    pub base_delta: Decimal,
    pub quote_balance_after: Decimal,
    pub base_balance_after: Decimal,
}

/// A consistent view of the portfolio at one instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationSnapshot {
    pub timestamp: i64,
    pub quote_balance: Decimal,
    pub base_balance: Decimal,
    /// The mark price used for `total_value`.
    pub price: Decimal,
    pub total_value: Decimal,
}
