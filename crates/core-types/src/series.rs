// In crates/core-types/src/series.rs

use crate::{Candle, Error, Result, Symbol};
use rust_decimal::Decimal;
use std::collections::VecDeque;

/// Append-only, time-ordered store of candles for a single pair.
///
/// Only the most recent `capacity` candles are retained as the working window, but
/// every candle keeps the absolute index it was appended at, so `close_at(i)` stays
/// meaningful for the whole session.
#[derive(Debug, Clone)]
pub struct CandleSeries {
    symbol: Symbol,
    capacity: usize,
    window: VecDeque<Candle>,
    /// Total number of candles ever appended.
    appended: usize,
    last_timestamp: Option<i64>,
}

impl CandleSeries {
    /// Creates an empty series. `capacity` is clamped to at least one candle.
    pub fn new(symbol: Symbol, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            symbol,
            capacity,
            window: VecDeque::with_capacity(capacity),
            appended: 0,
            last_timestamp: None,
        }
    }

    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Appends a candle. Fails without touching the series if the timestamp does not
    /// strictly advance or the candle belongs to another pair.
    pub fn append(&mut self, candle: Candle) -> Result<()> {
        if candle.symbol != self.symbol {
            return Err(Error::InputFormat(format!(
                "candle for {} cannot be appended to the {} series",
                candle.symbol, self.symbol
            )));
        }
        if let Some(last_timestamp) = self.last_timestamp {
            if candle.timestamp <= last_timestamp {
                return Err(Error::OutOfOrder {
                    symbol: self.symbol.0.clone(),
                    timestamp: candle.timestamp,
                    last_timestamp,
                });
            }
        }

        if self.window.len() == self.capacity {
            self.window.pop_front();
        }
        self.last_timestamp = Some(candle.timestamp);
        self.window.push_back(candle);
        self.appended += 1;
        Ok(())
    }

    /// Close of the candle appended at absolute index `i`, if it is still in the window.
    pub fn close_at(&self, i: usize) -> Option<Decimal> {
        let first_retained = self.appended - self.window.len();
        if i < first_retained {
            return None;
        }
        self.window.get(i - first_retained).map(|c| c.close)
    }

    /// Up to `n` most recent closes, oldest first.
    pub fn last_n_closes(&self, n: usize) -> Vec<Decimal> {
        let skip = self.window.len().saturating_sub(n);
        self.window.iter().skip(skip).map(|c| c.close).collect()
    }

    pub fn last(&self) -> Option<&Candle> {
        self.window.back()
    }

    /// Number of candles appended over the session, including evicted ones.
    pub fn len(&self) -> usize {
        self.appended
    }

    pub fn is_empty(&self) -> bool {
        self.appended == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn candle(ts: i64, close: Decimal) -> Candle {
        Candle::from_close(Symbol::from("BTCUSDT"), ts, close)
    }

    #[test]
    fn append_requires_strictly_increasing_timestamps() {
        let mut series = CandleSeries::new(Symbol::from("BTCUSDT"), 10);
        series.append(candle(1_000, dec!(10))).unwrap();

        let same = series.append(candle(1_000, dec!(11)));
        assert!(matches!(same, Err(Error::OutOfOrder { timestamp: 1_000, last_timestamp: 1_000, .. })));
        let older = series.append(candle(999, dec!(11)));
        assert!(matches!(older, Err(Error::OutOfOrder { .. })));

        // Rejections leave the series as it was.
        assert_eq!(series.len(), 1);
        assert_eq!(series.last().map(|c| c.close), Some(dec!(10)));
    }

    #[test]
    fn rejects_candles_for_another_pair() {
        let mut series = CandleSeries::new(Symbol::from("BTCUSDT"), 10);
        let other = Candle::from_close(Symbol::from("ETHUSDT"), 1, dec!(1));
        assert!(matches!(series.append(other), Err(Error::InputFormat(_))));
        assert!(series.is_empty());
    }

    #[test]
    fn bounded_window_keeps_absolute_indices() {
        let mut series = CandleSeries::new(Symbol::from("BTCUSDT"), 3);
        for (i, close) in [dec!(1), dec!(2), dec!(3), dec!(4), dec!(5)].into_iter().enumerate() {
            series.append(candle(i as i64, close)).unwrap();
        }

        assert_eq!(series.len(), 5);
        assert_eq!(series.close_at(0), None);
        assert_eq!(series.close_at(1), None);
        assert_eq!(series.close_at(2), Some(dec!(3)));
        assert_eq!(series.close_at(4), Some(dec!(5)));
        assert_eq!(series.close_at(5), None);
        assert_eq!(series.last_n_closes(2), vec![dec!(4), dec!(5)]);
        assert_eq!(series.last_n_closes(10), vec![dec!(3), dec!(4), dec!(5)]);
    }
}
