// In crates/market-data/src/history.rs

use crate::Result;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use core_types::{Candle, Error as CandleError, Symbol, validate_close};
use rust_decimal::Decimal;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

const DATETIME_COLUMN: &str = "datetime";
const CLOSE_COLUMNS: [&str; 2] = ["close", "c"];

/// Loads a historical close series from a CSV file with a header row.
pub fn load_candles_csv(path: impl AsRef<Path>, symbol: &Symbol) -> Result<Vec<Candle>> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let candles = read_candles(file, symbol)?;
    tracing::info!(path = %path.display(), rows = candles.len(), "Loaded historical candles.");
    Ok(candles)
}

/// Parses every row up front; one malformed row rejects the whole input.
///
/// Required columns are `datetime` and `close` (or `c`); others are ignored. Datetimes may be
/// RFC 3339, `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DD` (all read as UTC) or integer epoch milliseconds.
pub fn read_candles<R: Read>(reader: R, symbol: &Symbol) -> Result<Vec<Candle>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    let column = |names: &[&str]| {
        headers
            .iter()
            .position(|h| names.iter().any(|name| h.eq_ignore_ascii_case(name)))
    };
    let datetime_idx = column(&[DATETIME_COLUMN])
        .ok_or_else(|| CandleError::InputFormat("missing `datetime` column".to_string()))?;
    let close_idx = column(&CLOSE_COLUMNS)
        .ok_or_else(|| CandleError::InputFormat("missing `close` column".to_string()))?;

    let mut candles = Vec::new();
    for record in reader.records() {
        let record = record?;
        let line = record.position().map_or(0, |p| p.line());
        let field = |idx: usize, name: &str| {
            record
                .get(idx)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| CandleError::InputFormat(format!("line {line}: empty `{name}`")))
        };

        let timestamp = parse_timestamp(field(datetime_idx, DATETIME_COLUMN)?)
            .map_err(|msg| CandleError::InputFormat(format!("line {line}: {msg}")))?;
        let raw_close = field(close_idx, "close")?;
        let close = Decimal::from_str(raw_close).map_err(|e| {
            CandleError::InputFormat(format!("line {line}: close {raw_close:?} is not a decimal: {e}"))
        })?;
        validate_close(close).map_err(|e| match e {
            CandleError::InputFormat(msg) => CandleError::InputFormat(format!("line {line}: {msg}")),
            other => other,
        })?;
        candles.push(Candle::from_close(symbol.clone(), timestamp, close));
    }
    Ok(candles)
}

/// Returns epoch milliseconds.
fn parse_timestamp(raw: &str) -> std::result::Result<i64, String> {
    if let Ok(millis) = raw.parse::<i64>() {
        return Ok(millis);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.timestamp_millis());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Ok(dt.and_utc().timestamp_millis());
    }
    if let Some(dt) = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
    {
        return Ok(dt.and_utc().timestamp_millis());
    }
    Err(format!("unrecognized datetime {raw:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use rust_decimal_macros::dec;

    fn btc() -> Symbol {
        Symbol::from("BTCUSDT")
    }

    #[test]
    fn accepts_every_datetime_format() {
        assert_eq!(parse_timestamp("1700000000000"), Ok(1_700_000_000_000));
        assert_eq!(parse_timestamp("1970-01-01T00:00:01Z"), Ok(1000));
        assert_eq!(parse_timestamp("1970-01-01T01:00:00+01:00"), Ok(0));
        assert_eq!(parse_timestamp("1970-01-02 00:00:00"), Ok(86_400_000));
        assert_eq!(parse_timestamp("1970-01-02"), Ok(86_400_000));
        assert!(parse_timestamp("yesterday").is_err());
    }

    #[test]
    fn reads_close_and_ignores_other_columns() {
        let data = "datetime,open,close,volume\n2024-01-01,1,10.5,3\n2024-01-02,1,11,3\n";
        let candles = read_candles(data.as_bytes(), &btc()).unwrap();
        assert_eq!(candles.len(), 2);
        assert_eq!(candles[0].close, dec!(10.5));
        assert_eq!(candles[1].timestamp - candles[0].timestamp, 86_400_000);
        assert_eq!(candles[1].symbol, btc());
    }

    #[test]
    fn accepts_short_close_alias() {
        let data = "Datetime,c\n1000,42\n";
        let candles = read_candles(data.as_bytes(), &btc()).unwrap();
        assert_eq!(candles[0].timestamp, 1000);
        assert_eq!(candles[0].close, dec!(42));
    }

    #[test]
    fn rejects_malformed_input() {
        let missing = read_candles("time,close\n1,2\n".as_bytes(), &btc());
        assert!(matches!(missing, Err(Error::Candle(CandleError::InputFormat(_)))));

        let bad_close = read_candles("datetime,close\n1,abc\n".as_bytes(), &btc());
        assert!(matches!(bad_close, Err(Error::Candle(CandleError::InputFormat(_)))));

        let negative = read_candles("datetime,close\n1,10\n2,-1\n".as_bytes(), &btc());
        assert!(matches!(negative, Err(Error::Candle(CandleError::InputFormat(_)))));

        let huge = read_candles("datetime,close\n1,70000000000000000000000000000\n".as_bytes(), &btc());
        assert!(matches!(huge, Err(Error::Candle(CandleError::InputFormat(_)))));

        let empty = read_candles("datetime,close\n1,\n".as_bytes(), &btc());
        assert!(empty.is_err());
    }
}
