// In crates/core-types/src/error.rs

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Out-of-order candle for {symbol}: timestamp {timestamp} is not after {last_timestamp}")]
    OutOfOrder {
        symbol: String,
        timestamp: i64,
        last_timestamp: i64,
    },

    #[error("Malformed input: {0}")]
    InputFormat(String),
}

pub type Result<T> = std::result::Result<T, Error>;
