// In crates/market-data/src/lib.rs

pub mod error;
pub mod history;
pub mod live_connector;
pub mod rest;
pub mod types;

// Re-export public types
pub use error::{Error, Result};
pub use history::{load_candles_csv, read_candles};
pub use live_connector::LiveConnector;
pub use rest::HistoricalClient;
pub use types::{parse_kline_message, WsKline, WsKlineEvent};
