// In crates/backtester/src/error.rs

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Strategy error: {0}")]
    Strategy(#[from] strategies::Error),

    #[error("Ledger error: {0}")]
    Ledger(#[from] execution::Error),

    #[error("Bad candle history: {0}")]
    Candle(#[from] core_types::Error),

    #[error("Invalid sweep grid: {0}")]
    InvalidGrid(String),

    #[error("Failed to build the sweep thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

pub type Result<T> = std::result::Result<T, Error>;
