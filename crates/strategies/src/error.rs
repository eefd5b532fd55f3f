// In crates/strategies/src/error.rs

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid indicator window: {0}")]
    InvalidWindow(String),

    #[error("Invalid strategy settings: {0}")]
    InvalidSettings(String),

    #[error("Attempted to create unknown strategy: {0}")]
    UnknownStrategy(String),

    #[error("Failed to parse strategy params: {0}")]
    ParamsError(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
