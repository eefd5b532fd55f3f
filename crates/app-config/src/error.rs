// In crates/app-config/src/error.rs

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to load configuration: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error(transparent)]
    Invalid(#[from] core_types::Error),
}

impl Error {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Error::Invalid(core_types::Error::Config(msg.into()))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
