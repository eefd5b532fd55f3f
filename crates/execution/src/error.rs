// In crates/execution/src/error.rs

use core_types::Side;
use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Invalid ledger settings: {0}")]
    InvalidSettings(String),

    #[error("Trade price must be positive, got {price}")]
    InvalidPrice { price: Decimal },

    #[error("Arithmetic overflow while sizing a {side:?} at {price}")]
    Arithmetic { side: Side, price: Decimal },
}

pub type Result<T> = std::result::Result<T, Error>;
