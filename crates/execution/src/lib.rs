// In crates/execution/src/lib.rs

use core_types::Side;
use rust_decimal::Decimal;

pub mod error;
pub mod ledger;
pub mod sizing;
pub mod types;

// Re-export public types
pub use error::{Error, Result};
pub use ledger::PortfolioLedger;
pub use types::{LedgerSettings, PortfolioState, SizingPolicyKind};

/// Balance changes a sizing policy proposes for one trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fill {
    pub quote_delta: Decimal,
    pub base_delta: Decimal,
}

impl Fill {
    pub fn is_empty(&self) -> bool {
        self.quote_delta.is_zero() && self.base_delta.is_zero()
    }
}

/// Decides how much of one asset is converted into the other on a signal edge.
///
/// Implementations only compute; the `PortfolioLedger` applies the returned `Fill`,
/// so a failed computation never leaves the portfolio half-updated.
pub trait SizingPolicy: std::fmt::Debug {
    /// The name of the policy (e.g., "Fractional", "FullNotional").
    fn name(&self) -> &'static str;

    /// Computes the fill for converting on `side` at `price` from the given state.
    fn fill(&self, side: Side, price: Decimal, state: &PortfolioState) -> Result<Fill>;
}
