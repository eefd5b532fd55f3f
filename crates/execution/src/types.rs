// In crates/execution/src/types.rs

use crate::sizing::{Fractional, FullNotional};
use crate::{Error, Result, SizingPolicy};
use core_types::Signal;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Which sizing rule the ledger applies on a signal edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizingPolicyKind {
    /// Trade a fixed fraction of the available balance, scaled by leverage.
    #[default]
    Fractional,
    /// Convert the whole balance of one asset into the other.
    FullNotional,
}

impl SizingPolicyKind {
    pub fn build(self) -> Box<dyn SizingPolicy + Send + Sync> {
        match self {
            SizingPolicyKind::Fractional => Box::new(Fractional),
            SizingPolicyKind::FullNotional => Box::new(FullNotional),
        }
    }
}

fn default_leverage() -> Decimal {
    Decimal::ONE
}

fn default_fraction() -> Decimal {
    Decimal::ONE
}

/// Starting balances and sizing parameters of a simulated portfolio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerSettings {
    /// Starting balance of the quote asset (e.g., USDT).
    pub initial_quote_balance: Decimal,
    /// Starting balance of the base asset (e.g., BTC).
    #[serde(default)]
    pub initial_base_balance: Decimal,
    #[serde(default = "default_leverage")]
    pub leverage: Decimal,
    #[serde(default = "default_fraction")]
    pub buy_fraction: Decimal,
    #[serde(default = "default_fraction")]
    pub sell_fraction: Decimal,
    #[serde(default)]
    pub sizing_policy: SizingPolicyKind,
}

impl LedgerSettings {
    pub fn fractional(
        initial_quote_balance: Decimal,
        initial_base_balance: Decimal,
        leverage: Decimal,
        buy_fraction: Decimal,
        sell_fraction: Decimal,
    ) -> Self {
        Self {
            initial_quote_balance,
            initial_base_balance,
            leverage,
            buy_fraction,
            sell_fraction,
            sizing_policy: SizingPolicyKind::Fractional,
        }
    }

    /// All capital starts in the quote asset.
    pub fn full_notional(initial_quote_balance: Decimal) -> Self {
        Self {
            initial_quote_balance,
            initial_base_balance: Decimal::ZERO,
            leverage: Decimal::ONE,
            buy_fraction: Decimal::ONE,
            sell_fraction: Decimal::ONE,
            sizing_policy: SizingPolicyKind::FullNotional,
        }
    }

    pub fn validate(&self) -> Result<()> {
        let in_unit_interval = |f: Decimal| f > Decimal::ZERO && f <= Decimal::ONE;
        if !in_unit_interval(self.buy_fraction) {
            return Err(Error::InvalidSettings(format!(
                "buy_fraction must be in (0, 1], got {}",
                self.buy_fraction
            )));
        }
        if !in_unit_interval(self.sell_fraction) {
            return Err(Error::InvalidSettings(format!(
                "sell_fraction must be in (0, 1], got {}",
                self.sell_fraction
            )));
        }
        if self.leverage < Decimal::ONE {
            return Err(Error::InvalidSettings(format!(
                "leverage must be at least 1, got {}",
                self.leverage
            )));
        }
        if self.initial_quote_balance < Decimal::ZERO || self.initial_base_balance < Decimal::ZERO {
            return Err(Error::InvalidSettings("initial balances must not be negative".to_string()));
        }
        Ok(())
    }
}

/// Represents the state of the simulated trading portfolio.
#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioState {
    pub quote_balance: Decimal,
    pub base_balance: Decimal,
    pub leverage: Decimal,
    pub buy_fraction: Decimal,
    pub sell_fraction: Decimal,
    /// The signal of the last executed edge; `Hold` until the first trade.
    pub last_trade_signal: Signal,
}

impl PortfolioState {
    /// Creates the initial portfolio state from its settings.
    pub fn new(settings: &LedgerSettings) -> Self {
        Self {
            quote_balance: settings.initial_quote_balance,
            base_balance: settings.initial_base_balance,
            leverage: settings.leverage,
            buy_fraction: settings.buy_fraction,
            sell_fraction: settings.sell_fraction,
            last_trade_signal: Signal::Hold,
        }
    }
}
