// In crates/execution/src/ledger.rs

use crate::types::{LedgerSettings, PortfolioState};
use crate::{Error, Result, SizingPolicy};
use core_types::{Signal, Symbol, TradeRecord, ValuationSnapshot};
use rust_decimal::Decimal;

/// Holds the simulated balances for one pair and applies trades on signal edges.
///
/// The ledger is a small state machine over `last_trade_signal`: only a non-`Hold`
/// signal that differs from the last executed one changes anything. Repeating the
/// same signal while the crossed condition persists is a no-op.
#[derive(Debug)]
pub struct PortfolioLedger {
    symbol: Symbol,
    settings: LedgerSettings,
    state: PortfolioState,
    policy: Box<dyn SizingPolicy + Send + Sync>,
}

impl PortfolioLedger {
    pub fn new(symbol: Symbol, settings: LedgerSettings) -> Result<Self> {
        settings.validate()?;
        let policy = settings.sizing_policy.build();
        tracing::debug!(symbol = %symbol, policy = policy.name(), "Portfolio ledger created.");
        Ok(Self {
            state: PortfolioState::new(&settings),
            symbol,
            settings,
            policy,
        })
    }

    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    pub fn state(&self) -> &PortfolioState {
        &self.state
    }

    pub fn settings(&self) -> &LedgerSettings {
        &self.settings
    }

    pub fn policy_name(&self) -> &'static str {
        self.policy.name()
    }

    /// Applies `signal` at `price`.
    ///
    /// Returns the executed trade, or `None` when the signal is `Hold`, repeats the last
    /// executed signal, or would move a zero amount. The fill is computed and checked in
    /// full before the balances are touched; on error the ledger is unchanged.
    pub fn on_signal(&mut self, signal: Signal, price: Decimal, timestamp: i64) -> Result<Option<TradeRecord>> {
        if price <= Decimal::ZERO {
            return Err(Error::InvalidPrice { price });
        }
        let Some(side) = signal.side() else {
            return Ok(None);
        };
        if signal == self.state.last_trade_signal {
            tracing::trace!(symbol = %self.symbol, ?signal, "Repeated signal ignored.");
            return Ok(None);
        }

        let fill = self.policy.fill(side, price, &self.state)?;
        let overflow = || Error::Arithmetic { side, price };
        // Rounding can leave a balance a hair below zero; clamp rather than fail.
        let quote_after = self
            .state
            .quote_balance
            .checked_add(fill.quote_delta)
            .ok_or_else(overflow)?
            .max(Decimal::ZERO);
        let base_after = self
            .state
            .base_balance
            .checked_add(fill.base_delta)
            .ok_or_else(overflow)?
            .max(Decimal::ZERO);

        // The edge is consumed even when there was nothing to convert.
        self.state.last_trade_signal = signal;
        if fill.is_empty() {
            tracing::debug!(symbol = %self.symbol, ?signal, "Signal edge with nothing to convert.");
            return Ok(None);
        }

        let trade = TradeRecord {
            timestamp,
            symbol: self.symbol.clone(),
            direction: side,
            signal,
            price,
            quote_delta: quote_after - self.state.quote_balance,
            base_delta: base_after - self.state.base_balance,
            quote_balance_after: quote_after,
            base_balance_after: base_after,
        };
        self.state.quote_balance = quote_after;
        self.state.base_balance = base_after;

        tracing::info!(
            symbol = %self.symbol,
            side = ?side,
            price = %price,
            quote_balance = %quote_after,
            base_balance = %base_after,
            "Trade executed."
        );
        Ok(Some(trade))
    }

    /// Total portfolio value in quote units, marking the base balance at `price`.
    pub fn valuation(&self, price: Decimal) -> Decimal {
        self.state
            .quote_balance
            .saturating_add(self.state.base_balance.saturating_mul(price))
    }

    pub fn snapshot(&self, timestamp: i64, price: Decimal) -> ValuationSnapshot {
        ValuationSnapshot {
            timestamp,
            quote_balance: self.state.quote_balance,
            base_balance: self.state.base_balance,
            price,
            total_value: self.valuation(price),
        }
    }

    /// Restores the initial balances and forgets the last traded signal.
    pub fn reset(&mut self) {
        self.state = PortfolioState::new(&self.settings);
    }
}
