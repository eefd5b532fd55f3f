// In crates/execution/src/sizing.rs

use crate::types::PortfolioState;
use crate::{Error, Fill, Result, SizingPolicy};
use core_types::Side;
use rust_decimal::Decimal;

/// Leveraged partial sizing used by the live stream.
///
/// A buy spends `buy_fraction` of the quote balance and receives `(spend / price) * leverage`
/// base; a sell gives up `sell_fraction` of the base balance for `(spend * price) * leverage`
/// quote.
#[derive(Debug, Clone, Copy, Default)]
pub struct Fractional;

impl SizingPolicy for Fractional {
    fn name(&self) -> &'static str {
        "Fractional"
    }

    fn fill(&self, side: Side, price: Decimal, state: &PortfolioState) -> Result<Fill> {
        let overflow = || Error::Arithmetic { side, price };
        match side {
            Side::Buy => {
                let spend = state
                    .quote_balance
                    .checked_mul(state.buy_fraction)
                    .ok_or_else(overflow)?;
                let gained_base = spend
                    .checked_div(price)
                    .and_then(|units| units.checked_mul(state.leverage))
                    .ok_or_else(overflow)?;
                Ok(Fill {
                    quote_delta: -spend,
                    base_delta: gained_base,
                })
            }
            Side::Sell => {
                let spend_base = state
                    .base_balance
                    .checked_mul(state.sell_fraction)
                    .ok_or_else(overflow)?;
                let gained_quote = spend_base
                    .checked_mul(price)
                    .and_then(|notional| notional.checked_mul(state.leverage))
                    .ok_or_else(overflow)?;
                Ok(Fill {
                    quote_delta: gained_quote,
                    base_delta: -spend_base,
                })
            }
        }
    }
}

/// Converts the entire balance of one asset into the other. Used by backtests.
#[derive(Debug, Clone, Copy, Default)]
pub struct FullNotional;

impl SizingPolicy for FullNotional {
    fn name(&self) -> &'static str {
        "FullNotional"
    }

    fn fill(&self, side: Side, price: Decimal, state: &PortfolioState) -> Result<Fill> {
        let overflow = || Error::Arithmetic { side, price };
        match side {
            Side::Buy => Ok(Fill {
                quote_delta: -state.quote_balance,
                base_delta: state.quote_balance.checked_div(price).ok_or_else(overflow)?,
            }),
            Side::Sell => Ok(Fill {
                quote_delta: state.base_balance.checked_mul(price).ok_or_else(overflow)?,
                base_delta: -state.base_balance,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LedgerSettings;
    use rust_decimal_macros::dec;

    #[test]
    fn fractional_buy_and_sell_amounts() {
        let settings = LedgerSettings::fractional(dec!(10000), dec!(1), dec!(2), dec!(0.1), dec!(0.25));
        let state = PortfolioState::new(&settings);

        let buy = Fractional.fill(Side::Buy, dec!(50000), &state).unwrap();
        // spend 1000 quote, (1000 / 50000) * 2 = 0.04 base
        assert_eq!(buy.quote_delta, dec!(-1000));
        assert_eq!(buy.base_delta, dec!(0.04));

        let sell = Fractional.fill(Side::Sell, dec!(50000), &state).unwrap();
        // sell 0.25 base for (0.25 * 50000) * 2 = 25000 quote
        assert_eq!(sell.base_delta, dec!(-0.25));
        assert_eq!(sell.quote_delta, dec!(25000));
    }

    #[test]
    fn full_notional_moves_everything() {
        let state = PortfolioState::new(&LedgerSettings::full_notional(dec!(1000)));
        let buy = FullNotional.fill(Side::Buy, dec!(10), &state).unwrap();
        assert_eq!(buy, Fill { quote_delta: dec!(-1000), base_delta: dec!(100) });

        let sell = FullNotional.fill(Side::Sell, dec!(10), &state).unwrap();
        assert!(sell.is_empty());
    }

    #[test]
    fn overflow_is_reported_not_panicked() {
        let mut state = PortfolioState::new(&LedgerSettings::full_notional(Decimal::MAX));
        state.base_balance = Decimal::MAX;
        let result = FullNotional.fill(Side::Sell, dec!(10), &state);
        assert!(matches!(result, Err(Error::Arithmetic { side: Side::Sell, .. })));
    }
}
