use core_types::{Signal, Symbol};
use execution::{LedgerSettings, PortfolioLedger};
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn arb_signal() -> impl Strategy<Value = Signal> {
    prop_oneof![Just(Signal::GoLong), Just(Signal::GoShort), Just(Signal::Hold)]
}

/// Kept in a narrow band so compounding leverage cannot overflow within one run.
fn arb_price() -> impl Strategy<Value = Decimal> {
    (9_500i64..=10_500).prop_map(|cents| Decimal::new(cents, 2))
}

fn arb_fraction() -> impl Strategy<Value = Decimal> {
    (1i64..=100).prop_map(|pct| Decimal::new(pct, 2))
}

fn arb_settings() -> impl Strategy<Value = LedgerSettings> {
    prop_oneof![
        (0i64..=1_000_000, 0i64..=1_000, 1i64..=2, arb_fraction(), arb_fraction()).prop_map(
            |(quote, base, leverage, buy, sell)| {
                LedgerSettings::fractional(
                    Decimal::from(quote),
                    Decimal::new(base, 2),
                    Decimal::from(leverage),
                    buy,
                    sell,
                )
            }
        ),
        (0i64..=1_000_000).prop_map(|quote| LedgerSettings::full_notional(Decimal::from(quote))),
    ]
}

fn ledger(settings: LedgerSettings) -> PortfolioLedger {
    PortfolioLedger::new(Symbol::from("BTCUSDT"), settings).unwrap()
}

#[test]
fn full_notional_buy_low_sell_high() {
    let mut ledger = ledger(LedgerSettings::full_notional(dec!(1000)));
    let buy = ledger.on_signal(Signal::GoLong, dec!(10), 0).unwrap().unwrap();
    assert_eq!(buy.base_balance_after, dec!(100));
    assert_eq!(buy.quote_balance_after, dec!(0));

    // The condition persists; nothing changes.
    assert!(ledger.on_signal(Signal::GoLong, dec!(11), 1).unwrap().is_none());

    let sell = ledger.on_signal(Signal::GoShort, dec!(12), 2).unwrap().unwrap();
    assert_eq!(sell.quote_balance_after, dec!(1200));
    assert_eq!(sell.base_balance_after, dec!(0));
    assert_eq!(ledger.valuation(dec!(12)), dec!(1200));
}

proptest! {
    /// Feeding only `Hold` never changes the portfolio.
    #[test]
    fn hold_leaves_balances_untouched(settings in arb_settings(), prices in prop::collection::vec(arb_price(), 1..50)) {
        let mut ledger = ledger(settings);
        let initial = ledger.state().clone();
        for (ts, price) in prices.into_iter().enumerate() {
            prop_assert!(ledger.on_signal(Signal::Hold, price, ts as i64).unwrap().is_none());
        }
        prop_assert_eq!(ledger.state(), &initial);
    }

    /// A trade only happens on a new edge, and balances never go negative.
    #[test]
    fn trades_only_on_new_edges_and_balances_stay_non_negative(
        settings in arb_settings(),
        steps in prop::collection::vec((arb_signal(), arb_price()), 1..60),
    ) {
        let mut ledger = ledger(settings);
        for (ts, (signal, price)) in steps.into_iter().enumerate() {
            let before = ledger.state().clone();
            if let Some(trade) = ledger.on_signal(signal, price, ts as i64).unwrap() {
                prop_assert_ne!(trade.signal, Signal::Hold);
                prop_assert_ne!(trade.signal, before.last_trade_signal);
                prop_assert_eq!(&trade.quote_balance_after, &ledger.state().quote_balance);
            }
            prop_assert!(ledger.state().quote_balance >= Decimal::ZERO);
            prop_assert!(ledger.state().base_balance >= Decimal::ZERO);
        }
    }

    /// Two ledgers fed the same sequence end in the same state.
    #[test]
    fn replay_is_deterministic(
        settings in arb_settings(),
        steps in prop::collection::vec((arb_signal(), arb_price()), 1..60),
    ) {
        let mut first = ledger(settings.clone());
        let mut second = ledger(settings);
        let run = |ledger: &mut PortfolioLedger| {
            steps
                .iter()
                .enumerate()
                .map(|(ts, (signal, price))| ledger.on_signal(*signal, *price, ts as i64).unwrap())
                .collect::<Vec<_>>()
        };
        prop_assert_eq!(run(&mut first), run(&mut second));
        prop_assert_eq!(first.state(), second.state());
    }
}
