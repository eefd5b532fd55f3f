use crate::types::{EquityPoint, PerformanceReport};
use core_types::TradeRecord;
use rust_decimal::Decimal;
use rust_decimal::prelude::*;

/// The engine responsible for calculating performance metrics from a finished run.
#[derive(Debug, Default)]
pub struct AnalyticsEngine;

impl AnalyticsEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a report from the starting capital, the executed trades and the
    /// per-row equity curve. An empty curve reports the initial capital as final.
    pub fn calculate(
        &self,
        initial_capital: Decimal,
        trades: &[TradeRecord],
        equity_curve: &[EquityPoint],
    ) -> PerformanceReport {
        let mut report = PerformanceReport::new();
        report.initial_value = initial_capital;
        report.final_value = equity_curve.last().map_or(initial_capital, |p| p.value);
        report.total_trades = trades.len() as u32;

        // Net P&L
        report.net_pnl_absolute = report.final_value - initial_capital;
        if initial_capital > Decimal::ZERO {
            report.net_pnl_percentage = percent(report.net_pnl_absolute, initial_capital);
        }

        // Max drawdown, measured from the running peak (starting at the initial capital).
        let mut peak_equity = initial_capital;
        let mut max_drawdown = Decimal::ZERO;
        let mut peak_at_max = initial_capital;
        for point in equity_curve {
            peak_equity = peak_equity.max(point.value);
            let drawdown = peak_equity - point.value;
            if drawdown > max_drawdown {
                max_drawdown = drawdown;
                peak_at_max = peak_equity;
            }
        }
        report.max_drawdown_absolute = max_drawdown;
        if peak_at_max > Decimal::ZERO {
            report.max_drawdown_percentage = percent(max_drawdown, peak_at_max);
        }

        report.sharpe_ratio = periodic_sharpe(equity_curve);
        report
    }
}

fn percent(part: Decimal, whole: Decimal) -> f64 {
    part.checked_div(whole)
        .and_then(|ratio| ratio.to_f64())
        .unwrap_or(0.0)
        * 100.0
}

fn periodic_sharpe(equity_curve: &[EquityPoint]) -> f64 {
    // Rows with a zero starting value have no defined return.
    let returns: Vec<f64> = equity_curve
        .windows(2)
        .filter_map(|w| w[1].value.checked_div(w[0].value))
        .filter_map(|ratio| (ratio - Decimal::ONE).to_f64())
        .collect();
    if returns.len() < 2 {
        return 0.0;
    }
    let mean_return = returns.iter().sum::<f64>() / returns.len() as f64;
    let variance = returns.iter().map(|r| (r - mean_return).powi(2)).sum::<f64>() / returns.len() as f64;
    let std_dev = variance.sqrt();
    if std_dev > 0.0 { mean_return / std_dev } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::{Side, Signal, Symbol};
    use rust_decimal_macros::dec;

    fn curve(values: &[Decimal]) -> Vec<EquityPoint> {
        values
            .iter()
            .enumerate()
            .map(|(i, value)| EquityPoint { timestamp: i as i64, value: *value })
            .collect()
    }

    fn trade(signal: Signal) -> TradeRecord {
        TradeRecord {
            timestamp: 0,
            symbol: Symbol::from("BTCUSDT"),
            direction: signal.side().unwrap_or(Side::Buy),
            signal,
            price: dec!(10),
            quote_delta: dec!(0),
            base_delta: dec!(0),
            quote_balance_after: dec!(0),
            base_balance_after: dec!(0),
        }
    }

    #[test]
    fn empty_curve_reports_initial_capital() {
        let report = AnalyticsEngine::new().calculate(dec!(1000), &[], &[]);
        assert_eq!(report.final_value, dec!(1000));
        assert_eq!(report.net_pnl_absolute, dec!(0));
        assert_eq!(report.total_trades, 0);
        assert_eq!(report.sharpe_ratio, 0.0);
    }

    #[test]
    fn pnl_and_drawdown() {
        let equity = curve(&[dec!(1000), dec!(1100), dec!(880), dec!(990), dec!(1200)]);
        let trades = [trade(Signal::GoLong), trade(Signal::GoShort)];
        let report = AnalyticsEngine::new().calculate(dec!(1000), &trades, &equity);

        assert_eq!(report.final_value, dec!(1200));
        assert_eq!(report.net_pnl_absolute, dec!(200));
        assert!((report.net_pnl_percentage - 20.0).abs() < 1e-9);
        assert_eq!(report.max_drawdown_absolute, dec!(220));
        assert!((report.max_drawdown_percentage - 20.0).abs() < 1e-9);
        assert_eq!(report.total_trades, 2);
        assert!(report.sharpe_ratio > 0.0);
    }

    #[test]
    fn flat_curve_has_zero_sharpe() {
        let equity = curve(&[dec!(500), dec!(500), dec!(500)]);
        let report = AnalyticsEngine::new().calculate(dec!(500), &[], &equity);
        assert_eq!(report.sharpe_ratio, 0.0);
        assert_eq!(report.max_drawdown_absolute, dec!(0));
    }

    #[test]
    fn report_serializes() {
        let report = AnalyticsEngine::new().calculate(dec!(10), &[], &curve(&[dec!(10), dec!(12)]));
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"final_value\""));
    }
}
