// In crates/analytics/src/types.rs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A struct to hold a point in the portfolio's equity curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    /// Candle open time in epoch milliseconds.
    pub timestamp: i64,
    pub value: Decimal,
}

/// Summary of a run, computed from its equity curve and executed trades.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PerformanceReport {
    pub initial_value: Decimal,
    pub final_value: Decimal,
    pub net_pnl_absolute: Decimal,
    pub net_pnl_percentage: f64,
    pub max_drawdown_absolute: Decimal,
    pub max_drawdown_percentage: f64,
    /// Mean over standard deviation of per-row returns. Not annualized.
    pub sharpe_ratio: f64,
    pub total_trades: u32,
}

impl PerformanceReport {
    pub fn new() -> Self {
        Self::default()
    }
}
