// In crates/backtester/src/sweep.rs

use crate::types::{BacktestSettings, SweepGrid, SweepOutcome};
use crate::{Backtester, Result};
use core_types::{Candle, Symbol};
use rayon::ThreadPoolBuilder;
use rayon::prelude::*;

/// Backtests every valid `(short, long)` pair of `grid` over the same history, in parallel.
///
/// Each run owns its own strategy and ledger. Runs that fail are logged and left out.
/// Outcomes are ranked by final portfolio value, best first; ties keep grid order.
/// `threads` of `None` uses rayon's default pool size.
pub fn run_sweep(
    symbol: &Symbol,
    candles: &[Candle],
    base: &BacktestSettings,
    grid: &SweepGrid,
    threads: Option<usize>,
) -> Result<Vec<SweepOutcome>> {
    let pairs = grid.pairs()?;
    tracing::info!(symbol = %symbol, runs = pairs.len(), "Starting parameter sweep.");

    let mut builder = ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    let pool = builder.build()?;

    let mut outcomes: Vec<SweepOutcome> = pool.install(|| {
        pairs
            .par_iter()
            .filter_map(|&(short, long)| {
                let settings = base.with_windows(short, long);
                match Backtester::new(symbol.clone(), settings).and_then(|mut bt| bt.run(candles)) {
                    Ok(result) => Some(SweepOutcome {
                        short_window: short,
                        long_window: long,
                        report: result.report,
                    }),
                    Err(e) => {
                        tracing::error!(short, long, error = %e, "A single backtest run failed.");
                        None
                    }
                }
            })
            .collect()
    });

    // Stable sort, so equal values stay in grid order.
    outcomes.sort_by(|a, b| b.report.final_value.cmp(&a.report.final_value));
    Ok(outcomes)
}
