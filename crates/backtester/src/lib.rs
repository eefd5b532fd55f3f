pub mod error;
pub mod sweep;
pub mod types;

use analytics::{AnalyticsEngine, EquityPoint, PerformanceReport};
use core_types::{Candle, CandleSeries, Symbol};
use execution::{LedgerSettings, PortfolioLedger};
use strategies::Strategy;
use strategies::ma_crossover::MACrossover;
use strategies::ma_level::MALevel;

pub use error::{Error, Result};
pub use sweep::run_sweep;
pub use types::{BacktestResult, BacktestSettings, SignalSource, SweepGrid, SweepOutcome, ValuationRow};

/// Replays a historical candle sequence through one strategy and a full-notional ledger.
///
/// Signals are acted on at the close of the candle that produced them, and every candle
/// yields exactly one `ValuationRow`.
pub struct Backtester {
    symbol: Symbol,
    settings: BacktestSettings,
    strategy: Box<dyn Strategy + Send + Sync>,
    ledger: PortfolioLedger,
}

impl Backtester {
    pub fn new(symbol: Symbol, settings: BacktestSettings) -> Result<Self> {
        let strategy_settings = settings.strategy_settings();
        let strategy: Box<dyn Strategy + Send + Sync> = match settings.signal_source {
            SignalSource::Level => Box::new(MALevel::new(strategy_settings)?),
            SignalSource::Crossover => Box::new(MACrossover::new(strategy_settings)?),
        };
        let ledger = PortfolioLedger::new(
            symbol.clone(),
            LedgerSettings::full_notional(settings.initial_quote_balance),
        )?;
        Ok(Self {
            symbol,
            settings,
            strategy,
            ledger,
        })
    }

    pub fn settings(&self) -> &BacktestSettings {
        &self.settings
    }

    /// Runs the whole history from a fresh state. Calling it twice gives the same result.
    ///
    /// Candles must belong to this backtest's symbol and have strictly increasing timestamps;
    /// the first offending candle aborts the run.
    pub fn run(&mut self, candles: &[Candle]) -> Result<BacktestResult> {
        self.strategy.reset();
        self.ledger.reset();
        tracing::info!(
            symbol = %self.symbol,
            strategy = self.strategy.name(),
            short = self.settings.short_window,
            long = self.settings.long_window,
            candles = candles.len(),
            "Starting backtest."
        );

        let mut series = CandleSeries::new(self.symbol.clone(), self.settings.long_window);
        let mut rows = Vec::with_capacity(candles.len());
        let mut equity_curve = Vec::with_capacity(candles.len());
        let mut trades = Vec::new();

        for candle in candles {
            series.append(candle.clone())?;
            let signal = self.strategy.assess(candle);
            let averages = self.strategy.averages();

            if let Some(trade) = self.ledger.on_signal(signal, candle.close, candle.timestamp)? {
                trades.push(trade);
            }

            let snapshot = self.ledger.snapshot(candle.timestamp, candle.close);
            equity_curve.push(EquityPoint {
                timestamp: candle.timestamp,
                value: snapshot.total_value,
            });
            rows.push(ValuationRow {
                timestamp: candle.timestamp,
                close: candle.close,
                short_ma: averages.short,
                long_ma: averages.long,
                level: averages.level(),
                position_change: signal.value(),
                quote_balance: snapshot.quote_balance,
                base_balance: snapshot.base_balance,
                total_value: snapshot.total_value,
            });
        }

        let report = AnalyticsEngine::new().calculate(self.settings.initial_quote_balance, &trades, &equity_curve);
        tracing::info!(
            symbol = %self.symbol,
            trades = trades.len(),
            final_value = %report.final_value,
            "Backtest finished."
        );
        Ok(BacktestResult { rows, trades, report })
    }
}

/// Helper function to print the performance report in a readable format.
pub fn print_report(report: &PerformanceReport) {
    println!("\n--- Backtest Performance Report ---");
    println!("-----------------------------------");
    println!("Initial Value:         ${:.2}", report.initial_value);
    println!("Final Value:           ${:.2}", report.final_value);
    println!("Net P&L:               ${:.2} ({:.2}%)", report.net_pnl_absolute, report.net_pnl_percentage);
    println!("Max Drawdown:          ${:.2} ({:.2}%)", report.max_drawdown_absolute, report.max_drawdown_percentage);
    println!("Sharpe Ratio:          {:.3}", report.sharpe_ratio);
    println!("Total Trades:          {}", report.total_trades);
    println!("-----------------------------------");
}
