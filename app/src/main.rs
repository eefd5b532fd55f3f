use analytics::PerformanceReport;
use anyhow::{Context, Result};
use backtester::{BacktestResult, Backtester, SignalSource, SweepOutcome};
use chrono::DateTime;
use clap::{Parser, Subcommand};
use core_types::Symbol;
use engine::Engine;
use events::EngineEvent;
use rust_decimal::Decimal;
use std::path::PathBuf;
use std::time::Instant;
use tokio::sync::{broadcast, watch};
use tokio::task;
use tracing_subscriber::prelude::*;

// --- Command-Line Interface Definition ---

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = "A moving-average crossover trading simulator.")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Streams live klines for every enabled pair and paper-trades them until Ctrl-C.
    Run,

    /// Replays a CSV candle history through the strategy with a full-notional ledger.
    Backtest {
        /// CSV file with at least a timestamp and a close column.
        #[arg(short, long)]
        file: PathBuf,

        /// The symbol the history belongs to.
        #[arg(short, long, default_value = "BTCUSDT")]
        symbol: String,

        /// Overrides the configured starting quote balance.
        #[arg(long)]
        capital: Option<Decimal>,

        /// Overrides the configured short window.
        #[arg(long)]
        short: Option<usize>,

        /// Overrides the configured long window.
        #[arg(long)]
        long: Option<usize>,

        /// Trade on crossover edges instead of level changes.
        #[arg(long)]
        crossover: bool,
    },

    /// Backtests every (short, long) window pair of the configured grid.
    Sweep {
        /// CSV file with at least a timestamp and a close column.
        #[arg(short, long)]
        file: PathBuf,

        /// The symbol the history belongs to.
        #[arg(short, long, default_value = "BTCUSDT")]
        symbol: String,

        /// How many of the best parameter sets to print.
        #[arg(long, default_value_t = 5)]
        top: usize,
    },
}

// --- Main Application Entry Point ---

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from a .env file, if it exists.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let settings = app_config::load_settings().context("Failed to load settings")?;

    let level = settings
        .app
        .log_level
        .parse::<tracing::Level>()
        .unwrap_or(tracing::Level::INFO);
    let fmt_layer = tracing_subscriber::fmt::layer().with_filter(
        tracing_subscriber::filter::Targets::new()
            .with_target("tungstenite", tracing::Level::WARN)
            .with_target("tokio_tungstenite", tracing::Level::WARN)
            .with_default(level),
    );
    tracing_subscriber::registry().with(fmt_layer).init();

    tracing::info!(environment = %settings.app.environment, "Starting application");

    match cli.command {
        Commands::Run => {
            run_app(settings).await?;
        }
        Commands::Backtest {
            file,
            symbol,
            capital,
            short,
            long,
            crossover,
        } => {
            let mut backtest = settings.backtest.clone();
            if let Some(capital) = capital {
                backtest.initial_quote_balance = capital;
            }
            backtest.short_window = short.unwrap_or(backtest.short_window);
            backtest.long_window = long.unwrap_or(backtest.long_window);
            if crossover {
                backtest.signal_source = SignalSource::Crossover;
            }
            handle_backtest(file, Symbol(symbol), backtest)?;
        }
        Commands::Sweep { file, symbol, top } => {
            handle_sweep(file, Symbol(symbol), settings, top).await?;
        }
    }

    tracing::info!("Application has finished successfully.");
    Ok(())
}

// --- "Run" Subcommand Logic ---

/// Runs every enabled pair until Ctrl-C, then prints each pair's final valuation.
async fn run_app(settings: app_config::Settings) -> Result<()> {
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let (events_tx, events_rx) = events::channel();
    let printer = tokio::spawn(print_events(events_rx));

    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => tracing::info!("Ctrl-C received. Stopping all pairs..."),
            Err(e) => tracing::error!(error = %e, "Failed to listen for Ctrl-C. Stopping all pairs."),
        }
        let _ = shutdown_tx.send(true);
    });

    let engine = Engine::new(settings, events_tx);
    let finals = engine.run(shutdown_rx).await?;
    // The printer drains whatever is left once the last sender is gone.
    drop(engine);
    printer.await?;

    println!("\n--- Final Valuations ---");
    for (symbol, snapshot) in &finals {
        println!(
            "{:<10} quote: {:.2} | base: {:.6} | price: {:.2} | total: {:.2}",
            symbol.0, snapshot.quote_balance, snapshot.base_balance, snapshot.price, snapshot.total_value
        );
    }
    Ok(())
}

/// Writes every engine event to stdout as one JSON line.
async fn print_events(mut rx: broadcast::Receiver<EngineEvent>) {
    loop {
        match rx.recv().await {
            Ok(event) => match serde_json::to_string(&event) {
                Ok(line) => println!("{line}"),
                Err(e) => tracing::error!(error = %e, "Failed to serialize engine event."),
            },
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "Event printer fell behind.");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

// --- "Backtest" Subcommand Logic ---

fn handle_backtest(file: PathBuf, symbol: Symbol, settings: backtester::BacktestSettings) -> Result<()> {
    let candles = market_data::load_candles_csv(&file, &symbol)
        .with_context(|| format!("Failed to load candles from {}", file.display()))?;
    tracing::info!(count = candles.len(), "Loaded candle history.");

    let mut backtester = Backtester::new(symbol, settings)?;
    let result = backtester.run(&candles)?;

    print_position_changes(&result);
    backtester::print_report(&result.report);
    Ok(())
}

/// Prints the rows where the position changed, like a trade blotter.
fn print_position_changes(result: &BacktestResult) {
    println!("\n--- Position Changes ---");
    println!("{:<20} {:>12} {:>12} {:>12} {:>9}", "Time", "Close", "Short MA", "Long MA", "Position");
    for row in result.position_changes() {
        let time = DateTime::from_timestamp_millis(row.timestamp)
            .map_or_else(|| row.timestamp.to_string(), |dt| dt.format("%Y-%m-%d %H:%M").to_string());
        let fmt_ma = |ma: Option<Decimal>| ma.map_or_else(|| "-".to_string(), |v| format!("{v:.3}"));
        println!(
            "{:<20} {:>12.2} {:>12} {:>12} {:>9}",
            time,
            row.close,
            fmt_ma(row.short_ma),
            fmt_ma(row.long_ma),
            row.position_change
        );
    }
}

// --- "Sweep" Subcommand Logic ---

async fn handle_sweep(file: PathBuf, symbol: Symbol, settings: app_config::Settings, top: usize) -> Result<()> {
    let start_time = Instant::now();
    let grid = settings
        .sweep
        .clone()
        .context("Cannot sweep: no [sweep] grid is configured.")?;
    let candles = market_data::load_candles_csv(&file, &symbol)
        .with_context(|| format!("Failed to load candles from {}", file.display()))?;
    tracing::info!(count = candles.len(), "Loaded candle history.");

    let base = settings.backtest.clone();
    let threads = settings.app.sweep_threads;
    // The sweep is CPU-bound; keep it off the async workers.
    let outcomes = task::spawn_blocking(move || backtester::run_sweep(&symbol, &candles, &base, &grid, threads)).await??;

    print_sweep_report(&outcomes, top);
    tracing::info!(duration = ?start_time.elapsed(), "Sweep finished.");
    Ok(())
}

fn print_sweep_report(outcomes: &[SweepOutcome], top: usize) {
    println!("\n--- Sweep Complete ---");
    println!("----------------------");
    println!("Top {top} Window Pairs by Final Value:");
    println!("----------------------");

    for (i, outcome) in outcomes.iter().take(top).enumerate() {
        println!(
            "\n[Rank {} | short {} / long {}]",
            i + 1,
            outcome.short_window,
            outcome.long_window
        );
        print_summary_line(&outcome.report);
    }
    println!("\n----------------------");

    match outcomes.first() {
        Some(best) => println!(
            "Best: short_window = {}, long_window = {} (final value ${:.2})",
            best.short_window, best.long_window, best.report.final_value
        ),
        None => println!("No window pair produced a result."),
    }
}

fn print_summary_line(report: &PerformanceReport) {
    println!(
        "  - Final: ${:.2} | P&L: ${:.2} ({:.2}%) | Max Drawdown: {:.2}% | Sharpe: {:.2} | Trades: {}",
        report.final_value,
        report.net_pnl_absolute,
        report.net_pnl_percentage,
        report.max_drawdown_percentage,
        report.sharpe_ratio,
        report.total_trades
    );
}
