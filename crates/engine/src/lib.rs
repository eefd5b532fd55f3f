// In crates/engine/src/lib.rs

pub mod runner;

use crate::runner::StreamRunner;
use anyhow::{Context, Result};
use app_config::{PairConfig, Settings};
use core_types::{Symbol, ValuationSnapshot};
use events::EngineEvent;
use execution::PortfolioLedger;
use futures::future;
use market_data::{HistoricalClient, LiveConnector};
use tokio::sync::{broadcast, watch};

/// Candles kept in each pair's in-memory series.
pub const KLINE_HISTORY_SIZE: usize = 200;

/// The portfolio-level orchestrator: one independent `StreamRunner` task per enabled pair.
pub struct Engine {
    settings: Settings,
    events_tx: broadcast::Sender<EngineEvent>,
}

impl Engine {
    pub fn new(settings: Settings, events_tx: broadcast::Sender<EngineEvent>) -> Self {
        Self { settings, events_tx }
    }

    /// Builds the pipeline for one pair from the shared strategy and ledger settings.
    pub fn build_runner(&self, pair: &PairConfig) -> Result<StreamRunner> {
        if pair.symbol.trim().is_empty() || pair.interval.trim().is_empty() {
            anyhow::bail!("Pair entry {:?}/{:?} needs a symbol and an interval.", pair.symbol, pair.interval);
        }
        let symbol = Symbol(pair.symbol.clone());
        let strategy = strategies::factory::create_strategy(&self.settings.strategy)
            .with_context(|| format!("Failed to create strategy for {}", pair.symbol))?;
        let ledger = PortfolioLedger::new(symbol, self.settings.ledger.clone())
            .with_context(|| format!("Failed to create ledger for {}", pair.symbol))?;
        Ok(StreamRunner::new(strategy, ledger, pair.final_bars_only, self.events_tx.clone()))
    }

    /// Spawns a task for each enabled pair and waits for all of them to stop.
    ///
    /// Returns each pair's final valuation. Tasks stop when `shutdown` turns `true`.
    pub async fn run(&self, shutdown: watch::Receiver<bool>) -> Result<Vec<(Symbol, ValuationSnapshot)>> {
        tracing::info!("Initializing Portfolio Orchestrator Engine...");

        let connector = LiveConnector::new();
        let history = HistoricalClient::new(&self.settings.binance.rest_base_url);

        // Every pipeline is built before the first task is spawned.
        let mut runners = Vec::new();
        for pair in &self.settings.pairs {
            if !pair.enabled {
                tracing::warn!(symbol = %pair.symbol, "Skipping disabled trading pair.");
                continue;
            }
            runners.push((self.build_runner(pair)?, pair));
        }

        let mut task_handles = vec![];
        for (mut runner, pair) in runners {
            tracing::info!(symbol = %pair.symbol, interval = %pair.interval, "Setting up trading task.");
            if pair.warmup_bars > 0 {
                warm_up(&mut runner, &history, pair).await;
            }

            let stream = connector.subscribe_to_klines(runner.symbol(), &pair.interval, &self.settings.binance.ws_base_url);
            let symbol = runner.symbol().clone();
            let task_shutdown = shutdown.clone();
            let handle = tokio::spawn(async move { runner.run(stream, task_shutdown).await });
            task_handles.push((symbol, handle));
        }

        if task_handles.is_empty() {
            anyhow::bail!("No trading tasks were started. Check the [[pairs]] configuration.");
        }
        tracing::info!(count = task_handles.len(), "All trading tasks have been spawned.");

        let (symbols, handles): (Vec<_>, Vec<_>) = task_handles.into_iter().unzip();
        let results = future::join_all(handles).await;

        let mut finals = Vec::with_capacity(results.len());
        for (symbol, result) in symbols.into_iter().zip(results) {
            match result {
                Ok(snapshot) => finals.push((symbol, snapshot)),
                Err(e) => tracing::error!(symbol = %symbol, error = %e, "Trading task panicked or was aborted."),
            }
        }
        Ok(finals)
    }
}

/// Primes the runner with recent closed klines. Failure only costs a cold start.
async fn warm_up(runner: &mut StreamRunner, history: &HistoricalClient, pair: &PairConfig) {
    // The newest kline returned by the endpoint is still open, so fetch one extra and drop it.
    let limit = pair.warmup_bars.saturating_add(1);
    let fetched = history
        .get_historical_klines(runner.symbol(), &pair.interval, None, Some(limit))
        .await;
    match fetched {
        Ok(mut candles) => {
            candles.pop();
            runner.warm_up(&candles);
        }
        Err(e) => {
            tracing::warn!(symbol = %pair.symbol, error = %e, "Warm-up fetch failed. Starting cold.");
        }
    }
}
