use crate::KLINE_HISTORY_SIZE;
use core_types::{Candle, CandleEvent, CandleSeries, Symbol, TradeRecord, ValuationSnapshot};
use events::EngineEvent;
use execution::PortfolioLedger;
use futures::{Stream, StreamExt};
use rust_decimal::Decimal;
use std::fmt::Display;
use strategies::Strategy;
use tokio::sync::{broadcast, watch};

/// What happened to one incoming event.
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    /// An update for a bar that has not closed yet. Nothing was traded.
    Skipped,
    /// The event was malformed or out of order; nothing changed.
    Rejected(String),
    Applied {
        trade: Option<TradeRecord>,
        snapshot: ValuationSnapshot,
    },
}

/// The live pipeline for one pair: series, strategy and ledger, fed one candle at a time.
///
/// Everything is owned by the runner, so pairs never share mutable state. Observers read the
/// latest valuation through `subscribe_valuation` and trades through the event channel.
pub struct StreamRunner {
    symbol: Symbol,
    series: CandleSeries,
    strategy: Box<dyn Strategy + Send + Sync>,
    ledger: PortfolioLedger,
    final_bars_only: bool,
    /// Latest update of the bar that has not closed yet.
    pending: Option<Candle>,
    events_tx: broadcast::Sender<EngineEvent>,
    snapshot_tx: watch::Sender<Option<ValuationSnapshot>>,
}

impl StreamRunner {
    pub fn new(
        strategy: Box<dyn Strategy + Send + Sync>,
        ledger: PortfolioLedger,
        final_bars_only: bool,
        events_tx: broadcast::Sender<EngineEvent>,
    ) -> Self {
        let symbol = ledger.symbol().clone();
        let (snapshot_tx, _) = watch::channel(None);
        Self {
            series: CandleSeries::new(symbol.clone(), KLINE_HISTORY_SIZE),
            symbol,
            strategy,
            ledger,
            final_bars_only,
            pending: None,
            events_tx,
            snapshot_tx,
        }
    }

    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    pub fn ledger(&self) -> &PortfolioLedger {
        &self.ledger
    }

    /// Latest valuation, updated after every applied candle. `None` until the first one.
    pub fn subscribe_valuation(&self) -> watch::Receiver<Option<ValuationSnapshot>> {
        self.snapshot_tx.subscribe()
    }

    /// Feeds closed historical candles through the series and the strategy without trading,
    /// so the averages are ready when the live stream starts.
    pub fn warm_up(&mut self, candles: &[Candle]) -> usize {
        let mut used = 0;
        for candle in candles {
            match self.series.append(candle.clone()) {
                Ok(()) => {
                    // Signals during warm-up are dropped; only the comparison state matters.
                    let _ = self.strategy.assess(candle);
                    used += 1;
                }
                Err(e) => tracing::warn!(symbol = %self.symbol, error = %e, "Skipping warm-up candle."),
            }
        }
        tracing::info!(symbol = %self.symbol, candles = used, "Task warmup complete.");
        used
    }

    /// Processes one event synchronously. The ledger is only touched once the event has
    /// been fully parsed and accepted by the series.
    ///
    /// With `final_bars_only` off, updates of a still-open bar replace each other in a
    /// pending slot. The pending bar is committed by its final update, or by the first
    /// update of a later bar when the final one never arrived.
    pub fn on_event(&mut self, event: &CandleEvent) -> StepOutcome {
        let open_bar = event.is_final == Some(false);
        if open_bar && self.final_bars_only {
            return StepOutcome::Skipped;
        }

        let candle = match event.to_candle() {
            Ok(candle) => candle,
            Err(e) => return self.reject(e.to_string()),
        };
        if candle.symbol != self.symbol {
            return self.reject(format!("candle for {} sent to the {} pipeline", candle.symbol, self.symbol));
        }

        let mut committed = None;
        if let Some(pending) = self.pending.take() {
            if candle.timestamp < pending.timestamp {
                let reason = self.out_of_order(candle.timestamp, pending.timestamp);
                self.pending = Some(pending);
                return self.reject(reason);
            }
            if candle.timestamp > pending.timestamp {
                tracing::debug!(symbol = %self.symbol, timestamp = pending.timestamp, "Committing bar without a final update.");
                committed = Some(self.apply(pending));
            }
            // Same timestamp: the newer update supersedes the pending one.
        }

        if open_bar {
            if let Some(last) = self.series.last() {
                if candle.timestamp <= last.timestamp {
                    let reason = self.out_of_order(candle.timestamp, last.timestamp);
                    return self.reject(reason);
                }
            }
            self.pending = Some(candle);
            return committed.unwrap_or(StepOutcome::Skipped);
        }
        self.apply(candle)
    }

    /// The bar still waiting for its final update, if any.
    pub fn pending_bar(&self) -> Option<&Candle> {
        self.pending.as_ref()
    }

    fn apply(&mut self, candle: Candle) -> StepOutcome {
        if let Err(e) = self.series.append(candle.clone()) {
            return self.reject(e.to_string());
        }

        let signal = self.strategy.assess(&candle);
        if !signal.is_hold() {
            tracing::info!(symbol = %self.symbol, ?signal, close = %candle.close, "Strategy generated a signal.");
        }

        let trade = match self.ledger.on_signal(signal, candle.close, candle.timestamp) {
            Ok(trade) => trade,
            Err(e) => {
                // The ledger is unchanged on error; the candle still counts as observed.
                tracing::error!(symbol = %self.symbol, error = %e, "Ledger rejected the signal.");
                None
            }
        };

        let snapshot = self.ledger.snapshot(candle.timestamp, candle.close);
        if let Some(trade) = &trade {
            let _ = self.events_tx.send(EngineEvent::TradeExecuted(trade.clone()));
        }
        let _ = self.events_tx.send(EngineEvent::Valuation(snapshot.clone()));
        self.snapshot_tx.send_replace(Some(snapshot.clone()));

        StepOutcome::Applied { trade, snapshot }
    }

    fn out_of_order(&self, timestamp: i64, last_timestamp: i64) -> String {
        core_types::Error::OutOfOrder {
            symbol: self.symbol.0.clone(),
            timestamp,
            last_timestamp,
        }
        .to_string()
    }

    fn reject(&self, reason: String) -> StepOutcome {
        tracing::warn!(symbol = %self.symbol, %reason, "Candle rejected.");
        let _ = self.events_tx.send(EngineEvent::CandleRejected {
            symbol: self.symbol.0.clone(),
            reason: reason.clone(),
        });
        StepOutcome::Rejected(reason)
    }

    /// Valuation at the last committed close. A pending open bar is not included. Before any
    /// candle the base balance is marked at zero.
    pub fn final_snapshot(&self) -> ValuationSnapshot {
        match self.series.last() {
            Some(last) => self.ledger.snapshot(last.timestamp, last.close),
            None => self.ledger.snapshot(0, Decimal::ZERO),
        }
    }

    /// The main, long-running loop for this pair.
    ///
    /// Runs until the stream ends or `shutdown` turns `true`, then publishes and returns one
    /// final snapshot. Stream errors are reported as rejected candles and do not stop the loop.
    pub async fn run<S, E>(mut self, stream: S, mut shutdown: watch::Receiver<bool>) -> ValuationSnapshot
    where
        S: Stream<Item = Result<CandleEvent, E>>,
        E: Display,
    {
        tracing::info!(
            symbol = %self.symbol,
            strategy = self.strategy.name(),
            sizing = self.ledger.policy_name(),
            "Starting trading task."
        );
        futures::pin_mut!(stream);
        let already_cancelled = *shutdown.borrow_and_update();
        let mut shutdown_open = true;

        if !already_cancelled {
            loop {
                tokio::select! {
                    biased;
                    changed = shutdown.changed(), if shutdown_open => match changed {
                        Ok(()) if *shutdown.borrow_and_update() => {
                            tracing::info!(symbol = %self.symbol, "Shutdown requested.");
                            break;
                        }
                        Ok(()) => {}
                        // Nobody can cancel any more; keep consuming the stream.
                        Err(_) => shutdown_open = false,
                    },
                    next = stream.next() => match next {
                        Some(Ok(event)) => {
                            self.on_event(&event);
                        }
                        Some(Err(e)) => {
                            self.reject(e.to_string());
                        }
                        None => {
                            tracing::warn!(symbol = %self.symbol, "Candle stream ended.");
                            break;
                        }
                    },
                }
            }
        }

        let snapshot = self.final_snapshot();
        self.snapshot_tx.send_replace(Some(snapshot.clone()));
        let _ = self.events_tx.send(EngineEvent::Valuation(snapshot.clone()));
        tracing::info!(
            symbol = %self.symbol,
            quote_balance = %snapshot.quote_balance,
            base_balance = %snapshot.base_balance,
            total_value = %snapshot.total_value,
            "Trading task stopped."
        );
        snapshot
    }
}
