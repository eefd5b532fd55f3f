// In crates/app-config/src/types.rs

use crate::{Error, Result};
use backtester::{BacktestSettings, SweepGrid};
use core_types::StrategyConfig;
use execution::LedgerSettings;
use serde::Deserialize;

#[derive(Deserialize, Debug, Clone)]
pub struct Settings {
    /// The application's general settings.
    pub app: AppSettings,
    /// Settings for the Binance market data endpoints.
    pub binance: BinanceSettings,
    /// The strategy each live pair runs (name plus parameter table).
    pub strategy: StrategyConfig,
    /// Starting balances and sizing of each live pair's ledger.
    pub ledger: LedgerSettings,
    pub backtest: BacktestSettings,
    /// Window ranges for `sweep`. Optional; the CLI refuses to sweep without it.
    #[serde(default)]
    pub sweep: Option<SweepGrid>,
    #[serde(default)]
    pub pairs: Vec<PairConfig>,
}

impl Settings {
    /// Checks everything that deserialization alone cannot.
    pub fn validate(&self) -> Result<()> {
        strategies::factory::create_strategy(&self.strategy)
            .map_err(|e| Error::invalid(format!("strategy `{}`: {e}", self.strategy.name)))?;
        self.ledger
            .validate()
            .map_err(|e| Error::invalid(format!("ledger: {e}")))?;
        self.backtest
            .strategy_settings()
            .validate()
            .map_err(|e| Error::invalid(format!("backtest: {e}")))?;
        if self.backtest.initial_quote_balance <= rust_decimal::Decimal::ZERO {
            return Err(Error::invalid("backtest: initial_quote_balance must be positive"));
        }
        if let Some(grid) = &self.sweep {
            grid.pairs().map_err(|e| Error::invalid(format!("sweep: {e}")))?;
        }
        for pair in &self.pairs {
            if pair.symbol.trim().is_empty() || pair.interval.trim().is_empty() {
                return Err(Error::invalid("pairs: symbol and interval must not be empty"));
            }
        }
        Ok(())
    }

    pub fn enabled_pairs(&self) -> impl Iterator<Item = &PairConfig> {
        self.pairs.iter().filter(|p| p.enabled)
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct AppSettings {
    /// The environment the application is running in (e.g., "development", "production").
    pub environment: String,
    /// The log level for the application.
    pub log_level: String,
    /// Worker threads for parameter sweeps. Defaults to one per core.
    #[serde(default)]
    pub sweep_threads: Option<usize>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct BinanceSettings {
    /// The REST API base URL for Binance.
    pub rest_base_url: String,
    /// The WebSocket base URL for Binance.
    pub ws_base_url: String,
}

/// Configuration for a single trading pair/asset.
#[derive(Deserialize, Debug, Clone)]
pub struct PairConfig {
    pub symbol: String,
    pub interval: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Ignore kline updates the exchange marks as not yet closed.
    #[serde(default = "default_true")]
    pub final_bars_only: bool,
    /// Closed klines fetched over REST before streaming, to fill the averages. 0 disables.
    #[serde(default)]
    pub warmup_bars: u16,
}

fn default_true() -> bool {
    true
}
