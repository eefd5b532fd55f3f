// In crates/app-config/src/lib.rs

use config::{Config, Environment, File};
use std::path::Path;

pub mod error;
pub mod types;

// Re-export the most important types for easy access.
pub use error::{Error, Result};
pub use types::{AppSettings, BinanceSettings, PairConfig, Settings};

/// Loads and validates the application settings from `./config`.
///
/// The environment name comes from `APP_ENVIRONMENT` and defaults to "development".
pub fn load_settings() -> Result<Settings> {
    let environment = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "development".into());
    load_settings_from(Path::new("config"), &environment)
}

/// Layered loading:
/// 1. Reads from a default `base.toml` file.
/// 2. Merges settings from an environment-specific file (e.g., `development.toml`), if present.
/// 3. Merges settings from environment variables (e.g., `APP__LEDGER__LEVERAGE=2`).
pub fn load_settings_from(config_dir: &Path, environment: &str) -> Result<Settings> {
    let base = config_dir.join("base");
    let env_file = config_dir.join(environment);

    let settings = Config::builder()
        .add_source(File::with_name(&base.to_string_lossy()))
        .add_source(File::with_name(&env_file.to_string_lossy()).required(false))
        .add_source(Environment::with_prefix("APP").separator("__"))
        .build()?;

    let settings: Settings = settings.try_deserialize()?;
    settings.validate()?;
    Ok(settings)
}
