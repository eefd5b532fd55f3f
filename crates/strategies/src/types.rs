// In crates/strategies/src/types.rs

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// How averages behave before a window has filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarmupPolicy {
    /// Undefined until the full window has been observed.
    #[default]
    Strict,
    /// Mean of whatever has been observed so far.
    Partial,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct MACrossoverSettings {
    pub short_window: usize,
    pub long_window: usize,
    #[serde(default)]
    pub warmup: WarmupPolicy,
}

impl MACrossoverSettings {
    pub fn new(short_window: usize, long_window: usize) -> Self {
        Self {
            short_window,
            long_window,
            warmup: WarmupPolicy::Strict,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.short_window == 0 {
            return Err(Error::InvalidSettings("short_window must be greater than 0".to_string()));
        }
        if self.short_window >= self.long_window {
            return Err(Error::InvalidSettings(format!(
                "short_window ({}) must be less than long_window ({})",
                self.short_window, self.long_window
            )));
        }
        Ok(())
    }
}
