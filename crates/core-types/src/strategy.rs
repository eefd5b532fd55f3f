use serde::Deserialize;
use toml::Value;

/// Names a signal strategy and carries its raw parameter table.
#[derive(Deserialize, Debug, Clone)]
pub struct StrategyConfig {
    pub name: String,
    // This will hold the `params = { ... }` table from the TOML
    #[serde(default = "empty_params")]
    pub params: Value,
}

fn empty_params() -> Value {
    Value::Table(Default::default())
}
