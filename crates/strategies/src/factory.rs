use crate::types::MACrossoverSettings;
use crate::{Error, Result, Strategy, ma_crossover::MACrossover, ma_level::MALevel};
use core_types::StrategyConfig;

/// Builds a strategy instance from its configured name and parameter table.
pub fn create_strategy(strat_config: &StrategyConfig) -> Result<Box<dyn Strategy + Send + Sync>> {
    let strategy: Box<dyn Strategy + Send + Sync> = match strat_config.name.as_str() {
        "ma_crossover" => {
            let settings: MACrossoverSettings = strat_config.params.clone().try_into()?;
            Box::new(MACrossover::new(settings)?)
        }
        "ma_level" => {
            let settings: MACrossoverSettings = strat_config.params.clone().try_into()?;
            Box::new(MALevel::new(settings)?)
        }
        unknown => return Err(Error::UnknownStrategy(unknown.to_string())),
    };
    tracing::debug!(name = strategy.name(), "Strategy created.");
    Ok(strategy)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(name: &str, params: &str) -> StrategyConfig {
        StrategyConfig {
            name: name.to_string(),
            params: toml::from_str(params).unwrap(),
        }
    }

    #[test]
    fn builds_known_strategies() {
        let crossover = create_strategy(&config("ma_crossover", "short_window = 5\nlong_window = 10")).unwrap();
        assert_eq!(crossover.name(), "MACrossover");
        let level = create_strategy(&config("ma_level", "short_window = 13\nlong_window = 48\nwarmup = \"partial\"")).unwrap();
        assert_eq!(level.name(), "MALevel");
    }

    #[test]
    fn rejects_unknown_names_and_bad_params() {
        assert!(matches!(
            create_strategy(&config("supertrend", "short_window = 1\nlong_window = 2")),
            Err(Error::UnknownStrategy(_))
        ));
        assert!(matches!(
            create_strategy(&config("ma_crossover", "short_window = 1")),
            Err(Error::ParamsError(_))
        ));
        assert!(matches!(
            create_strategy(&config("ma_crossover", "short_window = 9\nlong_window = 2")),
            Err(Error::InvalidSettings(_))
        ));
    }
}
