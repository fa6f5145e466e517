//! Serializable backtest configuration, loaded from TOML.
//!
//! ```toml
//! [backtest]
//! initial_cash = 100000.0
//! risk_free_rate = 0.02
//!
//! [strategy]
//! type = "ma_crossover"
//! fast_period = 10
//! slow_period = 20
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use replaylab_core::strategy::{BollingerBreakout, MaCrossover, Strategy, StrategyError};

use crate::runner::RunOptions;

/// Errors from loading or validating a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("initial_cash must be positive and finite, got {0}")]
    InvalidInitialCash(f64),

    #[error("risk_free_rate must be finite, got {0}")]
    InvalidRiskFreeRate(f64),

    #[error("invalid strategy parameters: {0}")]
    Strategy(#[from] StrategyError),
}

/// Configuration for a single backtest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestConfig {
    #[serde(default)]
    pub backtest: BacktestSection,
    pub strategy: StrategyConfig,
}

/// Portfolio and metric settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestSection {
    #[serde(default = "default_initial_cash")]
    pub initial_cash: f64,
    /// Annual rate subtracted from the annualized return in Sharpe and Sortino.
    #[serde(default = "default_risk_free_rate")]
    pub risk_free_rate: f64,
}

impl Default for BacktestSection {
    fn default() -> Self {
        Self {
            initial_cash: default_initial_cash(),
            risk_free_rate: default_risk_free_rate(),
        }
    }
}

fn default_initial_cash() -> f64 {
    100_000.0
}

fn default_risk_free_rate() -> f64 {
    0.02
}

/// Strategy selection, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StrategyConfig {
    /// Fast SMA crossing the slow SMA.
    MaCrossover {
        #[serde(default = "default_fast_period")]
        fast_period: usize,
        #[serde(default = "default_slow_period")]
        slow_period: usize,
    },

    /// Close breaking out of Bollinger bands.
    BollingerBreakout {
        #[serde(default = "default_band_period")]
        period: usize,
        #[serde(default = "default_num_std")]
        num_std: f64,
    },
}

fn default_fast_period() -> usize {
    10
}

fn default_slow_period() -> usize {
    20
}

fn default_band_period() -> usize {
    20
}

fn default_num_std() -> f64 {
    2.0
}

impl StrategyConfig {
    /// Every supported strategy with its default parameters.
    pub fn all_defaults() -> Vec<StrategyConfig> {
        vec![
            StrategyConfig::MaCrossover {
                fast_period: default_fast_period(),
                slow_period: default_slow_period(),
            },
            StrategyConfig::BollingerBreakout {
                period: default_band_period(),
                num_std: default_num_std(),
            },
        ]
    }

    /// The `type` tag as written in TOML.
    pub fn type_name(&self) -> &'static str {
        match self {
            StrategyConfig::MaCrossover { .. } => "ma_crossover",
            StrategyConfig::BollingerBreakout { .. } => "bollinger_breakout",
        }
    }

    /// Construct the configured strategy.
    pub fn build(&self) -> Result<Box<dyn Strategy>, StrategyError> {
        Ok(match *self {
            StrategyConfig::MaCrossover {
                fast_period,
                slow_period,
            } => Box::new(MaCrossover::new(fast_period, slow_period)?),
            StrategyConfig::BollingerBreakout { period, num_std } => {
                Box::new(BollingerBreakout::new(period, num_std)?)
            }
        })
    }
}

impl BacktestConfig {
    /// Load and validate a config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "loaded config");
        Self::from_toml(&content)
    }

    /// Parse and validate a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings no run could succeed with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let cash = self.backtest.initial_cash;
        if !(cash.is_finite() && cash > 0.0) {
            return Err(ConfigError::InvalidInitialCash(cash));
        }
        let rf = self.backtest.risk_free_rate;
        if !rf.is_finite() {
            return Err(ConfigError::InvalidRiskFreeRate(rf));
        }
        self.strategy.build()?;
        Ok(())
    }

    pub fn run_options(&self) -> RunOptions {
        RunOptions {
            initial_cash: self.backtest.initial_cash,
            risk_free_rate: self.backtest.risk_free_rate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_ma_crossover() {
        let config = BacktestConfig::from_toml(
            r#"
[backtest]
initial_cash = 5000.0
risk_free_rate = 0.01

[strategy]
type = "ma_crossover"
fast_period = 5
slow_period = 30
"#,
        )
        .unwrap();

        assert_eq!(config.backtest.initial_cash, 5000.0);
        assert_eq!(config.backtest.risk_free_rate, 0.01);
        assert_eq!(
            config.strategy,
            StrategyConfig::MaCrossover {
                fast_period: 5,
                slow_period: 30
            }
        );
    }

    #[test]
    fn missing_keys_take_defaults() {
        let config = BacktestConfig::from_toml(
            r#"
[strategy]
type = "bollinger_breakout"
"#,
        )
        .unwrap();

        assert_eq!(config.backtest, BacktestSection::default());
        assert_eq!(
            config.strategy,
            StrategyConfig::BollingerBreakout {
                period: 20,
                num_std: 2.0
            }
        );
        let options = config.run_options();
        assert_eq!(options.initial_cash, 100_000.0);
        assert_eq!(options.risk_free_rate, 0.02);
    }

    #[test]
    fn unknown_strategy_type_is_parse_error() {
        let err = BacktestConfig::from_toml(
            r#"
[strategy]
type = "rsi_reversal"
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn rejects_non_positive_cash() {
        let err = BacktestConfig::from_toml(
            r#"
[backtest]
initial_cash = 0.0

[strategy]
type = "ma_crossover"
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidInitialCash(_)));
    }

    #[test]
    fn rejects_invalid_strategy_params() {
        let err = BacktestConfig::from_toml(
            r#"
[strategy]
type = "ma_crossover"
fast_period = 0
"#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Strategy(StrategyError::InvalidPeriod { .. })
        ));
    }

    #[test]
    fn build_returns_named_strategy() {
        for config in StrategyConfig::all_defaults() {
            let strategy = config.build().unwrap();
            assert_eq!(strategy.name(), config.type_name());
        }
    }

    #[test]
    fn serializes_with_type_tag() {
        let json = serde_json::to_value(StrategyConfig::MaCrossover {
            fast_period: 3,
            slow_period: 8,
        })
        .unwrap();
        assert_eq!(json["type"], "ma_crossover");
        assert_eq!(json["fast_period"], 3);
    }
}
