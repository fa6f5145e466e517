//! ReplayLab Runner — backtest orchestration, metrics, configuration and data loading.
//!
//! This crate builds on `replaylab-core` to provide:
//! - Performance metrics over the trade log and value series
//! - Single-backtest runner (strategy → simulator → metrics)
//! - TOML configuration with strategy selection
//! - CSV bar loading into a validated series
//! - Run fingerprinting

pub mod config;
pub mod data_loader;
pub mod fingerprint;
pub mod metrics;
pub mod runner;

pub use config::{BacktestConfig, BacktestSection, ConfigError, StrategyConfig};
pub use data_loader::{load_bars_csv, read_bars, LoadError};
pub use fingerprint::RunManifest;
pub use metrics::{BasicMetrics, PerformanceMetrics, RoundTrip};
pub use runner::{run_backtest, run_from_config, BacktestResult, RunError, RunOptions};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn performance_metrics_is_send_sync() {
        assert_send::<PerformanceMetrics>();
        assert_sync::<PerformanceMetrics>();
    }

    #[test]
    fn backtest_result_is_send_sync() {
        assert_send::<BacktestResult>();
        assert_sync::<BacktestResult>();
    }

    #[test]
    fn config_is_send_sync() {
        assert_send::<BacktestConfig>();
        assert_sync::<BacktestConfig>();
    }

    #[test]
    fn errors_are_send_sync() {
        assert_send::<RunError>();
        assert_sync::<RunError>();
        assert_send::<ConfigError>();
        assert_sync::<ConfigError>();
        assert_send::<LoadError>();
        assert_sync::<LoadError>();
    }
}
