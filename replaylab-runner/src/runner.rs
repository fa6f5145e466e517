//! Backtest runner — wires together strategy, simulator and metrics.
//!
//! Two entry points:
//! - `run_backtest()`: a strategy value plus a validated bar series.
//! - `run_from_config()`: builds the strategy and options from a `BacktestConfig`. Used by the CLI.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use replaylab_core::domain::{value_series, BarSeries, PortfolioValuePoint, SignalRow, Trade};
use replaylab_core::engine::{Simulator, SimulatorError};
use replaylab_core::strategy::{Strategy, StrategyError};

use crate::config::BacktestConfig;
use crate::metrics::{deserialize_unbounded_ratio, PerformanceMetrics};

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("strategy error: {0}")]
    Strategy(#[from] StrategyError),
    #[error("simulation error: {0}")]
    Simulator(#[from] SimulatorError),
}

/// Portfolio and metric settings for one run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunOptions {
    pub initial_cash: f64,
    pub risk_free_rate: f64,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            initial_cash: 100_000.0,
            risk_free_rate: 0.02,
        }
    }
}

/// Complete result of a single backtest run, as one flat record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestResult {
    pub strategy: String,
    pub trades: Vec<Trade>,
    pub total_trades: usize,
    pub final_cash: f64,
    pub final_shares: f64,
    pub final_portfolio_value: f64,
    pub total_return: f64,
    pub portfolio_values: Vec<PortfolioValuePoint>,
    pub initial_cash: f64,
    pub round_trips: usize,
    pub win_rate: f64,
    pub avg_win: f64,
    pub avg_loss: f64,
    pub avg_trade_return: f64,
    pub sharpe_ratio: f64,
    #[serde(deserialize_with = "deserialize_unbounded_ratio")]
    pub sortino_ratio: f64,
    pub max_drawdown: f64,
    pub volatility: f64,
    /// Per-bar indicator values and flags, for charting.
    pub signals: Vec<SignalRow>,
}

/// Run one backtest: signals, then simulation, then metrics.
///
/// The simulator's final portfolio value is authoritative; the metrics engine
/// only derives returns and statistics from the value series.
pub fn run_backtest(
    strategy: &dyn Strategy,
    bars: &BarSeries,
    options: &RunOptions,
) -> Result<BacktestResult, RunError> {
    let span = tracing::info_span!("backtest", strategy = strategy.name(), bars = bars.len());
    let _guard = span.enter();

    let simulator = Simulator::new(options.initial_cash)?;
    let signals = strategy.generate_signals(bars);
    let outcome = simulator.run(bars, &signals)?;

    let values = value_series(&outcome.portfolio_values);
    let metrics = PerformanceMetrics::compute(
        outcome.initial_cash,
        &outcome.trades,
        &values,
        options.risk_free_rate,
    );

    if metrics.basic.final_portfolio_value != outcome.final_portfolio_value {
        tracing::warn!(
            simulator = outcome.final_portfolio_value,
            metrics = metrics.basic.final_portfolio_value,
            "final portfolio value disagreement; keeping simulator value"
        );
    }

    tracing::info!(
        trades = outcome.trades.len(),
        round_trips = metrics.basic.round_trips,
        final_portfolio_value = outcome.final_portfolio_value,
        total_return = metrics.basic.total_return,
        "backtest complete"
    );

    Ok(BacktestResult {
        strategy: strategy.name().to_string(),
        total_trades: metrics.basic.total_trades,
        final_cash: outcome.final_cash,
        final_shares: outcome.final_shares,
        final_portfolio_value: outcome.final_portfolio_value,
        total_return: metrics.basic.total_return,
        portfolio_values: outcome.portfolio_values,
        initial_cash: outcome.initial_cash,
        round_trips: metrics.basic.round_trips,
        win_rate: metrics.basic.win_rate,
        avg_win: metrics.basic.avg_win,
        avg_loss: metrics.basic.avg_loss,
        avg_trade_return: metrics.basic.avg_trade_return,
        sharpe_ratio: metrics.sharpe_ratio,
        sortino_ratio: metrics.sortino_ratio,
        max_drawdown: metrics.max_drawdown,
        volatility: metrics.volatility,
        trades: outcome.trades,
        signals,
    })
}

/// Build the configured strategy and run it over `bars`.
pub fn run_from_config(
    config: &BacktestConfig,
    bars: &BarSeries,
) -> Result<BacktestResult, RunError> {
    let strategy = config.strategy.build()?;
    run_backtest(strategy.as_ref(), bars, &config.run_options())
}
