//! Strategies — pure functions from a bar series to one signal row per bar.
//!
//! Strategies are portfolio-agnostic: they receive bar history only, never
//! cash, shares or position. Whether a signal is acted upon is decided by the
//! simulator's gating, not by the strategy.

pub mod bollinger;
pub mod ma_crossover;

pub use bollinger::BollingerBreakout;
pub use ma_crossover::MaCrossover;

use crate::domain::{Bar, SignalRow};
use thiserror::Error;

/// Configuration errors, raised by strategy constructors before any computation.
#[derive(Debug, Error, PartialEq)]
pub enum StrategyError {
    #[error("{strategy}: {param} must be >= 1, got {value}")]
    InvalidPeriod {
        strategy: &'static str,
        param: &'static str,
        value: usize,
    },

    #[error("{strategy}: {param} must be positive and finite, got {value}")]
    InvalidMultiplier {
        strategy: &'static str,
        param: &'static str,
        value: f64,
    },
}

/// Trait for signal-generating strategies.
///
/// # Contract
/// - `generate_signals` returns exactly one row per input bar, in input order.
/// - It is deterministic: identical input yields bit-identical output. No
///   interior mutability may influence the computation.
/// - Row `i` may only depend on `bars[0..=i]`.
pub trait Strategy: Send + Sync {
    /// Machine-readable name (e.g., "ma_crossover").
    fn name(&self) -> &str;

    /// Number of leading bars that can never carry a signal.
    fn warmup_bars(&self) -> usize;

    fn generate_signals(&self, bars: &[Bar]) -> Vec<SignalRow>;
}

/// Validate a window length.
pub(crate) fn require_period(
    strategy: &'static str,
    param: &'static str,
    value: usize,
) -> Result<usize, StrategyError> {
    if value == 0 {
        return Err(StrategyError::InvalidPeriod {
            strategy,
            param,
            value,
        });
    }
    Ok(value)
}
