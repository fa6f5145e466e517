//! Moving average crossover — golden cross buys, death cross sells.
//!
//! `fast_above_slow[i]` is true only when both SMAs are defined at `i` and
//! fast > slow. A buy fires on a false → true transition, a sell on
//! true → false. A bar whose averages lack history counts as "not above", so
//! the first bar where both averages exist can already be a golden cross.

use super::{require_period, Strategy, StrategyError};
use crate::domain::{Bar, SignalRow};
use crate::indicators::{Indicator, Sma};
use std::collections::BTreeMap;

const NAME: &str = "ma_crossover";

/// Moving average crossover strategy over close prices.
///
/// No ordering between the periods is enforced. With `fast_period >=
/// slow_period` the fast average is never the faster one and crossovers
/// become rare or impossible; keeping `fast < slow` is the caller's job.
#[derive(Debug, Clone)]
pub struct MaCrossover {
    fast: Sma,
    slow: Sma,
}

impl MaCrossover {
    pub fn new(fast_period: usize, slow_period: usize) -> Result<Self, StrategyError> {
        let fast_period = require_period(NAME, "fast_period", fast_period)?;
        let slow_period = require_period(NAME, "slow_period", slow_period)?;
        Ok(Self {
            fast: Sma::new(fast_period),
            slow: Sma::new(slow_period),
        })
    }

    pub fn default_params() -> Self {
        Self {
            fast: Sma::new(10),
            slow: Sma::new(20),
        }
    }

    pub fn fast_period(&self) -> usize {
        self.fast.period()
    }

    pub fn slow_period(&self) -> usize {
        self.slow.period()
    }
}

impl Strategy for MaCrossover {
    fn name(&self) -> &str {
        NAME
    }

    fn warmup_bars(&self) -> usize {
        self.fast.lookback().max(self.slow.lookback())
    }

    fn generate_signals(&self, bars: &[Bar]) -> Vec<SignalRow> {
        let fast_ma = self.fast.compute(bars);
        let slow_ma = self.slow.compute(bars);

        let fast_above_slow: Vec<bool> = fast_ma
            .iter()
            .zip(&slow_ma)
            .map(|pair| match pair {
                (Some(fast), Some(slow)) => fast > slow,
                _ => false,
            })
            .collect();

        bars.iter()
            .enumerate()
            .map(|(i, bar)| {
                let (buy_signal, sell_signal) = match i.checked_sub(1) {
                    Some(prev) => {
                        let now = fast_above_slow[i];
                        let before = fast_above_slow[prev];
                        (now && !before, !now && before)
                    }
                    None => (false, false),
                };

                let mut indicators = BTreeMap::new();
                indicators.insert("fast_ma".to_string(), fast_ma[i]);
                indicators.insert("slow_ma".to_string(), slow_ma[i]);

                SignalRow {
                    date: bar.date,
                    close: bar.close,
                    indicators,
                    buy_signal,
                    sell_signal,
                }
            })
            .collect()
    }
}
