//! Bollinger breakout — close crossing outside the bands.
//!
//! Buy when the close moves from at-or-below the upper band on the previous
//! bar to strictly above the upper band on the current bar. Sell on the mirror
//! move through the lower band. Each side of the comparison uses the band of
//! its own bar, so the previous close is tested against the previous band.

use super::{require_period, Strategy, StrategyError};
use crate::domain::{Bar, SignalRow};
use crate::indicators::{Bollinger, Indicator};
use std::collections::BTreeMap;

const NAME: &str = "bollinger_breakout";

#[derive(Debug, Clone)]
pub struct BollingerBreakout {
    period: usize,
    num_std: f64,
}

impl BollingerBreakout {
    pub fn new(period: usize, num_std: f64) -> Result<Self, StrategyError> {
        let period = require_period(NAME, "period", period)?;
        if !(num_std.is_finite() && num_std > 0.0) {
            return Err(StrategyError::InvalidMultiplier {
                strategy: NAME,
                param: "num_std",
                value: num_std,
            });
        }
        Ok(Self { period, num_std })
    }

    pub fn default_params() -> Self {
        Self {
            period: 20,
            num_std: 2.0,
        }
    }

    pub fn period(&self) -> usize {
        self.period
    }

    pub fn num_std(&self) -> f64 {
        self.num_std
    }
}

impl Strategy for BollingerBreakout {
    fn name(&self) -> &str {
        NAME
    }

    /// The first band exists at `period - 1`; a breakout also needs the band
    /// of the bar before, so the first possible signal is at `period`.
    fn warmup_bars(&self) -> usize {
        self.period
    }

    fn generate_signals(&self, bars: &[Bar]) -> Vec<SignalRow> {
        let middle = Bollinger::middle(self.period, self.num_std).compute(bars);
        let upper = Bollinger::upper(self.period, self.num_std).compute(bars);
        let lower = Bollinger::lower(self.period, self.num_std).compute(bars);

        bars.iter()
            .enumerate()
            .map(|(i, bar)| {
                let (buy_signal, sell_signal) = match i.checked_sub(1) {
                    Some(prev) => {
                        let prev_close = bars[prev].close;
                        let buy = match (upper[prev], upper[i]) {
                            (Some(prev_upper), Some(cur_upper)) => {
                                prev_close <= prev_upper && bar.close > cur_upper
                            }
                            _ => false,
                        };
                        let sell = match (lower[prev], lower[i]) {
                            (Some(prev_lower), Some(cur_lower)) => {
                                prev_close >= prev_lower && bar.close < cur_lower
                            }
                            _ => false,
                        };
                        (buy, sell)
                    }
                    None => (false, false),
                };

                let mut indicators = BTreeMap::new();
                indicators.insert("middle_band".to_string(), middle[i]);
                indicators.insert("upper_band".to_string(), upper[i]);
                indicators.insert("lower_band".to_string(), lower[i]);

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
