//! SignalRow — a bar augmented with strategy indicators and buy/sell flags.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One row of strategy output, aligned 1:1 with the input bars.
///
/// Indicator values are `None` while the rolling window has insufficient
/// history. `BTreeMap` keeps key order deterministic so identical inputs
/// serialize identically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalRow {
    pub date: NaiveDate,
    pub close: f64,
    pub indicators: BTreeMap<String, Option<f64>>,
    pub buy_signal: bool,
    pub sell_signal: bool,
}

impl SignalRow {
    /// A row with no indicators and no signal.
    pub fn flat(date: NaiveDate, close: f64) -> Self {
        Self {
            date,
            close,
            indicators: BTreeMap::new(),
            buy_signal: false,
            sell_signal: false,
        }
    }

    /// Look up an indicator value. `None` if the key is absent or the value
    /// had insufficient history.
    pub fn indicator(&self, name: &str) -> Option<f64> {
        self.indicators.get(name).copied().flatten()
    }

    pub fn has_signal(&self) -> bool {
        self.buy_signal || self.sell_signal
    }
}
