//! Bar — the fundamental market data unit — and the validated series the engine replays.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::ops::Deref;
use thiserror::Error;

/// OHLCV bar for a single day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl Bar {
    /// Check that every OHLC price is finite and positive.
    pub fn validate_prices(&self) -> Result<(), BarError> {
        for (field, value) in self.prices() {
            if !value.is_finite() {
                return Err(BarError::NonFinitePrice {
                    date: self.date,
                    field,
                });
            }
            if value <= 0.0 {
                return Err(BarError::NonPositivePrice {
                    date: self.date,
                    field,
                    value,
                });
            }
        }
        Ok(())
    }

    fn prices(&self) -> [(&'static str, f64); 4] {
        [
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("close", self.close),
        ]
    }
}

/// Data-quality errors raised while building a [`BarSeries`].
///
/// Anomalous bars are rejected, never skipped: a series either validates in
/// full or is not built at all.
#[derive(Debug, Error, PartialEq)]
pub enum BarError {
    #[error("bar series is empty")]
    Empty,

    #[error("bar dates must be strictly ascending: {current} follows {previous}")]
    NotAscending {
        previous: NaiveDate,
        current: NaiveDate,
    },

    #[error("bar {date}: {field} price must be positive, got {value}")]
    NonPositivePrice {
        date: NaiveDate,
        field: &'static str,
        value: f64,
    },

    #[error("bar {date}: {field} price is not a finite number")]
    NonFinitePrice {
        date: NaiveDate,
        field: &'static str,
    },
}

/// A validated, immutable, non-empty bar series.
///
/// Invariants checked at construction:
/// - at least one bar
/// - dates strictly ascending (unique); gaps are allowed
/// - every OHLC price finite and positive
///
/// High/low consistency is not enforced; the engine only trades on `close`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarSeries {
    bars: Vec<Bar>,
}

impl BarSeries {
    pub fn new(bars: Vec<Bar>) -> Result<Self, BarError> {
        if bars.is_empty() {
            return Err(BarError::Empty);
        }

        for bar in &bars {
            bar.validate_prices()?;
        }

        for pair in bars.windows(2) {
            if pair[1].date <= pair[0].date {
                return Err(BarError::NotAscending {
                    previous: pair[0].date,
                    current: pair[1].date,
                });
            }
        }

        Ok(Self { bars })
    }

    pub fn first_date(&self) -> NaiveDate {
        self.bars[0].date
    }

    pub fn last_date(&self) -> NaiveDate {
        self.bars[self.bars.len() - 1].date
    }
}

impl Deref for BarSeries {
    type Target = [Bar];

    fn deref(&self) -> &[Bar] {
        &self.bars
    }
}
