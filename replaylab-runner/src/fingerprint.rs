//! Run fingerprinting — deterministic identification of a backtest's inputs.
//!
//! - `config_hash`: BLAKE3 over the canonical JSON of the `BacktestConfig`.
//! - `dataset_hash`: BLAKE3 over the canonical JSON of the bar series.
//!
//! Two runs with the same manifest ran the same strategy on the same data.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use replaylab_core::domain::BarSeries;

use crate::config::BacktestConfig;

/// Identity of one backtest run, written next to its result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunManifest {
    pub strategy: String,
    pub config_hash: String,
    pub dataset_hash: String,
    pub bar_count: usize,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl RunManifest {
    pub fn new(config: &BacktestConfig, bars: &BarSeries) -> Result<Self, serde_json::Error> {
        Ok(Self {
            strategy: config.strategy.type_name().to_string(),
            config_hash: hash_json(config)?,
            dataset_hash: dataset_hash(bars)?,
            bar_count: bars.len(),
            start_date: bars.first_date(),
            end_date: bars.last_date(),
        })
    }
}

/// Content hash of a bar series.
pub fn dataset_hash(bars: &BarSeries) -> Result<String, serde_json::Error> {
    hash_json(bars)
}

fn hash_json<T: Serialize + ?Sized>(value: &T) -> Result<String, serde_json::Error> {
    let bytes = serde_json::to_vec(value)?;
    Ok(blake3::hash(&bytes).to_hex().to_string())
}
