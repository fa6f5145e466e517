//! Bar loading for the runner.
//!
//! Reads daily OHLCV rows from CSV, with either lowercase
//! (`date,open,high,low,close,volume`) or capitalized vendor-style headers
//! (`Date,Open,High,Low,Close,Adj Close,Volume`). Extra columns are ignored.
//! Rows are sorted ascending by date, then validated into a `BarSeries`;
//! any bad row fails the whole load.

use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Deserialize;
use thiserror::Error;

use replaylab_core::domain::{Bar, BarError, BarSeries};

/// Errors from the data loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("row {row}: unparseable date '{value}'")]
    InvalidDate { row: usize, value: String },

    #[error("bar {date}: volume must be a non-negative number, got {value}")]
    InvalidVolume { date: NaiveDate, value: f64 },

    #[error("invalid bar series: {0}")]
    Bars(#[from] BarError),
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(alias = "Date", alias = "Datetime")]
    date: String,
    #[serde(alias = "Open")]
    open: f64,
    #[serde(alias = "High")]
    high: f64,
    #[serde(alias = "Low")]
    low: f64,
    #[serde(alias = "Close")]
    close: f64,
    #[serde(alias = "Volume", default)]
    volume: f64,
}

impl CsvRow {
    fn into_bar(self, row: usize) -> Result<Bar, LoadError> {
        let date = parse_date(&self.date).ok_or_else(|| LoadError::InvalidDate {
            row,
            value: self.date.clone(),
        })?;
        if !(self.volume.is_finite() && self.volume >= 0.0) {
            return Err(LoadError::InvalidVolume {
                date,
                value: self.volume,
            });
        }
        Ok(Bar {
            date,
            open: self.open,
            high: self.high,
            low: self.low,
            close: self.close,
            volume: self.volume.round() as u64,
        })
    }
}

/// Accepts `YYYY-MM-DD`, optionally followed by a time part
/// (`2024-01-02 00:00:00-05:00`, `2024-01-02T00:00:00`).
fn parse_date(value: &str) -> Option<NaiveDate> {
    let day = value.get(..10).unwrap_or(value);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

/// Parse CSV bars from any reader.
pub fn read_bars<R: Read>(reader: R) -> Result<BarSeries, LoadError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut bars = Vec::new();
    for (i, record) in csv_reader.deserialize::<CsvRow>().enumerate() {
        // Row numbers count the header as row 1.
        bars.push(record?.into_bar(i + 2)?);
    }
    bars.sort_by_key(|bar| bar.date);

    tracing::debug!(bars = bars.len(), "parsed CSV bars");
    Ok(BarSeries::new(bars)?)
}

/// Load a CSV bar file from disk.
pub fn load_bars_csv(path: &Path) -> Result<BarSeries, LoadError> {
    let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let series = read_bars(std::io::BufReader::new(file))?;
    tracing::debug!(
        path = %path.display(),
        start = %series.first_date(),
        end = %series.last_date(),
        "loaded bar file"
    );
    Ok(series)
}
