//! Portfolio valuation snapshots.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Mark-to-market value of the account at the close of one bar:
/// `cash + shares × close`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PortfolioValuePoint {
    pub date: NaiveDate,
    pub portfolio_value: f64,
}

/// Extract the bare value series (metrics operate on plain `f64` slices).
pub fn value_series(points: &[PortfolioValuePoint]) -> Vec<f64> {
    points.iter().map(|p| p.portfolio_value).collect()
}
