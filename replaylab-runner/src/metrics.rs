//! Performance metrics — pure functions that compute strategy statistics.
//!
//! Every metric is a pure function: value series and/or trade log in, scalar out.
//! Returns are simple period-over-period returns annualized with 252 periods per
//! year; standard deviations are sample deviations (divisor n − 1).

use chrono::NaiveDate;
use replaylab_core::domain::{Trade, TradeAction};
use serde::{Deserialize, Deserializer, Serialize};

/// Trading periods per year used for annualization.
pub const PERIODS_PER_YEAR: f64 = 252.0;

/// Aggregate performance metrics for a single backtest run.
///
/// `sortino_ratio` may be `+inf` when the run has no downside; serde_json
/// writes that as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    #[serde(flatten)]
    pub basic: BasicMetrics,
    pub sharpe_ratio: f64,
    #[serde(deserialize_with = "deserialize_unbounded_ratio")]
    pub sortino_ratio: f64,
    pub max_drawdown: f64,
    pub volatility: f64,
}

impl PerformanceMetrics {
    /// Compute every metric from the trade log and the per-bar value series.
    pub fn compute(
        initial_cash: f64,
        trades: &[Trade],
        values: &[f64],
        risk_free_rate: f64,
    ) -> Self {
        Self {
            basic: basic_metrics(initial_cash, trades, values),
            sharpe_ratio: sharpe_ratio(values, risk_free_rate),
            sortino_ratio: sortino_ratio(values, risk_free_rate),
            max_drawdown: max_drawdown(values),
            volatility: volatility(values),
        }
    }
}

/// Trade-log statistics plus total return.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasicMetrics {
    pub initial_cash: f64,
    pub final_portfolio_value: f64,
    pub total_return: f64,
    pub total_trades: usize,
    pub round_trips: usize,
    pub win_rate: f64,
    pub avg_win: f64,
    pub avg_loss: f64,
    pub avg_trade_return: f64,
}

/// A BUY matched with the SELL that closed it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundTrip {
    pub entry_date: NaiveDate,
    pub exit_date: NaiveDate,
    pub entry_price: f64,
    pub exit_price: f64,
    pub shares: f64,
    pub pnl: f64,
    /// PnL relative to the cost basis; 0 when the cost basis is not positive.
    pub trade_return: f64,
}

impl RoundTrip {
    pub fn is_winner(&self) -> bool {
        self.pnl > 0.0
    }
}

// ─── Round trips ────────────────────────────────────────────────────

/// Pair trades into round trips.
///
/// A BUY opens (replacing any BUY still open); a SELL closes the open BUY.
/// A SELL with nothing open is ignored, and a BUY never closed is left out.
pub fn extract_round_trips(trades: &[Trade]) -> Vec<RoundTrip> {
    let mut round_trips = Vec::new();
    let mut open: Option<&Trade> = None;

    for trade in trades {
        match trade.action {
            TradeAction::Buy => open = Some(trade),
            TradeAction::Sell => {
                if let Some(buy) = open.take() {
                    let shares = buy.shares.min(trade.shares);
                    let pnl = (trade.price - buy.price) * shares;
                    let cost = if buy.price > 0.0 {
                        buy.price * shares
                    } else {
                        0.0
                    };
                    round_trips.push(RoundTrip {
                        entry_date: buy.date,
                        exit_date: trade.date,
                        entry_price: buy.price,
                        exit_price: trade.price,
                        shares,
                        pnl,
                        trade_return: if cost > 0.0 { pnl / cost } else { 0.0 },
                    });
                }
            }
        }
    }
    round_trips
}

/// Total return, trade counts and round-trip statistics.
///
/// With an empty value series the final value falls back to `initial_cash`.
pub fn basic_metrics(initial_cash: f64, trades: &[Trade], values: &[f64]) -> BasicMetrics {
    let final_portfolio_value = values.last().copied().unwrap_or(initial_cash);
    let total_return = if initial_cash > 0.0 {
        (final_portfolio_value - initial_cash) / initial_cash
    } else {
        0.0
    };

    let round_trips = extract_round_trips(trades);
    let (wins, losses): (Vec<&RoundTrip>, Vec<&RoundTrip>) =
        round_trips.iter().partition(|rt| rt.is_winner());

    let win_rate = if round_trips.is_empty() {
        0.0
    } else {
        wins.len() as f64 / round_trips.len() as f64
    };
    let returns: Vec<f64> = round_trips.iter().map(|rt| rt.trade_return).collect();

    BasicMetrics {
        initial_cash,
        final_portfolio_value,
        total_return,
        total_trades: trades.len(),
        round_trips: round_trips.len(),
        win_rate,
        avg_win: mean_pnl(&wins),
        avg_loss: mean_pnl(&losses),
        avg_trade_return: mean_f64(&returns),
    }
}

// ─── Value-series metrics ───────────────────────────────────────────

/// Annualized Sharpe ratio.
///
/// Sharpe = (mean(returns) × 252 − rf) / (std(returns) × √252).
/// Returns 0.0 with fewer than 2 returns or zero variance.
pub fn sharpe_ratio(values: &[f64], risk_free_rate: f64) -> f64 {
    let returns = period_returns(values);
    if returns.len() < 2 {
        return 0.0;
    }
    let std = std_dev(&returns);
    if std < 1e-15 {
        return 0.0;
    }
    let annualized_return = mean_f64(&returns) * PERIODS_PER_YEAR;
    (annualized_return - risk_free_rate) / (std * PERIODS_PER_YEAR.sqrt())
}

/// Annualized Sortino ratio (downside deviation only).
///
/// Downside deviation is the sample std of the strictly negative returns,
/// annualized by √252. When it cannot be measured (fewer than two negative
/// returns, or all equal) the ratio is `+inf` if the annualized return beats
/// `risk_free_rate`, else 0.0.
pub fn sortino_ratio(values: &[f64], risk_free_rate: f64) -> f64 {
    let returns = period_returns(values);
    if returns.is_empty() {
        return 0.0;
    }
    let annualized_return = mean_f64(&returns) * PERIODS_PER_YEAR;

    let negative: Vec<f64> = returns.iter().copied().filter(|&r| r < 0.0).collect();
    let downside_std = std_dev(&negative);
    if negative.len() < 2 || downside_std < 1e-15 {
        return if annualized_return > risk_free_rate {
            f64::INFINITY
        } else {
            0.0
        };
    }

    (annualized_return - risk_free_rate) / (downside_std * PERIODS_PER_YEAR.sqrt())
}

/// Maximum drawdown as a non-negative fraction (e.g., 0.25 = 25% below the peak).
///
/// Returns 0.0 for an empty or monotonically increasing series.
pub fn max_drawdown(values: &[f64]) -> f64 {
    let Some(&first) = values.first() else {
        return 0.0;
    };
    let mut peak = first;
    let mut max_dd = 0.0_f64;

    for &value in values {
        if value > peak {
            peak = value;
        }
        if peak > 0.0 {
            max_dd = max_dd.max(1.0 - value / peak);
        }
    }
    max_dd
}

/// Annualized volatility: std(returns) × √252. 0.0 with fewer than 2 returns.
pub fn volatility(values: &[f64]) -> f64 {
    std_dev(&period_returns(values)) * PERIODS_PER_YEAR.sqrt()
}

// ─── Helpers ────────────────────────────────────────────────────────

/// Simple period-over-period returns; the undefined first return is dropped.
pub fn period_returns(values: &[f64]) -> Vec<f64> {
    values
        .windows(2)
        .map(|w| {
            if w[0] > 0.0 {
                (w[1] - w[0]) / w[0]
            } else {
                0.0
            }
        })
        .collect()
}

pub(crate) fn mean_f64(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation. 0.0 with fewer than 2 values.
pub(crate) fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let mean = mean_f64(values);
    let variance =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

/// Reads a ratio that may have been written as `null` for `+inf`.
pub(crate) fn deserialize_unbounded_ratio<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let ratio = Option::<f64>::deserialize(deserializer)?;
    Ok(ratio.unwrap_or(f64::INFINITY))
}

fn mean_pnl(round_trips: &[&RoundTrip]) -> f64 {
    if round_trips.is_empty() {
        return 0.0;
    }
    round_trips.iter().map(|rt| rt.pnl).sum::<f64>() / round_trips.len() as f64
}
