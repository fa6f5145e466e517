//! Portfolio simulator — replays signal rows through the account state machine.
//!
//! Per row, in order:
//! 1. Gate: buy if `buy_signal` and FLAT; else sell if `sell_signal` and LONG.
//! 2. Mark to market at the row's close with the post-transition holdings.
//!
//! All state lives inside a single `run` call, so a `Simulator` can be reused
//! (and shared across threads) without leaking anything between runs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::account::Account;
use crate::domain::{Bar, PortfolioValuePoint, Position, SignalRow, Trade};

/// Errors from simulator configuration, preconditions and state transitions.
#[derive(Debug, Error, PartialEq)]
pub enum SimulatorError {
    #[error("initial cash must be positive and finite, got {0}")]
    InvalidInitialCash(f64),

    #[error("cannot simulate an empty bar series")]
    EmptySeries,

    #[error("signal series has {signals} rows but bar series has {bars} bars")]
    LengthMismatch { bars: usize, signals: usize },

    #[error("signal row {index} is dated {signal_date} but its bar is dated {bar_date}")]
    MisalignedSignal {
        index: usize,
        bar_date: NaiveDate,
        signal_date: NaiveDate,
    },

    #[error("{date}: cannot trade at non-positive price {price}")]
    InvalidPrice { date: NaiveDate, price: f64 },

    #[error("{date}: buy requested while already long")]
    AlreadyLong { date: NaiveDate },

    #[error("{date}: sell requested while flat")]
    NotLong { date: NaiveDate },
}

/// Everything one simulation run produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationOutcome {
    pub initial_cash: f64,
    pub trades: Vec<Trade>,
    /// One point per input bar, in input order.
    pub portfolio_values: Vec<PortfolioValuePoint>,
    pub final_cash: f64,
    pub final_shares: f64,
    pub final_position: Position,
    /// Holdings valued at the last row's close.
    pub final_portfolio_value: f64,
}

/// Replays a one-asset, fully-allocated portfolio.
#[derive(Debug, Clone, PartialEq)]
pub struct Simulator {
    initial_cash: f64,
}

impl Simulator {
    pub fn new(initial_cash: f64) -> Result<Self, SimulatorError> {
        if !(initial_cash.is_finite() && initial_cash > 0.0) {
            return Err(SimulatorError::InvalidInitialCash(initial_cash));
        }
        Ok(Self { initial_cash })
    }

    pub fn initial_cash(&self) -> f64 {
        self.initial_cash
    }

    /// Run the replay loop over aligned bars and signal rows.
    ///
    /// Prices come from each signal row's `close`. The bar series is used to
    /// check that the strategy produced one row per bar, on the same dates.
    pub fn run(
        &self,
        bars: &[Bar],
        signals: &[SignalRow],
    ) -> Result<SimulationOutcome, SimulatorError> {
        if bars.is_empty() || signals.is_empty() {
            return Err(SimulatorError::EmptySeries);
        }
        if bars.len() != signals.len() {
            return Err(SimulatorError::LengthMismatch {
                bars: bars.len(),
                signals: signals.len(),
            });
        }
        if let Some((index, (bar, row))) = bars
            .iter()
            .zip(signals)
            .enumerate()
            .find(|(_, (bar, row))| bar.date != row.date)
        {
            return Err(SimulatorError::MisalignedSignal {
                index,
                bar_date: bar.date,
                signal_date: row.date,
            });
        }

        let mut account = Account::new(self.initial_cash);
        let mut portfolio_values = Vec::with_capacity(signals.len());

        for row in signals {
            self.step(&mut account, row)?;
            portfolio_values.push(PortfolioValuePoint {
                date: row.date,
                portfolio_value: account.value_at(row.close),
            });
        }

        let last_close = signals[signals.len() - 1].close;
        let final_portfolio_value = account.value_at(last_close);

        tracing::debug!(
            bars = signals.len(),
            trades = account.trades().len(),
            final_portfolio_value,
            "simulation complete"
        );

        Ok(SimulationOutcome {
            initial_cash: self.initial_cash,
            final_cash: account.cash(),
            final_shares: account.shares(),
            final_position: account.position(),
            final_portfolio_value,
            portfolio_values,
            trades: account.into_trades(),
        })
    }

    /// Apply the gating policy for a single row. At most one transition fires.
    fn step(&self, account: &mut Account, row: &SignalRow) -> Result<(), SimulatorError> {
        match account.position() {
            Position::Flat if row.buy_signal => {
                let trade = account.buy(row.date, row.close)?;
                tracing::debug!(
                    date = %trade.date,
                    price = trade.price,
                    shares = trade.shares,
                    "buy"
                );
            }
            Position::Long if row.sell_signal => {
                let trade = account.sell(row.date, row.close)?;
                tracing::debug!(
                    date = %trade.date,
                    price = trade.price,
                    shares = trade.shares,
                    "sell"
                );
            }
            position if row.has_signal() => {
                tracing::trace!(date = %row.date, %position, "signal ignored by position gate");
            }
            _ => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TradeAction;

    fn rows(closes: &[f64], buys: &[usize], sells: &[usize]) -> (Vec<Bar>, Vec<SignalRow>) {
        let base = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let bars: Vec<Bar> = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| Bar {
                date: base + chrono::Duration::days(i as i64),
                open: close,
                high: close + 1.0,
                low: close - 1.0,
                close,
                volume: 1000,
            })
            .collect();
        let signals = bars
            .iter()
            .enumerate()
            .map(|(i, bar)| {
                let mut row = SignalRow::flat(bar.date, bar.close);
                row.buy_signal = buys.contains(&i);
                row.sell_signal = sells.contains(&i);
                row
            })
            .collect();
        (bars, signals)
    }

    #[test]
    fn rejects_invalid_initial_cash() {
        assert_eq!(
            Simulator::new(0.0),
            Err(SimulatorError::InvalidInitialCash(0.0))
        );
        assert!(Simulator::new(-5.0).is_err());
        assert!(Simulator::new(f64::INFINITY).is_err());
    }

    #[test]
    fn no_signals_keeps_cash_on_every_bar() {
        let (bars, signals) = rows(&[100.0, 90.0, 120.0], &[], &[]);
        let outcome = Simulator::new(1_000.0)
            .unwrap()
            .run(&bars, &signals)
            .unwrap();

        assert!(outcome.trades.is_empty());
        assert_eq!(outcome.portfolio_values.len(), 3);
        assert!(outcome
            .portfolio_values
            .iter()
            .all(|p| p.portfolio_value == 1_000.0));
        assert_eq!(outcome.final_portfolio_value, 1_000.0);
        assert_eq!(outcome.final_position, Position::Flat);
    }

    #[test]
    fn buy_then_sell_round_trip() {
        let (bars, signals) = rows(&[100.0, 110.0, 120.0, 90.0], &[0], &[2]);
        let outcome = Simulator::new(1_000.0)
            .unwrap()
            .run(&bars, &signals)
            .unwrap();

        assert_eq!(outcome.trades.len(), 2);
        assert_eq!(outcome.trades[0].action, TradeAction::Buy);
        assert_eq!(outcome.trades[0].shares, 10.0);
        assert_eq!(outcome.trades[1].action, TradeAction::Sell);
        assert_eq!(outcome.trades[1].price, 120.0);

        let values: Vec<f64> = outcome
            .portfolio_values
            .iter()
            .map(|p| p.portfolio_value)
            .collect();
        // Post-transition valuation: the buy bar is valued at its own close.
        assert_eq!(values, vec![1_000.0, 1_100.0, 1_200.0, 1_200.0]);
        assert_eq!(outcome.final_cash, 1_200.0);
        assert_eq!(outcome.final_shares, 0.0);
    }

    #[test]
    fn final_value_matches_last_point_when_long() {
        let (bars, signals) = rows(&[100.0, 110.0, 130.0], &[1], &[]);
        let outcome = Simulator::new(1_100.0)
            .unwrap()
            .run(&bars, &signals)
            .unwrap();

        assert_eq!(outcome.final_position, Position::Long);
        assert_eq!(outcome.final_cash, 0.0);
        assert_eq!(outcome.final_shares, 10.0);
        assert_eq!(outcome.final_portfolio_value, 1_300.0);
        assert_eq!(
            outcome.final_portfolio_value,
            outcome.portfolio_values.last().unwrap().portfolio_value
        );
    }

    #[test]
    fn gate_ignores_buy_while_long_and_sell_while_flat() {
        let (bars, signals) = rows(&[100.0, 101.0, 102.0, 103.0], &[1, 2], &[0, 3]);
        let outcome = Simulator::new(1_000.0)
            .unwrap()
            .run(&bars, &signals)
            .unwrap();

        let actions: Vec<TradeAction> = outcome.trades.iter().map(|t| t.action).collect();
        assert_eq!(actions, vec![TradeAction::Buy, TradeAction::Sell]);
        assert_eq!(outcome.trades[0].date, bars[1].date);
        assert_eq!(outcome.trades[1].date, bars[3].date);
    }

    #[test]
    fn both_flags_on_one_row_fire_at_most_once() {
        let (bars, signals) = rows(&[100.0, 101.0], &[0, 1], &[0, 1]);
        let outcome = Simulator::new(1_000.0)
            .unwrap()
            .run(&bars, &signals)
            .unwrap();

        // Row 0: flat → buy wins. Row 1: long → buy gated off, sell fires.
        let actions: Vec<TradeAction> = outcome.trades.iter().map(|t| t.action).collect();
        assert_eq!(actions, vec![TradeAction::Buy, TradeAction::Sell]);
    }

    #[test]
    fn simulator_is_reusable_across_runs() {
        let simulator = Simulator::new(1_000.0).unwrap();
        let (bars, signals) = rows(&[100.0, 200.0], &[0], &[]);

        let first = simulator.run(&bars, &signals).unwrap();
        let second = simulator.run(&bars, &signals).unwrap();
        assert_eq!(first, second);
        assert_eq!(second.trades.len(), 1);
    }

    #[test]
    fn empty_series_is_rejected() {
        let simulator = Simulator::new(1_000.0).unwrap();
        assert_eq!(simulator.run(&[], &[]), Err(SimulatorError::EmptySeries));
    }

    #[test]
    fn length_mismatch_is_rejected() {
        let (bars, signals) = rows(&[100.0, 101.0, 102.0], &[], &[]);
        let err = Simulator::new(1_000.0)
            .unwrap()
            .run(&bars, &signals[..2])
            .unwrap_err();
        assert_eq!(
            err,
            SimulatorError::LengthMismatch {
                bars: 3,
                signals: 2,
            }
        );
    }

    #[test]
    fn misaligned_dates_are_rejected() {
        let (bars, mut signals) = rows(&[100.0, 101.0], &[], &[]);
        signals[1].date = signals[0].date;
        let err = Simulator::new(1_000.0)
            .unwrap()
            .run(&bars, &signals)
            .unwrap_err();
        assert!(matches!(err, SimulatorError::MisalignedSignal { index: 1, .. }));
    }

    #[test]
    fn non_positive_trade_price_aborts_the_run() {
        let (bars, mut signals) = rows(&[100.0, 101.0, 102.0], &[1], &[]);
        signals[1].close = 0.0;
        let err = Simulator::new(1_000.0)
            .unwrap()
            .run(&bars, &signals)
            .unwrap_err();
        assert_eq!(
            err,
            SimulatorError::InvalidPrice {
                date: signals[1].date,
                price: 0.0,
            }
        );
    }

    #[test]
    fn negative_sell_price_aborts_the_run() {
        let (bars, mut signals) = rows(&[100.0, 101.0, 102.0], &[0], &[2]);
        signals[2].close = -1.0;
        let err = Simulator::new(1_000.0)
            .unwrap()
            .run(&bars, &signals)
            .unwrap_err();
        assert_eq!(
            err,
            SimulatorError::InvalidPrice {
                date: signals[2].date,
                price: -1.0,
            }
        );
    }
}
