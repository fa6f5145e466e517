//! Single-asset account — the FLAT/LONG position state machine.
//!
//! ```text
//!   FLAT { cash } --buy(price)--> LONG { shares = cash / price }
//!   LONG { shares } --sell(price)--> FLAT { cash = shares * price }
//! ```
//!
//! The holding is stored as an enum carrying either cash or shares, never
//! both, so "FLAT ⇒ shares == 0" and "LONG ⇒ cash == 0" hold by construction.

use chrono::NaiveDate;

use super::simulator::SimulatorError;
use crate::domain::{Position, Trade, TradeAction};

#[derive(Debug, Clone, Copy, PartialEq)]
enum Holding {
    Flat { cash: f64 },
    Long { shares: f64 },
}

/// Mutable account state for one simulation run.
#[derive(Debug, Clone)]
pub struct Account {
    holding: Holding,
    trades: Vec<Trade>,
}

impl Account {
    pub fn new(initial_cash: f64) -> Self {
        Self {
            holding: Holding::Flat { cash: initial_cash },
            trades: Vec::new(),
        }
    }

    pub fn position(&self) -> Position {
        match self.holding {
            Holding::Flat { .. } => Position::Flat,
            Holding::Long { .. } => Position::Long,
        }
    }

    pub fn cash(&self) -> f64 {
        match self.holding {
            Holding::Flat { cash } => cash,
            Holding::Long { .. } => 0.0,
        }
    }

    pub fn shares(&self) -> f64 {
        match self.holding {
            Holding::Flat { .. } => 0.0,
            Holding::Long { shares } => shares,
        }
    }

    /// Mark-to-market value: `cash + shares × price`.
    pub fn value_at(&self, price: f64) -> f64 {
        self.cash() + self.shares() * price
    }

    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    pub fn into_trades(self) -> Vec<Trade> {
        self.trades
    }

    /// FLAT → LONG: convert all cash into shares at `price`.
    pub fn buy(&mut self, date: NaiveDate, price: f64) -> Result<&Trade, SimulatorError> {
        check_price(date, price)?;
        let cash = match self.holding {
            Holding::Flat { cash } => cash,
            Holding::Long { .. } => return Err(SimulatorError::AlreadyLong { date }),
        };

        let shares = cash / price;
        self.holding = Holding::Long { shares };
        Ok(self.record(date, TradeAction::Buy, price, shares))
    }

    /// LONG → FLAT: liquidate all shares at `price`.
    pub fn sell(&mut self, date: NaiveDate, price: f64) -> Result<&Trade, SimulatorError> {
        check_price(date, price)?;
        let shares = match self.holding {
            Holding::Long { shares } => shares,
            Holding::Flat { .. } => return Err(SimulatorError::NotLong { date }),
        };

        self.holding = Holding::Flat {
            cash: shares * price,
        };
        Ok(self.record(date, TradeAction::Sell, price, shares))
    }

    fn record(&mut self, date: NaiveDate, action: TradeAction, price: f64, shares: f64) -> &Trade {
        self.trades.push(Trade {
            date,
            action,
            price,
            shares,
        });
        &self.trades[self.trades.len() - 1]
    }
}

fn check_price(date: NaiveDate, price: f64) -> Result<(), SimulatorError> {
    if !(price.is_finite() && price > 0.0) {
        return Err(SimulatorError::InvalidPrice { date, price });
    }
    Ok(())
}
