//! Domain types for the single-asset replay engine.

pub mod bar;
pub mod portfolio;
pub mod position;
pub mod signal;
pub mod trade;

pub use bar::{Bar, BarError, BarSeries};
pub use portfolio::{value_series, PortfolioValuePoint};
pub use position::Position;
pub use signal::SignalRow;
pub use trade::{Trade, TradeAction};
