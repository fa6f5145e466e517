//! Replay engine — the position state machine and the day-by-day simulator.

pub mod account;
pub mod simulator;

pub use account::Account;
pub use simulator::{SimulationOutcome, Simulator, SimulatorError};
