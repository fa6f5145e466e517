//! ReplayLab Core — bar series, indicators, strategies and the replay engine.
//!
//! This crate contains the deterministic heart of the backtester:
//! - Domain types (bars, signal rows, trades, positions, portfolio points)
//! - Rolling indicators with explicit missing-history values
//! - Signal generators (MA crossover, Bollinger breakout) behind one trait
//! - FLAT/LONG account state machine and the bar-by-bar simulator
//!
//! Metrics, configuration, data loading and orchestration live in `replaylab-runner`.

pub mod domain;
pub mod engine;
pub mod indicators;
pub mod strategy;
