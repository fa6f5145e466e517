//! Property tests for engine invariants.
//!
//! Uses proptest to verify:
//! 1. Alternation — trades go BUY, SELL, BUY, ... and never start with SELL
//! 2. Shape — one portfolio point per bar, dated like the bar
//! 3. Value conservation — a transition never changes portfolio value at its own price
//! 4. Holdings exclusivity — FLAT ends hold no shares, LONG ends hold no cash

use chrono::NaiveDate;
use proptest::prelude::*;
use replaylab_core::domain::{Bar, Position, SignalRow, TradeAction};
use replaylab_core::engine::Simulator;
use replaylab_core::strategy::{MaCrossover, Strategy as SignalStrategy};

// ── Generators ───────────────────────────────────────────────────────

fn arb_closes() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(
        (10.0..500.0_f64).prop_map(|p| (p * 100.0).round() / 100.0),
        1..80,
    )
}

fn arb_rows() -> impl Strategy<Value = Vec<(f64, bool, bool)>> {
    prop::collection::vec(
        (
            (10.0..500.0_f64).prop_map(|p| (p * 100.0).round() / 100.0),
            any::<bool>(),
            any::<bool>(),
        ),
        1..80,
    )
}

fn bars_from(closes: &[f64]) -> Vec<Bar> {
    let base = NaiveDate::from_ymd_opt(2021, 3, 1).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| Bar {
            date: base + chrono::Duration::days(i as i64),
            open: close,
            high: close * 1.01,
            low: close * 0.99,
            close,
            volume: 10_000,
        })
        .collect()
}

fn signals_from(bars: &[Bar], flags: &[(f64, bool, bool)]) -> Vec<SignalRow> {
    bars.iter()
        .zip(flags)
        .map(|(bar, &(_, buy, sell))| {
            let mut row = SignalRow::flat(bar.date, bar.close);
            row.buy_signal = buy;
            row.sell_signal = sell;
            row
        })
        .collect()
}

// ── Simulator invariants ─────────────────────────────────────────────

proptest! {
    #[test]
    fn trades_alternate_starting_with_buy(rows in arb_rows()) {
        let closes: Vec<f64> = rows.iter().map(|r| r.0).collect();
        let bars = bars_from(&closes);
        let signals = signals_from(&bars, &rows);

        let outcome = Simulator::new(10_000.0)
            .unwrap()
            .run(&bars, &signals)
            .unwrap();

        for (i, trade) in outcome.trades.iter().enumerate() {
            let expected = if i % 2 == 0 {
                TradeAction::Buy
            } else {
                TradeAction::Sell
            };
            prop_assert_eq!(trade.action, expected);
        }
        let expected_position = if outcome.trades.len() % 2 == 1 {
            Position::Long
        } else {
            Position::Flat
        };
        prop_assert_eq!(outcome.final_position, expected_position);
    }

    #[test]
    fn one_portfolio_point_per_bar(rows in arb_rows()) {
        let closes: Vec<f64> = rows.iter().map(|r| r.0).collect();
        let bars = bars_from(&closes);
        let signals = signals_from(&bars, &rows);

        let outcome = Simulator::new(10_000.0)
            .unwrap()
            .run(&bars, &signals)
            .unwrap();

        prop_assert_eq!(outcome.portfolio_values.len(), bars.len());
        for (point, bar) in outcome.portfolio_values.iter().zip(&bars) {
            prop_assert_eq!(point.date, bar.date);
            prop_assert!(point.portfolio_value > 0.0);
        }
        let last = outcome.portfolio_values.last().unwrap().portfolio_value;
        prop_assert_eq!(outcome.final_portfolio_value, last);
    }

    #[test]
    fn transitions_conserve_value_at_trade_price(rows in arb_rows()) {
        let closes: Vec<f64> = rows.iter().map(|r| r.0).collect();
        let bars = bars_from(&closes);
        let signals = signals_from(&bars, &rows);

        let outcome = Simulator::new(10_000.0)
            .unwrap()
            .run(&bars, &signals)
            .unwrap();

        // Cash carried into each buy equals cash realized by the previous sell.
        let mut cash = 10_000.0_f64;
        for trade in &outcome.trades {
            match trade.action {
                TradeAction::Buy => {
                    let notional = trade.shares * trade.price;
                    prop_assert!((notional - cash).abs() <= 1e-9 * cash.max(1.0));
                }
                TradeAction::Sell => cash = trade.shares * trade.price,
            }
        }
    }

    #[test]
    fn holdings_are_exclusive(rows in arb_rows()) {
        let closes: Vec<f64> = rows.iter().map(|r| r.0).collect();
        let bars = bars_from(&closes);
        let signals = signals_from(&bars, &rows);

        let outcome = Simulator::new(10_000.0)
            .unwrap()
            .run(&bars, &signals)
            .unwrap();

        match outcome.final_position {
            Position::Flat => {
                prop_assert_eq!(outcome.final_shares, 0.0);
                prop_assert!(outcome.final_cash > 0.0);
            }
            Position::Long => {
                prop_assert_eq!(outcome.final_cash, 0.0);
                prop_assert!(outcome.final_shares > 0.0);
            }
        }
    }
}

// ── Strategy invariants ──────────────────────────────────────────────

proptest! {
    #[test]
    fn crossover_rows_align_with_bars(closes in arb_closes()) {
        let bars = bars_from(&closes);
        let rows = MaCrossover::new(2, 5).unwrap().generate_signals(&bars);

        prop_assert_eq!(rows.len(), bars.len());
        for (row, bar) in rows.iter().zip(&bars) {
            prop_assert_eq!(row.date, bar.date);
            prop_assert_eq!(row.close, bar.close);
            prop_assert!(!(row.buy_signal && row.sell_signal));
        }
        // The slow average first exists at index 4; nothing can fire before it.
        let warmup = MaCrossover::new(2, 5).unwrap().warmup_bars();
        prop_assert_eq!(warmup, 4);
        prop_assert!(rows.iter().take(warmup).all(|r| !r.has_signal()));
    }
}
