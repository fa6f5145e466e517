//! ReplayLab CLI — run single-asset backtests from a TOML config and a CSV bar file.
//!
//! Commands:
//! - `run` — execute a backtest and print a summary (optionally write the JSON artifact)
//! - `strategies` — list available strategy types and their default parameters
//! - `validate` — check a config file without running it

mod obs;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;

use replaylab_runner::{
    load_bars_csv, run_from_config, BacktestConfig, BacktestResult, RunManifest, StrategyConfig,
};

use crate::obs::LogFormat;

#[derive(Parser)]
#[command(
    name = "replaylab",
    version,
    about = "ReplayLab CLI — single-asset strategy backtester"
)]
struct Cli {
    /// Log level or filter directive (overridden by REPLAYLAB_LOG).
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Log output format.
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a backtest from a TOML config and a CSV bar file.
    Run {
        /// Path to a TOML config file.
        #[arg(long)]
        config: PathBuf,

        /// Path to a CSV file with date,open,high,low,close,volume columns.
        #[arg(long)]
        bars: PathBuf,

        /// Write the result JSON (manifest + result) to this path.
        #[arg(long)]
        output: Option<PathBuf>,

        /// Print the result JSON to stdout instead of the summary.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// List available strategies with their default parameters.
    Strategies,
    /// Parse and validate a TOML config without running it.
    Validate {
        /// Path to a TOML config file.
        #[arg(long)]
        config: PathBuf,
    },
}

/// The persisted artifact: run identity plus the full result.
#[derive(Serialize)]
struct RunArtifact<'a> {
    manifest: &'a RunManifest,
    result: &'a BacktestResult,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    obs::init_tracing(&cli.log_level, cli.log_format)?;

    match cli.command {
        Commands::Run {
            config,
            bars,
            output,
            json,
        } => run_backtest_cmd(&config, &bars, output.as_deref(), json),
        Commands::Strategies => list_strategies(),
        Commands::Validate { config } => validate_config(&config),
    }
}

fn run_backtest_cmd(
    config_path: &Path,
    bars_path: &Path,
    output: Option<&Path>,
    json: bool,
) -> Result<()> {
    let config = BacktestConfig::from_file(config_path)
        .with_context(|| format!("loading config {}", config_path.display()))?;
    let bars = load_bars_csv(bars_path)
        .with_context(|| format!("loading bars {}", bars_path.display()))?;

    let result = run_from_config(&config, &bars).context("running backtest")?;
    let manifest = RunManifest::new(&config, &bars)
        .context("fingerprinting run")?;
    let artifact = RunArtifact {
        manifest: &manifest,
        result: &result,
    };

    if let Some(path) = output {
        let file = std::fs::File::create(path)
            .with_context(|| format!("creating {}", path.display()))?;
        serde_json::to_writer_pretty(std::io::BufWriter::new(file), &artifact)
            .with_context(|| format!("writing {}", path.display()))?;
        tracing::info!(path = %path.display(), "result written");
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&artifact)?);
    } else {
        print_summary(&manifest, &result);
        if let Some(path) = output {
            println!("Result saved to: {}", path.display());
        }
    }
    Ok(())
}

fn list_strategies() -> Result<()> {
    for config in StrategyConfig::all_defaults() {
        let params = toml::to_string(&config)
            .context("rendering strategy defaults")?;
        println!("[strategy]");
        print!("{params}");
        println!();
    }
    Ok(())
}

fn validate_config(path: &Path) -> Result<()> {
    let config = BacktestConfig::from_file(path)
        .with_context(|| format!("validating config {}", path.display()))?;
    println!(
        "OK: {} (initial_cash = {}, risk_free_rate = {})",
        config.strategy.type_name(),
        config.backtest.initial_cash,
        config.backtest.risk_free_rate
    );
    Ok(())
}

fn print_summary(manifest: &RunManifest, result: &BacktestResult) {
    println!();
    println!("=== Backtest Result ===");
    println!("Strategy:       {}", result.strategy);
    println!(
        "Period:         {} to {}",
        manifest.start_date, manifest.end_date
    );
    println!("Bars:           {}", manifest.bar_count);
    println!(
        "Trades:         {} ({} round trips)",
        result.total_trades, result.round_trips
    );
    println!();
    println!("--- Performance ---");
    println!("Initial Cash:   {:.2}", result.initial_cash);
    println!("Final Value:    {:.2}", result.final_portfolio_value);
    println!("Total Return:   {:.2}%", result.total_return * 100.0);
    println!("Sharpe:         {:.3}", result.sharpe_ratio);
    println!("Sortino:        {:.3}", result.sortino_ratio);
    println!("Max Drawdown:   {:.2}%", result.max_drawdown * 100.0);
    println!("Volatility:     {:.2}%", result.volatility * 100.0);
    println!("Win Rate:       {:.1}%", result.win_rate * 100.0);
    println!("Avg Win:        {:.2}", result.avg_win);
    println!("Avg Loss:       {:.2}", result.avg_loss);
    println!("Avg Trade Ret:  {:.2}%", result.avg_trade_return * 100.0);
    let hash = &manifest.config_hash;
    println!("Config Hash:    {}", hash.get(..12).unwrap_or(hash));
}
