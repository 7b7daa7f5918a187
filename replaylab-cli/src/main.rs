//! ReplayLab CLI — run and sweep commands.
//!
//! Commands:
//! - `run` — replay a signal stream against price history from CSV/JSONL
//!   inputs (or deterministic synthetic data) and save artifacts
//! - `sweep` — grid-search risk parameters over the same inputs and rank
//!   the runs by total R

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use replaylab_core::domain::SignalEvent;
use replaylab_core::series::{ContextStore, PriceSeries};
use replaylab_runner::synthetic;
use replaylab_runner::{
    dataset_hash, format_summary, load_context_jsonl, load_price_csv, load_signals_csv,
    run_replay, save_artifacts, sweep, RunConfig, SweepGrid,
};

#[derive(Parser)]
#[command(
    name = "replaylab",
    about = "ReplayLab CLI — event-driven signal replay backtester"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a signal stream and save the full artifact set.
    Run {
        /// Path to a TOML run config. Defaults are used when omitted.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Price history CSV (timestamp,open,high,low,close,volume).
        #[arg(long)]
        prices: Option<PathBuf>,

        /// Signal stream CSV (timestamp,direction,...).
        #[arg(long)]
        signals: Option<PathBuf>,

        /// Context series as name=path JSONL, repeatable
        /// (e.g. --context garch=vol.jsonl).
        #[arg(long)]
        context: Vec<String>,

        /// Use deterministic synthetic data instead of input files.
        #[arg(long, default_value_t = false)]
        synthetic: bool,

        /// Seed label for synthetic data.
        #[arg(long, default_value = "demo")]
        label: String,

        /// Output directory for artifacts.
        #[arg(long, default_value = "results")]
        output_dir: PathBuf,
    },
    /// Grid-search risk parameters and rank runs by total R.
    Sweep {
        /// Path to a TOML run config for the base parameters.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Price history CSV.
        #[arg(long)]
        prices: Option<PathBuf>,

        /// Signal stream CSV.
        #[arg(long)]
        signals: Option<PathBuf>,

        /// Context series as name=path JSONL, repeatable.
        #[arg(long)]
        context: Vec<String>,

        /// Use deterministic synthetic data instead of input files.
        #[arg(long, default_value_t = false)]
        synthetic: bool,

        /// Seed label for synthetic data.
        #[arg(long, default_value = "demo")]
        label: String,

        /// How many of the best runs to print.
        #[arg(long, default_value_t = 5)]
        top: usize,

        /// Save artifacts for the best run to this directory.
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            prices,
            signals,
            context,
            synthetic,
            label,
            output_dir,
        } => run_cmd(config, prices, signals, context, synthetic, &label, output_dir),
        Commands::Sweep {
            config,
            prices,
            signals,
            context,
            synthetic,
            label,
            top,
            output_dir,
        } => sweep_cmd(config, prices, signals, context, synthetic, &label, top, output_dir),
    }
}

struct Inputs {
    prices: PriceSeries,
    signals: Vec<SignalEvent>,
    context: ContextStore,
    hash: String,
}

fn load_config(path: Option<PathBuf>) -> Result<RunConfig> {
    match path {
        Some(path) => Ok(RunConfig::from_file(&path)?),
        None => Ok(RunConfig::default()),
    }
}

fn load_inputs(
    config: &RunConfig,
    prices: Option<PathBuf>,
    signals: Option<PathBuf>,
    context_args: Vec<String>,
    use_synthetic: bool,
    label: &str,
) -> Result<Inputs> {
    if use_synthetic {
        if prices.is_some() || signals.is_some() || !context_args.is_empty() {
            bail!("--synthetic cannot be combined with --prices/--signals/--context");
        }
        let data = synthetic::generate(
            label,
            config.backtest.start_date,
            config.backtest.end_date,
        )?;
        let hash = dataset_hash(&data.prices, &data.signals);
        return Ok(Inputs {
            prices: data.prices,
            signals: data.signals,
            context: data.context,
            hash,
        });
    }

    let prices_path = prices.context("--prices is required without --synthetic")?;
    let signals_path = signals.context("--signals is required without --synthetic")?;

    let prices = load_price_csv(&prices_path)?;
    let signals = load_signals_csv(&signals_path)?;

    let mut context = ContextStore::new();
    for arg in &context_args {
        let (name, path) = arg
            .split_once('=')
            .with_context(|| format!("bad --context argument '{arg}' (expected name=path)"))?;
        context.insert(load_context_jsonl(path.as_ref(), name)?);
    }

    let hash = dataset_hash(&prices, &signals);
    Ok(Inputs {
        prices,
        signals,
        context,
        hash,
    })
}

fn run_cmd(
    config_path: Option<PathBuf>,
    prices: Option<PathBuf>,
    signals: Option<PathBuf>,
    context_args: Vec<String>,
    use_synthetic: bool,
    label: &str,
    output_dir: PathBuf,
) -> Result<()> {
    let config = load_config(config_path)?;
    let inputs = load_inputs(&config, prices, signals, context_args, use_synthetic, label)?;

    let report = run_replay(
        &config,
        &inputs.prices,
        &inputs.signals,
        &inputs.context,
        None,
        &inputs.hash,
    )?;

    print!("{}", format_summary(&report));
    if use_synthetic {
        println!("WARNING: results based on SYNTHETIC data (label '{label}')");
    }

    let run_dir = save_artifacts(&report, &output_dir)?;
    println!("Artifacts saved to: {}", run_dir.display());

    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn sweep_cmd(
    config_path: Option<PathBuf>,
    prices: Option<PathBuf>,
    signals: Option<PathBuf>,
    context_args: Vec<String>,
    use_synthetic: bool,
    label: &str,
    top: usize,
    output_dir: Option<PathBuf>,
) -> Result<()> {
    let config = load_config(config_path)?;
    let inputs = load_inputs(&config, prices, signals, context_args, use_synthetic, label)?;

    let grid = SweepGrid::risk_default();
    println!("Sweeping {} configurations...", grid.size());

    let results = sweep(
        &grid,
        &config,
        &inputs.prices,
        &inputs.signals,
        &inputs.context,
        &inputs.hash,
    )?;

    println!();
    println!(
        "{:<14} {:>6} {:>6} {:>8} {:>8} {:>8}",
        "Run", "Trades", "RR", "SL(med)", "Total R", "Win%"
    );
    println!("{}", "-".repeat(58));
    for report in results.top_n(top) {
        println!(
            "{:<14} {:>6} {:>6.1} {:>8.0} {:>+8.2} {:>7.1}%",
            &report.run_id[..report.run_id.len().min(12)],
            report.metrics.trade_count,
            report.config.risk.reward_risk_ratio,
            report.config.risk.sl_med,
            report.metrics.total_r,
            report.metrics.win_rate * 100.0,
        );
    }

    if let Some(output_dir) = output_dir {
        if let Some(best) = results.best() {
            let run_dir = save_artifacts(best, &output_dir)?;
            println!();
            println!("Best run artifacts saved to: {}", run_dir.display());
        }
    }

    Ok(())
}
