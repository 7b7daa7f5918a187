//! Replay runner — wires config, engine, metrics, and run provenance.
//!
//! One entry point: `run_replay()` takes pre-loaded inputs, builds an
//! engine from the config, and returns a self-contained report carrying
//! everything needed to reproduce or audit the run.

use replaylab_core::domain::{EquityPoint, Trade};
use replaylab_core::engine::{BacktestEngine, EngineError, FilterStats, ReplayResult};
use replaylab_core::oracle::ConfirmationOracle;
use replaylab_core::series::{ContextStore, PriceSeries};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{ConfigFileError, RunConfig, RunId};
use crate::data_loader::LoadError;
use crate::metrics::ReplayMetrics;

/// Current schema version for persisted artifacts.
pub const SCHEMA_VERSION: u32 = 1;

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigFileError),
    #[error("data error: {0}")]
    Data(#[from] LoadError),
    #[error("engine error: {0}")]
    Engine(#[from] EngineError),
}

/// Complete result of a single replay run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayReport {
    /// Schema version for forward-compatible deserialization.
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub run_id: RunId,
    pub config: RunConfig,
    pub dataset_hash: String,
    pub filter_stats: FilterStats,
    pub trades: Vec<Trade>,
    pub equity_curve: Vec<EquityPoint>,
    pub metrics: ReplayMetrics,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

/// Run one replay over pre-loaded inputs.
///
/// `dataset_hash` identifies the inputs (see
/// [`crate::data_loader::dataset_hash`]); `oracle` is optional and absent
/// means every signal is confirmed.
pub fn run_replay(
    config: &RunConfig,
    prices: &PriceSeries,
    signals: &[replaylab_core::domain::SignalEvent],
    context: &ContextStore,
    oracle: Option<Box<dyn ConfirmationOracle>>,
    dataset_hash: &str,
) -> Result<ReplayReport, RunError> {
    config.validate()?;

    let mut engine = BacktestEngine::new(config.backtest.clone(), Box::new(config.risk.clone()));
    if let Some(oracle) = oracle {
        engine = engine.with_oracle(oracle);
    }

    let ReplayResult {
        trades,
        equity_curve,
        filter_stats,
    } = engine.run(prices, signals, context)?;

    let metrics = ReplayMetrics::compute(&trades, &equity_curve, config.backtest.initial_capital);

    Ok(ReplayReport {
        schema_version: SCHEMA_VERSION,
        run_id: config.run_id(),
        config: config.clone(),
        dataset_hash: dataset_hash.to_string(),
        filter_stats,
        trades,
        equity_curve,
        metrics,
    })
}
