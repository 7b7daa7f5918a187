//! ReplayLab Runner — orchestration on top of `replaylab-core`.
//!
//! This crate provides:
//! - CSV/JSONL input loading with header normalization
//! - TOML run configuration with content-addressed run ids
//! - Performance metrics over finished runs
//! - Deterministic synthetic demo data
//! - Single-run execution with a self-contained report
//! - Parallel parameter sweeps over the risk model
//! - Artifact export (JSON manifest, CSV trade tape and equity curve)
//! - Terminal text reports

pub mod config;
pub mod data_loader;
pub mod export;
pub mod metrics;
pub mod report;
pub mod runner;
pub mod sweep;
pub mod synthetic;

pub use config::{ConfigFileError, RunConfig, RunId};
pub use data_loader::{
    dataset_hash, load_context_jsonl, load_price_csv, load_signals_csv, LoadError,
};
pub use export::{load_artifacts, save_artifacts};
pub use metrics::ReplayMetrics;
pub use report::format_summary;
pub use runner::{run_replay, ReplayReport, RunError, SCHEMA_VERSION};
pub use sweep::{sweep, SweepGrid, SweepResults};
pub use synthetic::SyntheticData;
