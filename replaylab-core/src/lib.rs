//! ReplayLab Core — signal replay engine, domain types, risk model, trade simulator.
//!
//! This crate contains the heart of the replay backtester:
//! - Domain types (price bars, signals, sessions, context snapshots, trades)
//! - Validated time-indexed series with as-of and first-after lookups
//! - Regime-bucketed risk model mapping volatility to stop/target levels
//! - Forward bar-scan trade simulator with the stop-first tie-break
//! - Confirmation oracle trait for pluggable signal vetting
//! - The six-gate signal pipeline with per-stage accounting

pub mod domain;
pub mod engine;
pub mod oracle;
pub mod risk;
pub mod series;
pub mod sim;
