//! Backtest engine — the sequential six-gate signal pipeline.
//!
//! Signals are replayed strictly in timestamp order. Each signal passes
//! through six gates (cooldown, session, entry bar, context, confirmation,
//! execution); the first gate that fails discards the signal and bumps its
//! counter. Gate outcomes are ordinary branches, never errors — only
//! malformed inputs and bad configuration abort a run.
//!
//! All run state (equity, cooldown clock, counters, outputs) is local to
//! `run`, so every run is reproducible and engine instances can be used
//! in parallel sweeps without shared state.

pub mod config;
pub mod stats;

pub use config::{ConfigError, EngineConfig, DEFAULT_MAX_LOOKAHEAD_BARS};
pub use stats::FilterStats;

use crate::domain::{EquityPoint, Session, SignalEvent, Trade};
use crate::oracle::ConfirmationOracle;
use crate::risk::RiskModel;
use crate::series::{ContextStore, PriceSeries};
use crate::sim::resolve_trade;
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Field read from the mandatory volatility snapshot.
pub const VOLATILITY_FIELD: &str = "vol";

/// Reading used when the volatility snapshot exists but lacks the field.
/// Matches the medium-regime midpoint the signal feed historically assumed.
pub const FALLBACK_VOLATILITY: f64 = 30.0;

/// Fatal run errors. Expected filtering outcomes never appear here; they
/// are counted in [`FilterStats`] instead.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("signal timestamps not sorted ascending at index {index}")]
    UnsortedSignals { index: usize },
}

/// Everything a finished run produces: the ordered trade list, the equity
/// curve (seeded with the starting capital), and the per-gate counters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayResult {
    pub trades: Vec<Trade>,
    pub equity_curve: Vec<EquityPoint>,
    pub filter_stats: FilterStats,
}

/// Event-driven replay engine.
///
/// Holds the configuration and the pluggable policies; per-run state lives
/// inside [`BacktestEngine::run`]. The oracle is optional — absent means
/// every signal is confirmed.
pub struct BacktestEngine {
    config: EngineConfig,
    risk_model: Box<dyn RiskModel>,
    oracle: Option<Box<dyn ConfirmationOracle>>,
}

impl BacktestEngine {
    pub fn new(config: EngineConfig, risk_model: Box<dyn RiskModel>) -> Self {
        Self {
            config,
            risk_model,
            oracle: None,
        }
    }

    pub fn with_oracle(mut self, oracle: Box<dyn ConfirmationOracle>) -> Self {
        self.oracle = Some(oracle);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Replay the signal stream against the price and context series.
    ///
    /// Signals outside the configured date window are ignored entirely
    /// (they do not count toward `total_signals`); in-window signals land
    /// in exactly one [`FilterStats`] bucket.
    pub fn run(
        &self,
        prices: &PriceSeries,
        signals: &[SignalEvent],
        context: &ContextStore,
    ) -> Result<ReplayResult, EngineError> {
        self.config.validate()?;

        for i in 1..signals.len() {
            if signals[i - 1].timestamp > signals[i].timestamp {
                return Err(EngineError::UnsortedSignals { index: i });
            }
        }

        let start_ts = day_start(self.config.start_date);
        // Inclusive end date: the window closes at the following midnight.
        let end_ts_excl = day_start(self.config.end_date) + Duration::days(1);
        let cooldown = Duration::hours(self.config.cooldown_hours);

        let mut equity = self.config.initial_capital;
        let mut last_trade_time: Option<DateTime<Utc>> = None;
        let mut stats = FilterStats::new();
        let mut trades: Vec<Trade> = Vec::new();
        let mut equity_curve = vec![EquityPoint {
            timestamp: start_ts,
            equity,
        }];

        for signal in signals {
            let signal_time = signal.timestamp;
            if signal_time < start_ts || signal_time >= end_ts_excl {
                continue;
            }
            stats.total_signals += 1;

            // Gate 1: cooldown
            if let Some(last) = last_trade_time {
                if signal_time - last < cooldown {
                    stats.cooldown_blocked += 1;
                    continue;
                }
            }

            // Gate 2: session allow-list
            let session = Session::from_timestamp(signal_time);
            if !self.config.allowed_sessions.contains(&session) {
                stats.session_blocked += 1;
                continue;
            }

            // Gate 3: entry bar — first bar strictly after the signal;
            // its open is the entry price
            let Some(entry_bar) = prices.first_after(signal_time) else {
                stats.no_entry_bar += 1;
                continue;
            };
            let entry_price = entry_bar.open;
            let entry_time = entry_bar.timestamp;

            // Gate 4: fused context; the volatility source is mandatory
            let fused = context.fuse_at(signal_time);
            let Some(vol_snapshot) = fused.get(&self.config.volatility_source) else {
                stats.no_context += 1;
                continue;
            };
            let volatility = vol_snapshot
                .value(VOLATILITY_FIELD)
                .unwrap_or(FALLBACK_VOLATILITY);

            // Gate 5: confirmation oracle (pass-through when absent)
            if let Some(oracle) = &self.oracle {
                if !oracle.confirm_signal(signal, &fused, entry_price) {
                    stats.not_confirmed += 1;
                    continue;
                }
            }

            // Gate 6: execution — risk levels plus forward simulation.
            // An unresolved simulation is not a trade: equity and the
            // cooldown clock stay untouched.
            let levels = self
                .risk_model
                .stop_levels(entry_price, signal.direction, volatility);
            let Some(outcome) = resolve_trade(
                prices.bars_after(entry_time),
                entry_price,
                signal.direction,
                levels.stop,
                levels.target,
                self.config.max_lookahead_bars,
            ) else {
                stats.unresolved += 1;
                continue;
            };

            let pnl = self.config.risk_per_trade * outcome.r_multiple;
            equity += pnl;

            trades.push(Trade {
                signal_time,
                entry_time,
                session,
                direction: signal.direction,
                entry_price,
                stop_price: levels.stop,
                target_price: levels.target,
                exit_kind: outcome.exit_kind,
                exit_time: outcome.exit_time,
                exit_price: outcome.exit_price,
                pnl,
                r_multiple: outcome.r_multiple,
                equity_after: equity,
                volatility_at_entry: volatility,
            });
            equity_curve.push(EquityPoint {
                timestamp: signal_time,
                equity,
            });
            stats.trades_executed += 1;
            last_trade_time = Some(signal_time);
        }

        Ok(ReplayResult {
            trades,
            equity_curve,
            filter_stats: stats,
        })
    }
}

fn day_start(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}
