//! Parameter sweep — grid search over risk-model parameters.
//!
//! Each grid point gets its own engine built from its own config, so runs
//! share nothing and parallelize trivially with rayon.

use rayon::prelude::*;
use std::collections::HashMap;

use replaylab_core::domain::SignalEvent;
use replaylab_core::series::{ContextStore, PriceSeries};

use crate::config::RunConfig;
use crate::runner::{run_replay, ReplayReport, RunError};

/// Parameter grid specification.
///
/// `stop_scales` multiply all three regime stop distances together, so a
/// sweep widens or tightens the whole ladder rather than distorting its
/// shape.
#[derive(Debug, Clone)]
pub struct SweepGrid {
    pub stop_scales: Vec<f64>,
    pub reward_risk_ratios: Vec<f64>,
    pub cooldown_hours: Vec<i64>,
}

impl SweepGrid {
    /// A modest default grid around the standard risk parameters.
    pub fn risk_default() -> Self {
        Self {
            stop_scales: vec![0.75, 1.0, 1.25],
            reward_risk_ratios: vec![1.5, 2.0, 3.0],
            cooldown_hours: vec![12],
        }
    }

    /// Total number of configurations in this grid.
    pub fn size(&self) -> usize {
        self.stop_scales.len() * self.reward_risk_ratios.len() * self.cooldown_hours.len()
    }

    /// Generate all configurations, derived from `base`.
    pub fn generate_configs(&self, base: &RunConfig) -> Vec<RunConfig> {
        let mut configs = Vec::with_capacity(self.size());
        for &scale in &self.stop_scales {
            for &rr in &self.reward_risk_ratios {
                for &cooldown in &self.cooldown_hours {
                    let mut config = base.clone();
                    config.risk.sl_low = base.risk.sl_low * scale;
                    config.risk.sl_med = base.risk.sl_med * scale;
                    config.risk.sl_high = base.risk.sl_high * scale;
                    config.risk.reward_risk_ratio = rr;
                    config.backtest.cooldown_hours = cooldown;
                    configs.push(config);
                }
            }
        }
        configs
    }
}

/// Run every grid point against the same inputs, in parallel.
pub fn sweep(
    grid: &SweepGrid,
    base: &RunConfig,
    prices: &PriceSeries,
    signals: &[SignalEvent],
    context: &ContextStore,
    dataset_hash: &str,
) -> Result<SweepResults, RunError> {
    let configs = grid.generate_configs(base);

    let reports: Vec<ReplayReport> = configs
        .par_iter()
        .map(|config| run_replay(config, prices, signals, context, None, dataset_hash))
        .collect::<Result<Vec<_>, RunError>>()?;

    Ok(SweepResults::new(reports))
}

/// Results from a parameter sweep, rankable by total R.
#[derive(Debug)]
pub struct SweepResults {
    reports: Vec<ReplayReport>,
    by_run_id: HashMap<String, usize>,
}

impl SweepResults {
    fn new(reports: Vec<ReplayReport>) -> Self {
        let by_run_id = reports
            .iter()
            .enumerate()
            .map(|(i, r)| (r.run_id.clone(), i))
            .collect();
        Self { reports, by_run_id }
    }

    pub fn all(&self) -> &[ReplayReport] {
        &self.reports
    }

    pub fn len(&self) -> usize {
        self.reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    pub fn get(&self, run_id: &str) -> Option<&ReplayReport> {
        self.by_run_id.get(run_id).map(|&i| &self.reports[i])
    }

    /// Reports sorted by total R, best first.
    pub fn ranked(&self) -> Vec<&ReplayReport> {
        let mut sorted: Vec<_> = self.reports.iter().collect();
        sorted.sort_by(|a, b| {
            b.metrics
                .total_r
                .partial_cmp(&a.metrics.total_r)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        sorted
    }

    pub fn top_n(&self, n: usize) -> Vec<&ReplayReport> {
        self.ranked().into_iter().take(n).collect()
    }

    pub fn best(&self) -> Option<&ReplayReport> {
        self.ranked().into_iter().next()
    }
}
