//! Time-indexed series with logarithmic-time lookups.
//!
//! Three containers back the replay pipeline:
//! - `PriceSeries`: validated OHLCV bars, "first bar strictly after T"
//! - `ContextSeries`: one named snapshot sequence, "latest at or before T"
//! - `ContextStore`: the set of context series, fused per query instant
//!
//! All series are validated at construction (non-empty where required,
//! strictly increasing timestamps) so the engine never has to re-check
//! ordering in its hot loop, and all lookups are binary searches over the
//! sorted timestamp index.

use crate::domain::{ContextSnapshot, FusedContext, PriceBar};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use thiserror::Error;

/// Validation failures for input series. These are fatal: the engine
/// refuses to run on data that would break its causality guarantees.
#[derive(Debug, Error)]
pub enum SeriesError {
    #[error("price series is empty")]
    EmptyPrices,

    #[error("price series timestamps not strictly increasing at index {index}")]
    UnsortedPrices { index: usize },

    #[error("price bar at index {index} has inconsistent OHLC values")]
    InsaneBar { index: usize },

    #[error("context series '{name}' timestamps not strictly increasing at index {index}")]
    UnsortedContext { name: String, index: usize },
}

/// An ordered, time-indexed sequence of OHLCV bars.
#[derive(Debug, Clone)]
pub struct PriceSeries {
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    /// Validates and wraps a bar sequence.
    pub fn new(bars: Vec<PriceBar>) -> Result<Self, SeriesError> {
        if bars.is_empty() {
            return Err(SeriesError::EmptyPrices);
        }
        for (i, bar) in bars.iter().enumerate() {
            if !bar.is_sane() {
                return Err(SeriesError::InsaneBar { index: i });
            }
            if i > 0 && bars[i - 1].timestamp >= bar.timestamp {
                return Err(SeriesError::UnsortedPrices { index: i });
            }
        }
        Ok(Self { bars })
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn first_timestamp(&self) -> DateTime<Utc> {
        self.bars[0].timestamp
    }

    pub fn last_timestamp(&self) -> DateTime<Utc> {
        self.bars[self.bars.len() - 1].timestamp
    }

    /// First bar with timestamp strictly greater than `ts`.
    pub fn first_after(&self, ts: DateTime<Utc>) -> Option<&PriceBar> {
        self.bars_after(ts).first()
    }

    /// All bars with timestamp strictly greater than `ts`, in order.
    pub fn bars_after(&self, ts: DateTime<Utc>) -> &[PriceBar] {
        let idx = self.bars.partition_point(|b| b.timestamp <= ts);
        &self.bars[idx..]
    }

    /// Bars with timestamps in `[from, to]`.
    pub fn range(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> &[PriceBar] {
        let lo = self.bars.partition_point(|b| b.timestamp < from);
        let hi = self.bars.partition_point(|b| b.timestamp <= to);
        &self.bars[lo..hi]
    }
}

/// One named sequence of context snapshots, sorted ascending.
#[derive(Debug, Clone)]
pub struct ContextSeries {
    name: String,
    snapshots: Vec<ContextSnapshot>,
}

impl ContextSeries {
    pub fn new(name: impl Into<String>, snapshots: Vec<ContextSnapshot>) -> Result<Self, SeriesError> {
        let name = name.into();
        for i in 1..snapshots.len() {
            if snapshots[i - 1].timestamp >= snapshots[i].timestamp {
                return Err(SeriesError::UnsortedContext {
                    name: name.clone(),
                    index: i,
                });
            }
        }
        Ok(Self { name, snapshots })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Latest snapshot at or before `ts`, if any.
    pub fn latest_at_or_before(&self, ts: DateTime<Utc>) -> Option<&ContextSnapshot> {
        let idx = self.snapshots.partition_point(|s| s.timestamp <= ts);
        if idx == 0 {
            None
        } else {
            Some(&self.snapshots[idx - 1])
        }
    }
}

/// Named collection of context series queried together.
#[derive(Debug, Clone, Default)]
pub struct ContextStore {
    series: BTreeMap<String, ContextSeries>,
}

impl ContextStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, series: ContextSeries) {
        self.series.insert(series.name().to_string(), series);
    }

    pub fn get(&self, name: &str) -> Option<&ContextSeries> {
        self.series.get(name)
    }

    pub fn source_names(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(|k| k.as_str())
    }

    /// Fuse the latest-at-or-before snapshot from every source at `ts`.
    ///
    /// Sources with no snapshot at or before `ts` are absent from the
    /// result; the engine decides which sources are mandatory.
    pub fn fuse_at(&self, ts: DateTime<Utc>) -> FusedContext {
        let mut fused = FusedContext::new();
        for (name, series) in &self.series {
            if let Some(snap) = series.latest_at_or_before(ts) {
                fused.insert(name.clone(), snap.clone());
            }
        }
        fused
    }
}
