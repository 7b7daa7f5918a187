//! ContextSnapshot — a point-in-time reading from a named context source.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One snapshot from a context source (e.g. a volatility estimate).
///
/// Only the latest snapshot at or before a query time is ever visible to
/// the engine; that lookup discipline is what enforces no-lookahead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextSnapshot {
    pub timestamp: DateTime<Utc>,
    pub fields: BTreeMap<String, f64>,
}

impl ContextSnapshot {
    pub fn new(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            fields: BTreeMap::new(),
        }
    }

    pub fn with_field(mut self, name: &str, value: f64) -> Self {
        self.fields.insert(name.to_string(), value);
        self
    }

    pub fn value(&self, name: &str) -> Option<f64> {
        self.fields.get(name).copied()
    }
}

/// The set of latest-available snapshots from all configured context
/// sources at a given instant, keyed by source name.
pub type FusedContext = BTreeMap<String, ContextSnapshot>;
