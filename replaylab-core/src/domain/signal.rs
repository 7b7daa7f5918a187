//! SignalEvent — an externally generated trade signal.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Trade direction, normalized at the ingestion boundary.
///
/// `parse` is case-insensitive and accepts the broker-style synonyms
/// BUY (long) and SELL (short).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "LONG" | "BUY" => Some(Direction::Long),
            "SHORT" | "SELL" => Some(Direction::Short),
            _ => None,
        }
    }

    pub fn is_long(&self) -> bool {
        matches!(self, Direction::Long)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Long => write!(f, "LONG"),
            Direction::Short => write!(f, "SHORT"),
        }
    }
}

/// A single signal event from the external signal source.
///
/// Immutable once produced. Fields beyond timestamp and direction are not
/// interpreted by the engine; they ride along in `extra` for the
/// confirmation oracle to inspect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalEvent {
    pub timestamp: DateTime<Utc>,
    pub direction: Direction,
    #[serde(default)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl SignalEvent {
    pub fn new(timestamp: DateTime<Utc>, direction: Direction) -> Self {
        Self {
            timestamp,
            direction,
            extra: BTreeMap::new(),
        }
    }
}
