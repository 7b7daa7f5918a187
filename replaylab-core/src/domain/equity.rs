//! EquityPoint — one sample of the account equity over the run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single point on the equity curve.
///
/// The curve holds one initial point (run start, initial capital) plus one
/// point per executed trade, strictly ordered by timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    pub timestamp: DateTime<Utc>,
    pub equity: f64,
}
