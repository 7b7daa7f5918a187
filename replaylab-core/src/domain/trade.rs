//! Trade — a fully resolved round trip produced by the replay pipeline.

use super::session::Session;
use super::signal::Direction;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How a trade left the market.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExitKind {
    Stop,
    Target,
}

impl ExitKind {
    /// Canonical name, identical to the serialized form.
    pub fn name(&self) -> &'static str {
        match self {
            ExitKind::Stop => "STOP",
            ExitKind::Target => "TARGET",
        }
    }
}

/// A completed trade: created exactly once per executed signal, immutable
/// thereafter, ordered by entry time.
///
/// `r_multiple` is the trade result expressed as a multiple of the fixed
/// risk amount: exactly -1.0 for a stop exit, the achieved reward:risk
/// ratio for a target exit. `equity_after` chains: each trade's value is
/// the previous trade's plus this trade's `pnl`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub signal_time: DateTime<Utc>,
    pub entry_time: DateTime<Utc>,
    pub session: Session,
    pub direction: Direction,
    pub entry_price: f64,
    pub stop_price: f64,
    pub target_price: f64,
    pub exit_kind: ExitKind,
    pub exit_time: DateTime<Utc>,
    pub exit_price: f64,
    pub pnl: f64,
    pub r_multiple: f64,
    pub equity_after: f64,
    pub volatility_at_entry: f64,
}

impl Trade {
    pub fn is_winner(&self) -> bool {
        self.r_multiple > 0.0
    }
}
