//! Filter-stage counters — the observable outcome of every signal.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-stage counters for the signal pipeline.
///
/// Every in-window signal lands in exactly one bucket, so
/// `total_signals` always equals the sum of the stage counters plus
/// `trades_executed`. The `unresolved` bucket covers simulations that hit
/// neither stop nor target within the lookahead window; those signals
/// produce no trade but are still accounted for.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterStats {
    pub total_signals: u64,
    pub cooldown_blocked: u64,
    pub session_blocked: u64,
    pub no_entry_bar: u64,
    pub no_context: u64,
    pub not_confirmed: u64,
    pub unresolved: u64,
    pub trades_executed: u64,
}

impl FilterStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sum of all rejection buckets (everything except executed trades).
    pub fn total_rejected(&self) -> u64 {
        self.cooldown_blocked
            + self.session_blocked
            + self.no_entry_bar
            + self.no_context
            + self.not_confirmed
            + self.unresolved
    }

    /// True when every signal is accounted for by exactly one bucket.
    pub fn is_balanced(&self) -> bool {
        self.total_signals == self.total_rejected() + self.trades_executed
    }

    /// Stage-name → count view for reporting and export.
    pub fn as_map(&self) -> BTreeMap<&'static str, u64> {
        BTreeMap::from([
            ("total_signals", self.total_signals),
            ("cooldown_blocked", self.cooldown_blocked),
            ("session_blocked", self.session_blocked),
            ("no_entry_bar", self.no_entry_bar),
            ("no_context", self.no_context),
            ("not_confirmed", self.not_confirmed),
            ("unresolved", self.unresolved),
            ("trades_executed", self.trades_executed),
        ])
    }
}
