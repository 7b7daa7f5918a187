//! Trade simulator — forward bar scan resolving a trade to stop or target.

use crate::domain::{Direction, ExitKind, PriceBar};
use chrono::{DateTime, Utc};

/// The resolved outcome of a simulated trade.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeOutcome {
    pub exit_kind: ExitKind,
    pub exit_time: DateTime<Utc>,
    pub exit_price: f64,
    pub r_multiple: f64,
}

/// Scans bars strictly after entry, in order, up to `max_bars`, and
/// resolves the trade against the stop and target levels.
///
/// Per bar, the stop is crossed when the bar range reaches the adverse
/// level (long: low <= stop; short: high >= stop) and the target when it
/// reaches the favorable level (long: high >= target; short: low <=
/// target). When both are crossed within the same bar the stop resolves
/// first: the true intrabar path is unknown, so the adverse touch is
/// assumed to come first. This tie-break must not be altered — it is part
/// of the result contract and changing it changes every backtest.
///
/// A stop exit is exactly -1.0 R at the stop price; a target exit is the
/// achieved reward:risk ratio at the target price. Returns `None` when
/// neither level is crossed within the window — distinct from a loss; the
/// caller must not record a trade.
pub fn resolve_trade(
    bars_after_entry: &[PriceBar],
    entry_price: f64,
    direction: Direction,
    stop_price: f64,
    target_price: f64,
    max_bars: usize,
) -> Option<TradeOutcome> {
    for bar in bars_after_entry.iter().take(max_bars) {
        let (stop_hit, target_hit) = match direction {
            Direction::Long => (bar.low <= stop_price, bar.high >= target_price),
            Direction::Short => (bar.high >= stop_price, bar.low <= target_price),
        };

        if stop_hit {
            return Some(TradeOutcome {
                exit_kind: ExitKind::Stop,
                exit_time: bar.timestamp,
                exit_price: stop_price,
                r_multiple: -1.0,
            });
        }
        if target_hit {
            let rr = (target_price - entry_price).abs() / (stop_price - entry_price).abs();
            return Some(TradeOutcome {
                exit_kind: ExitKind::Target,
                exit_time: bar.timestamp,
                exit_price: target_price,
                r_multiple: rr,
            });
        }
    }

    None
}
