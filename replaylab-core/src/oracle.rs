//! Confirmation oracle — the pluggable signal-confirmation seam.
//!
//! The concrete confirmation logic lives outside this repository; the
//! engine consumes it only through this trait. With no oracle attached
//! the engine treats every signal as confirmed.

use crate::domain::{FusedContext, SignalEvent};

/// Accept/reject decision for a signal, given the fused context visible at
/// signal time and the would-be entry price.
///
/// `confirmation_score` returns a weighted score in [0, 1] for reporting
/// and threshold tuning; it must not mutate any state.
pub trait ConfirmationOracle: Send + Sync {
    fn confirm_signal(
        &self,
        signal: &SignalEvent,
        context: &FusedContext,
        entry_price: f64,
    ) -> bool;

    fn confirmation_score(&self, signal: &SignalEvent, context: &FusedContext) -> f64;
}

#[cfg(test)]
pub(crate) mod test_oracles {
    use super::*;

    /// Rejects everything; used to exercise the not-confirmed gate.
    pub struct RejectAll;

    impl ConfirmationOracle for RejectAll {
        fn confirm_signal(&self, _: &SignalEvent, _: &FusedContext, _: f64) -> bool {
            false
        }

        fn confirmation_score(&self, _: &SignalEvent, _: &FusedContext) -> f64 {
            0.0
        }
    }

    /// Confirms only when the named context source is visible.
    pub struct RequireSource(pub &'static str);

    impl ConfirmationOracle for RequireSource {
        fn confirm_signal(&self, _: &SignalEvent, context: &FusedContext, _: f64) -> bool {
            context.contains_key(self.0)
        }

        fn confirmation_score(&self, _: &SignalEvent, context: &FusedContext) -> f64 {
            if context.contains_key(self.0) {
                1.0
            } else {
                0.0
            }
        }
    }
}
