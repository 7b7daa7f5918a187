//! Domain types: bars, signals, sessions, context snapshots, trades, equity.

pub mod bar;
pub mod context;
pub mod equity;
pub mod session;
pub mod signal;
pub mod trade;

pub use bar::PriceBar;
pub use context::{ContextSnapshot, FusedContext};
pub use equity::EquityPoint;
pub use session::Session;
pub use signal::{Direction, SignalEvent};
pub use trade::{ExitKind, Trade};
