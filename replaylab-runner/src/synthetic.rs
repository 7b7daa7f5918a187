//! Synthetic demo data — a deterministic minute-bar walk with signals and
//! a volatility context, for trying the pipeline without real exports.
//!
//! Everything is seeded from a label via BLAKE3, so the same label and
//! date range always produce the same run.

use chrono::{Duration, NaiveDate, NaiveTime};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use replaylab_core::domain::{ContextSnapshot, Direction, PriceBar, SignalEvent};
use replaylab_core::series::{ContextSeries, ContextStore, PriceSeries, SeriesError};

/// A complete synthetic input set for one replay run.
#[derive(Debug)]
pub struct SyntheticData {
    pub prices: PriceSeries,
    pub signals: Vec<SignalEvent>,
    pub context: ContextStore,
}

/// Generate minute bars, signals, and a volatility context series over
/// `[start, end]` (inclusive dates).
///
/// The price is a random walk from 20_000; signals arrive every few hours
/// with random direction; volatility snapshots land every six hours and
/// wander across all three regimes.
pub fn generate(label: &str, start: NaiveDate, end: NaiveDate) -> Result<SyntheticData, SeriesError> {
    let seed: [u8; 32] = *blake3::hash(label.as_bytes()).as_bytes();
    let mut rng = StdRng::from_seed(seed);

    let start_ts = start.and_time(NaiveTime::MIN).and_utc();
    let end_ts = end.and_time(NaiveTime::MIN).and_utc() + Duration::days(1);
    let minutes = (end_ts - start_ts).num_minutes();

    let mut bars = Vec::with_capacity(minutes as usize);
    let mut price = 20_000.0_f64;
    for minute in 0..minutes {
        let delta: f64 = rng.gen_range(-12.0..12.0);
        let spread: f64 = rng.gen_range(0.0..18.0);
        let open = price;
        let close = open + delta;
        bars.push(PriceBar {
            timestamp: start_ts + Duration::minutes(minute),
            open,
            high: open.max(close) + spread,
            low: open.min(close) - spread,
            close,
            volume: rng.gen_range(50.0..5_000.0),
        });
        price = close;
    }

    let mut signals = Vec::new();
    let mut cursor = start_ts + Duration::minutes(rng.gen_range(30..240));
    while cursor < end_ts {
        let direction = if rng.gen_bool(0.5) {
            Direction::Long
        } else {
            Direction::Short
        };
        signals.push(SignalEvent::new(cursor, direction));
        cursor += Duration::minutes(rng.gen_range(90..600));
    }

    let mut snapshots = Vec::new();
    let mut vol = 22.0_f64;
    let mut snap_time = start_ts;
    while snap_time < end_ts {
        vol = (vol + rng.gen_range(-4.0..4.0)).clamp(10.0, 55.0);
        snapshots.push(ContextSnapshot::new(snap_time).with_field("vol", vol));
        snap_time += Duration::hours(6);
    }

    let mut context = ContextStore::new();
    context.insert(ContextSeries::new("garch", snapshots)?);

    Ok(SyntheticData {
        prices: PriceSeries::new(bars)?,
        signals,
        context,
    })
}
