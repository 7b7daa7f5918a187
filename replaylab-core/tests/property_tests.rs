//! Property tests for the invariants the pipeline must hold on any input:
//! session partition totality, stop-first conservatism, exact -1R stops,
//! per-signal accounting balance, and the equity chain identity.

use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;
use replaylab_core::domain::{ContextSnapshot, Direction, ExitKind, PriceBar, Session, SignalEvent};
use replaylab_core::engine::{BacktestEngine, EngineConfig};
use replaylab_core::risk::RegimeRiskModel;
use replaylab_core::series::{ContextSeries, ContextStore, PriceSeries};
use replaylab_core::sim::resolve_trade;

fn base() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 2, 3, 0, 0, 0).unwrap()
}

/// Random-walk minute bars starting at 20_000, sane by construction.
fn bar_walk() -> impl Strategy<Value = Vec<PriceBar>> {
    prop::collection::vec((-80.0..80.0f64, 0.0..120.0f64), 50..400).prop_map(|moves| {
        let mut price = 20_000.0;
        let mut bars = Vec::with_capacity(moves.len());
        for (i, (delta, spread)) in moves.into_iter().enumerate() {
            let open = price;
            let close = open + delta;
            price = close;
            bars.push(PriceBar {
                timestamp: base() + Duration::minutes(i as i64),
                open,
                high: open.max(close) + spread,
                low: open.min(close) - spread,
                close,
                volume: 1.0,
            });
        }
        bars
    })
}

/// Sorted in-window signal times as minute offsets, with random directions.
fn signal_stream() -> impl Strategy<Value = Vec<SignalEvent>> {
    prop::collection::vec((0u32..4_000, prop::bool::ANY), 0..40).prop_map(|mut raw| {
        raw.sort_by_key(|(min, _)| *min);
        raw.into_iter()
            .map(|(min, long)| {
                let dir = if long { Direction::Long } else { Direction::Short };
                SignalEvent::new(base() + Duration::minutes(min as i64), dir)
            })
            .collect()
    })
}

fn context(vol: f64) -> ContextStore {
    let mut store = ContextStore::new();
    store.insert(
        ContextSeries::new(
            "garch",
            vec![ContextSnapshot::new(base()).with_field("vol", vol)],
        )
        .unwrap(),
    );
    store
}

fn config() -> EngineConfig {
    EngineConfig {
        start_date: base().date_naive(),
        end_date: base().date_naive() + Duration::days(5),
        allowed_sessions: vec![
            Session::Asian,
            Session::London,
            Session::NewYork,
            Session::OffHours,
        ],
        cooldown_hours: 1,
        ..EngineConfig::default()
    }
}

proptest! {
    #[test]
    fn every_hour_has_a_session(hour in 0u32..24) {
        // Totality: from_hour never panics and the name parses back
        let session = Session::from_hour(hour);
        prop_assert_eq!(Session::parse(session.name()), Some(session));
    }

    #[test]
    fn stop_exit_is_exactly_minus_one_r(
        entry in 1_000.0..50_000.0f64,
        distance in 10.0..500.0f64,
        rr in 1.0..4.0f64,
    ) {
        // One bar wide enough to cross the stop but not the target
        let stop = entry - distance;
        let target = entry + distance * rr;
        let bar = PriceBar {
            timestamp: base(),
            open: entry,
            high: entry + 1.0,
            low: stop - 1.0,
            close: stop,
            volume: 1.0,
        };
        let outcome = resolve_trade(&[bar], entry, Direction::Long, stop, target, 10).unwrap();
        prop_assert_eq!(outcome.exit_kind, ExitKind::Stop);
        prop_assert_eq!(outcome.r_multiple, -1.0);
    }

    #[test]
    fn same_bar_tie_always_resolves_to_stop(
        entry in 1_000.0..50_000.0f64,
        distance in 10.0..500.0f64,
        rr in 1.0..4.0f64,
    ) {
        let stop = entry - distance;
        let target = entry + distance * rr;
        let bar = PriceBar {
            timestamp: base(),
            open: entry,
            high: target + 1.0,
            low: stop - 1.0,
            close: entry,
            volume: 1.0,
        };
        let outcome = resolve_trade(&[bar], entry, Direction::Long, stop, target, 10).unwrap();
        prop_assert_eq!(outcome.exit_kind, ExitKind::Stop);

        // Mirror for shorts: stop above, target below
        let s_stop = entry + distance;
        let s_target = entry - distance * rr;
        let bar = PriceBar {
            timestamp: base(),
            open: entry,
            high: s_stop + 1.0,
            low: s_target - 1.0,
            close: entry,
            volume: 1.0,
        };
        let outcome =
            resolve_trade(&[bar], entry, Direction::Short, s_stop, s_target, 10).unwrap();
        prop_assert_eq!(outcome.exit_kind, ExitKind::Stop);
    }

    #[test]
    fn accounting_balances_on_any_stream(
        bars in bar_walk(),
        signals in signal_stream(),
        vol in 5.0..60.0f64,
    ) {
        let prices = PriceSeries::new(bars).unwrap();
        let engine = BacktestEngine::new(config(), Box::new(RegimeRiskModel::default()));
        let result = engine.run(&prices, &signals, &context(vol)).unwrap();

        let stats = &result.filter_stats;
        prop_assert!(stats.is_balanced());
        prop_assert_eq!(stats.trades_executed as usize, result.trades.len());
        prop_assert_eq!(stats.total_signals as usize, signals.len());
    }

    #[test]
    fn equity_chain_is_consistent(
        bars in bar_walk(),
        signals in signal_stream(),
        vol in 5.0..60.0f64,
    ) {
        let prices = PriceSeries::new(bars).unwrap();
        let cfg = config();
        let initial = cfg.initial_capital;
        let engine = BacktestEngine::new(cfg, Box::new(RegimeRiskModel::default()));
        let result = engine.run(&prices, &signals, &context(vol)).unwrap();

        // Curve seeded with the starting capital, then one point per trade
        prop_assert_eq!(result.equity_curve[0].equity, initial);
        prop_assert_eq!(result.equity_curve.len(), result.trades.len() + 1);

        let mut equity = initial;
        for (trade, point) in result.trades.iter().zip(&result.equity_curve[1..]) {
            equity += trade.pnl;
            prop_assert!((trade.equity_after - equity).abs() < 1e-9);
            prop_assert!((point.equity - equity).abs() < 1e-9);
            prop_assert_eq!(point.timestamp, trade.signal_time);
        }
    }

    #[test]
    fn trades_respect_the_cooldown(
        bars in bar_walk(),
        signals in signal_stream(),
        vol in 5.0..60.0f64,
    ) {
        let prices = PriceSeries::new(bars).unwrap();
        let cfg = config();
        let cooldown = Duration::hours(cfg.cooldown_hours);
        let engine = BacktestEngine::new(cfg, Box::new(RegimeRiskModel::default()));
        let result = engine.run(&prices, &signals, &context(vol)).unwrap();

        for pair in result.trades.windows(2) {
            prop_assert!(pair[1].signal_time - pair[0].signal_time >= cooldown);
        }
    }
}
