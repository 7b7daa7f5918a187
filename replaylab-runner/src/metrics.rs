//! Performance metrics — pure functions over trade lists and equity curves.
//!
//! Every metric is a pure function: trades and/or equity curve in, scalar
//! out. All trade statistics are in R-multiple units, so they are
//! comparable across runs regardless of capital or risk sizing.

use chrono::Datelike;
use replaylab_core::domain::{EquityPoint, Trade};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Trading days per year, used to annualize the Sharpe ratio.
const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Aggregate performance metrics for a single replay run.
///
/// `profit_factor` is `f64::INFINITY` when the run has winners but no
/// losers; JSON export renders that as `null`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayMetrics {
    pub trade_count: usize,
    pub wins: usize,
    pub losses: usize,
    pub win_rate: f64,
    pub total_r: f64,
    pub avg_win_r: f64,
    pub avg_loss_r: f64,
    pub expectancy_r: f64,
    #[serde(with = "profit_factor_serde")]
    pub profit_factor: f64,
    pub sharpe: f64,
    pub max_drawdown_abs: f64,
    pub max_drawdown_pct: f64,
    pub final_equity: f64,
    pub monthly_r: BTreeMap<String, f64>,
}

impl ReplayMetrics {
    /// Compute all metrics from a run's trades and equity curve.
    pub fn compute(trades: &[Trade], equity_curve: &[EquityPoint], initial_capital: f64) -> Self {
        let (dd_abs, dd_pct) = max_drawdown(equity_curve);
        let final_equity = equity_curve
            .last()
            .map(|p| p.equity)
            .unwrap_or(initial_capital);
        Self {
            trade_count: trades.len(),
            wins: trades.iter().filter(|t| t.is_winner()).count(),
            losses: trades.iter().filter(|t| !t.is_winner()).count(),
            win_rate: win_rate(trades),
            total_r: total_r(trades),
            avg_win_r: avg_win_r(trades),
            avg_loss_r: avg_loss_r(trades),
            expectancy_r: expectancy_r(trades),
            profit_factor: profit_factor(trades),
            sharpe: sharpe_ratio(trades),
            max_drawdown_abs: dd_abs,
            max_drawdown_pct: dd_pct,
            final_equity,
            monthly_r: monthly_r(trades),
        }
    }
}

// ─── Individual metric functions ────────────────────────────────────

/// Sum of all R-multiples.
pub fn total_r(trades: &[Trade]) -> f64 {
    trades.iter().map(|t| t.r_multiple).sum()
}

/// Fraction of trades with a positive R-multiple.
pub fn win_rate(trades: &[Trade]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    let winners = trades.iter().filter(|t| t.is_winner()).count();
    winners as f64 / trades.len() as f64
}

/// Mean R of winning trades; 0.0 when there are none.
pub fn avg_win_r(trades: &[Trade]) -> f64 {
    let wins: Vec<f64> = trades
        .iter()
        .filter(|t| t.is_winner())
        .map(|t| t.r_multiple)
        .collect();
    if wins.is_empty() {
        return 0.0;
    }
    wins.iter().sum::<f64>() / wins.len() as f64
}

/// Mean loss magnitude in R (a positive number); 0.0 when there are no
/// losing trades.
pub fn avg_loss_r(trades: &[Trade]) -> f64 {
    let losses: Vec<f64> = trades
        .iter()
        .filter(|t| !t.is_winner())
        .map(|t| t.r_multiple.abs())
        .collect();
    if losses.is_empty() {
        return 0.0;
    }
    losses.iter().sum::<f64>() / losses.len() as f64
}

/// Expected R per trade: win_rate * avg_win - loss_rate * avg_loss.
pub fn expectancy_r(trades: &[Trade]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    let wr = win_rate(trades);
    wr * avg_win_r(trades) - (1.0 - wr) * avg_loss_r(trades)
}

/// Gross positive R / gross negative R magnitude.
///
/// `f64::INFINITY` when there are winners but no losers; 0.0 for an
/// empty trade list.
pub fn profit_factor(trades: &[Trade]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    let gross_profit: f64 = trades
        .iter()
        .filter(|t| t.r_multiple > 0.0)
        .map(|t| t.r_multiple)
        .sum();
    let gross_loss: f64 = trades
        .iter()
        .filter(|t| t.r_multiple < 0.0)
        .map(|t| t.r_multiple.abs())
        .sum();

    if gross_loss < 1e-12 {
        return if gross_profit > 0.0 { f64::INFINITY } else { 0.0 };
    }
    gross_profit / gross_loss
}

/// Annualized Sharpe ratio over the per-trade R series.
///
/// Annualization uses the observed trade frequency: trades per elapsed
/// whole day (truncated, floored at one day) scaled to 252 trading days.
/// Returns 0.0 for fewer than two trades or a zero-variance R series.
pub fn sharpe_ratio(trades: &[Trade]) -> f64 {
    if trades.len() < 2 {
        return 0.0;
    }
    let rs: Vec<f64> = trades.iter().map(|t| t.r_multiple).collect();
    let mean = mean_f64(&rs);
    let std = std_dev(&rs);
    if std < 1e-12 {
        return 0.0;
    }

    let first = trades[0].signal_time;
    let last = trades[trades.len() - 1].signal_time;
    let elapsed_days = ((last - first).num_days() as f64).max(1.0);
    let trades_per_year = trades.len() as f64 / elapsed_days * TRADING_DAYS_PER_YEAR;

    (mean / std) * trades_per_year.sqrt()
}

/// Maximum drawdown against the running equity peak.
///
/// Returns `(absolute, fraction_of_peak)`, both non-negative; (0, 0) for
/// a flat or monotonically rising curve.
pub fn max_drawdown(equity_curve: &[EquityPoint]) -> (f64, f64) {
    let mut peak = f64::NEG_INFINITY;
    let mut dd_abs = 0.0_f64;
    let mut dd_pct = 0.0_f64;

    for point in equity_curve {
        if point.equity > peak {
            peak = point.equity;
        }
        let abs = peak - point.equity;
        if abs > dd_abs {
            dd_abs = abs;
        }
        if peak > 0.0 {
            let pct = abs / peak;
            if pct > dd_pct {
                dd_pct = pct;
            }
        }
    }
    (dd_abs, dd_pct)
}

/// R-multiples summed per calendar month of the signal time, keyed
/// "YYYY-MM" so the map iterates chronologically.
pub fn monthly_r(trades: &[Trade]) -> BTreeMap<String, f64> {
    let mut months: BTreeMap<String, f64> = BTreeMap::new();
    for trade in trades {
        let key = format!(
            "{:04}-{:02}",
            trade.signal_time.year(),
            trade.signal_time.month()
        );
        *months.entry(key).or_insert(0.0) += trade.r_multiple;
    }
    months
}

// ─── Helpers ────────────────────────────────────────────────────────

/// JSON has no infinity; an infinite profit factor is written as `null`
/// and read back as infinity.
mod profit_factor_serde {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_finite() {
            serializer.serialize_some(value)
        } else {
            serializer.serialize_none()
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::INFINITY))
    }
}

pub(crate) fn mean_f64(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1 denominator).
pub(crate) fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let mean = mean_f64(values);
    let variance =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use replaylab_core::domain::{Direction, ExitKind, Session};

    fn ts(month: u32, day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, month, day, 14, 0, 0).unwrap()
    }

    fn make_trade(time: DateTime<Utc>, r: f64) -> Trade {
        let (exit_kind, exit_price) = if r > 0.0 {
            (ExitKind::Target, 20_400.0)
        } else {
            (ExitKind::Stop, 19_800.0)
        };
        Trade {
            signal_time: time,
            entry_time: time,
            session: Session::NewYork,
            direction: Direction::Long,
            entry_price: 20_000.0,
            stop_price: 19_800.0,
            target_price: 20_400.0,
            exit_kind,
            exit_time: time,
            exit_price,
            pnl: r * 5.0,
            r_multiple: r,
            equity_after: 100.0,
            volatility_at_entry: 20.0,
        }
    }

    fn point(equity: f64) -> EquityPoint {
        EquityPoint {
            timestamp: ts(1, 6),
            equity,
        }
    }

    // ── Total R and win rate ──

    #[test]
    fn total_r_sums_multiples() {
        let trades = vec![
            make_trade(ts(1, 6), 2.0),
            make_trade(ts(1, 8), -1.0),
            make_trade(ts(1, 10), 2.0),
        ];
        assert!((total_r(&trades) - 3.0).abs() < 1e-12);
    }

    #[test]
    fn win_rate_counts_positive_r_only() {
        let trades = vec![
            make_trade(ts(1, 6), 2.0),
            make_trade(ts(1, 8), -1.0),
            make_trade(ts(1, 10), 2.0),
            make_trade(ts(1, 12), -1.0),
        ];
        assert!((win_rate(&trades) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn win_rate_empty_is_zero() {
        assert_eq!(win_rate(&[]), 0.0);
    }

    // ── Expectancy ──

    #[test]
    fn expectancy_known_mix() {
        // 50% winners at +2R, 50% losers at -1R → 0.5*2 - 0.5*1 = 0.5
        let trades = vec![
            make_trade(ts(1, 6), 2.0),
            make_trade(ts(1, 8), -1.0),
            make_trade(ts(1, 10), 2.0),
            make_trade(ts(1, 12), -1.0),
        ];
        assert!((expectancy_r(&trades) - 0.5).abs() < 1e-12);
        assert!((avg_win_r(&trades) - 2.0).abs() < 1e-12);
        assert!((avg_loss_r(&trades) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn expectancy_uneven_mix() {
        // 10 trades, 6 winners at +2R and 4 losers at -1R:
        // win rate 0.6, expectancy 0.6*2 - 0.4*1 = 0.8
        let mut trades = Vec::new();
        for day in 1..=6 {
            trades.push(make_trade(ts(1, day * 2), 2.0));
        }
        for day in 7..=10 {
            trades.push(make_trade(ts(1, day * 2), -1.0));
        }
        assert!((win_rate(&trades) - 0.6).abs() < 1e-12);
        assert!((expectancy_r(&trades) - 0.8).abs() < 1e-12);
        assert!((total_r(&trades) - 8.0).abs() < 1e-12);
    }

    #[test]
    fn expectancy_empty_is_zero() {
        assert_eq!(expectancy_r(&[]), 0.0);
    }

    // ── Profit factor ──

    #[test]
    fn profit_factor_mixed() {
        // Gross profit 4.0, gross loss 2.0 → 2.0
        let trades = vec![
            make_trade(ts(1, 6), 2.0),
            make_trade(ts(1, 8), -1.0),
            make_trade(ts(1, 10), 2.0),
            make_trade(ts(1, 12), -1.0),
        ];
        assert!((profit_factor(&trades) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn profit_factor_no_losses_is_infinite() {
        let trades = vec![make_trade(ts(1, 6), 2.0), make_trade(ts(1, 8), 1.5)];
        assert_eq!(profit_factor(&trades), f64::INFINITY);
    }

    #[test]
    fn profit_factor_all_losses_is_zero() {
        let trades = vec![make_trade(ts(1, 6), -1.0), make_trade(ts(1, 8), -1.0)];
        assert_eq!(profit_factor(&trades), 0.0);
    }

    #[test]
    fn profit_factor_empty_is_zero() {
        assert_eq!(profit_factor(&[]), 0.0);
    }

    // ── Sharpe ──

    #[test]
    fn sharpe_requires_two_trades() {
        assert_eq!(sharpe_ratio(&[]), 0.0);
        assert_eq!(sharpe_ratio(&[make_trade(ts(1, 6), 2.0)]), 0.0);
    }

    #[test]
    fn sharpe_zero_variance_is_zero() {
        let trades = vec![make_trade(ts(1, 6), 2.0), make_trade(ts(1, 8), 2.0)];
        assert_eq!(sharpe_ratio(&trades), 0.0);
    }

    #[test]
    fn sharpe_known_series() {
        // Four trades over 6 days: mean 0.5, sample std sqrt(3)
        let trades = vec![
            make_trade(ts(1, 6), 2.0),
            make_trade(ts(1, 8), -1.0),
            make_trade(ts(1, 10), 2.0),
            make_trade(ts(1, 12), -1.0),
        ];
        let trades_per_year = 4.0_f64 / 6.0 * 252.0;
        let expected = (0.5 / 3.0_f64.sqrt()) * trades_per_year.sqrt();
        assert!((sharpe_ratio(&trades) - expected).abs() < 1e-9);
    }

    #[test]
    fn sharpe_counts_whole_days_only() {
        // Last trade 6 days 12 hours after the first: the span counts as
        // 6 days, not 6.5
        let trades = vec![
            make_trade(ts(1, 6), 2.0),
            make_trade(ts(1, 8), -1.0),
            make_trade(ts(1, 10), 2.0),
            make_trade(ts(1, 12) + chrono::Duration::hours(12), -1.0),
        ];
        let trades_per_year = 4.0_f64 / 6.0 * 252.0;
        let expected = (0.5 / 3.0_f64.sqrt()) * trades_per_year.sqrt();
        assert!((sharpe_ratio(&trades) - expected).abs() < 1e-9);
    }

    #[test]
    fn sharpe_elapsed_days_floored_at_one() {
        // Two trades 2 hours apart must not annualize by a fractional day
        let t0 = ts(1, 6);
        let t1 = t0 + chrono::Duration::hours(2);
        let trades = vec![make_trade(t0, 2.0), make_trade(t1, -1.0)];
        let s = sharpe_ratio(&trades);
        let expected = (0.5 / std_dev(&[2.0, -1.0])) * (2.0 * 252.0_f64).sqrt();
        assert!((s - expected).abs() < 1e-9);
    }

    // ── Max drawdown ──

    #[test]
    fn drawdown_known_curve() {
        let curve = vec![point(100.0), point(110.0), point(90.0), point(95.0)];
        let (abs, pct) = max_drawdown(&curve);
        assert!((abs - 20.0).abs() < 1e-12);
        assert!((pct - 20.0 / 110.0).abs() < 1e-12);
    }

    #[test]
    fn drawdown_monotonic_rise_is_zero() {
        let curve = vec![point(100.0), point(105.0), point(110.0)];
        assert_eq!(max_drawdown(&curve), (0.0, 0.0));
    }

    #[test]
    fn drawdown_empty_curve_is_zero() {
        assert_eq!(max_drawdown(&[]), (0.0, 0.0));
    }

    // ── Monthly breakdown ──

    #[test]
    fn monthly_r_groups_by_signal_month() {
        let trades = vec![
            make_trade(ts(1, 6), 2.0),
            make_trade(ts(1, 20), -1.0),
            make_trade(ts(2, 3), 2.0),
        ];
        let months = monthly_r(&trades);
        assert_eq!(months.len(), 2);
        assert!((months["2025-01"] - 1.0).abs() < 1e-12);
        assert!((months["2025-02"] - 2.0).abs() < 1e-12);
    }

    // ── Aggregate ──

    #[test]
    fn compute_no_trades_is_all_zero() {
        let curve = vec![point(100.0)];
        let m = ReplayMetrics::compute(&[], &curve, 100.0);
        assert_eq!(m.trade_count, 0);
        assert_eq!(m.total_r, 0.0);
        assert_eq!(m.win_rate, 0.0);
        assert_eq!(m.profit_factor, 0.0);
        assert_eq!(m.sharpe, 0.0);
        assert_eq!(m.final_equity, 100.0);
        assert!(m.monthly_r.is_empty());
    }

    #[test]
    fn compute_mixed_run() {
        let trades = vec![
            make_trade(ts(1, 6), 2.0),
            make_trade(ts(1, 8), -1.0),
            make_trade(ts(2, 10), 2.0),
        ];
        let curve = vec![point(100.0), point(110.0), point(105.0), point(115.0)];
        let m = ReplayMetrics::compute(&trades, &curve, 100.0);
        assert_eq!(m.trade_count, 3);
        assert_eq!(m.wins, 2);
        assert_eq!(m.losses, 1);
        assert!((m.total_r - 3.0).abs() < 1e-12);
        assert!((m.profit_factor - 4.0).abs() < 1e-12);
        assert!((m.max_drawdown_abs - 5.0).abs() < 1e-12);
        assert_eq!(m.final_equity, 115.0);
        assert!(m.sharpe.is_finite());
        assert_eq!(m.monthly_r.len(), 2);
    }

    // ── Serialization ──

    #[test]
    fn infinite_profit_factor_roundtrips_as_null() {
        let trades = vec![make_trade(ts(1, 6), 2.0), make_trade(ts(1, 8), 1.0)];
        let curve = vec![point(100.0), point(115.0)];
        let m = ReplayMetrics::compute(&trades, &curve, 100.0);
        assert_eq!(m.profit_factor, f64::INFINITY);

        let json = serde_json::to_string(&m).unwrap();
        assert!(json.contains("\"profit_factor\":null"));
        let back: ReplayMetrics = serde_json::from_str(&json).unwrap();
        assert_eq!(back.profit_factor, f64::INFINITY);
    }
}
