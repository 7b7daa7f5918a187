//! Text report — human-readable run summary for the terminal.

use crate::runner::ReplayReport;

/// Render the full run summary: signal funnel, performance block, and
/// monthly breakdown.
pub fn format_summary(report: &ReplayReport) -> String {
    let mut out = String::with_capacity(2048);
    let stats = &report.filter_stats;
    let m = &report.metrics;

    out.push_str(&"=".repeat(60));
    out.push('\n');
    out.push_str("REPLAY BACKTEST REPORT\n");
    out.push_str(&"=".repeat(60));
    out.push('\n');
    out.push_str(&format!("run id:       {}\n", report.run_id));
    out.push_str(&format!(
        "window:       {} to {} (inclusive)\n",
        report.config.backtest.start_date, report.config.backtest.end_date
    ));
    out.push_str(&format!("dataset hash: {}\n", report.dataset_hash));
    out.push('\n');

    out.push_str("SIGNAL FUNNEL\n");
    out.push_str(&format!("  total signals      {:>8}\n", stats.total_signals));
    out.push_str(&format!("  cooldown blocked   {:>8}\n", stats.cooldown_blocked));
    out.push_str(&format!("  session blocked    {:>8}\n", stats.session_blocked));
    out.push_str(&format!("  no entry bar       {:>8}\n", stats.no_entry_bar));
    out.push_str(&format!("  no context         {:>8}\n", stats.no_context));
    out.push_str(&format!("  not confirmed      {:>8}\n", stats.not_confirmed));
    out.push_str(&format!("  unresolved         {:>8}\n", stats.unresolved));
    out.push_str(&format!("  trades executed    {:>8}\n", stats.trades_executed));
    out.push('\n');

    out.push_str("PERFORMANCE\n");
    out.push_str(&format!("  trades             {:>8}\n", m.trade_count));
    out.push_str(&format!(
        "  wins / losses      {:>8}\n",
        format!("{} / {}", m.wins, m.losses)
    ));
    out.push_str(&format!("  win rate           {:>7.1}%\n", m.win_rate * 100.0));
    out.push_str(&format!("  total R            {:>8.2}\n", m.total_r));
    out.push_str(&format!("  expectancy (R)     {:>8.3}\n", m.expectancy_r));
    if m.profit_factor.is_finite() {
        out.push_str(&format!("  profit factor      {:>8.2}\n", m.profit_factor));
    } else {
        out.push_str("  profit factor           inf\n");
    }
    out.push_str(&format!("  sharpe             {:>8.2}\n", m.sharpe));
    out.push_str(&format!(
        "  max drawdown       {:>8.2} ({:.1}%)\n",
        m.max_drawdown_abs,
        m.max_drawdown_pct * 100.0
    ));
    out.push_str(&format!("  final equity       {:>8.2}\n", m.final_equity));
    out.push('\n');

    if !m.monthly_r.is_empty() {
        out.push_str("MONTHLY R\n");
        for (month, r) in &m.monthly_r {
            out.push_str(&format!("  {month}  {r:>+8.2}\n"));
        }
        out.push('\n');
    }

    out
}
