//! Artifact export — JSON and CSV outputs for a finished run.
//!
//! Each run gets its own directory under the output root containing:
//! - `manifest.json` — the full `ReplayReport` (schema-versioned)
//! - `metrics.json` — just the metrics block, for quick inspection
//! - `trades.csv` — the trade tape
//! - `equity.csv` — the equity curve
//!
//! Unknown schema versions are rejected on load.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use replaylab_core::domain::{EquityPoint, Trade};

use crate::runner::{ReplayReport, SCHEMA_VERSION};

// ─── JSON ───────────────────────────────────────────────────────────

/// Serialize a `ReplayReport` to pretty JSON.
pub fn export_json(report: &ReplayReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("failed to serialize ReplayReport to JSON")
}

/// Deserialize a `ReplayReport` from JSON, rejecting unknown schema versions.
pub fn import_json(json: &str) -> Result<ReplayReport> {
    let report: ReplayReport =
        serde_json::from_str(json).context("failed to deserialize ReplayReport from JSON")?;
    if report.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            report.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(report)
}

// ─── CSV ────────────────────────────────────────────────────────────

/// Export the trade tape as CSV.
pub fn export_trades_csv(trades: &[Trade]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "signal_time",
        "entry_time",
        "session",
        "direction",
        "entry_price",
        "stop_price",
        "target_price",
        "exit_kind",
        "exit_time",
        "exit_price",
        "pnl",
        "r_multiple",
        "equity_after",
        "volatility_at_entry",
    ])?;

    for t in trades {
        wtr.write_record([
            &t.signal_time.to_rfc3339(),
            &t.entry_time.to_rfc3339(),
            t.session.name(),
            &t.direction.to_string(),
            &format!("{:.6}", t.entry_price),
            &format!("{:.6}", t.stop_price),
            &format!("{:.6}", t.target_price),
            t.exit_kind.name(),
            &t.exit_time.to_rfc3339(),
            &format!("{:.6}", t.exit_price),
            &format!("{:.4}", t.pnl),
            &format!("{:.4}", t.r_multiple),
            &format!("{:.4}", t.equity_after),
            &format!("{:.2}", t.volatility_at_entry),
        ])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Export the equity curve as CSV with timestamp and equity columns.
pub fn export_equity_csv(equity_curve: &[EquityPoint]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["timestamp", "equity"])?;
    for point in equity_curve {
        wtr.write_record([&point.timestamp.to_rfc3339(), &format!("{:.4}", point.equity)])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Save the full artifact set for a run.
///
/// Creates `{run_id_prefix}_{timestamp}/` under `output_dir` and returns
/// the created path.
pub fn save_artifacts(report: &ReplayReport, output_dir: &Path) -> Result<PathBuf> {
    let dirname = format!(
        "{}_{}",
        &report.run_id[..report.run_id.len().min(12)],
        chrono::Local::now().format("%Y%m%d_%H%M%S")
    );
    let run_dir = output_dir.join(dirname);
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create artifact dir: {}", run_dir.display()))?;

    let json = export_json(report)?;
    std::fs::write(run_dir.join("manifest.json"), &json)?;

    let metrics_json = serde_json::to_string_pretty(&report.metrics)
        .context("failed to serialize metrics to JSON")?;
    std::fs::write(run_dir.join("metrics.json"), &metrics_json)?;

    let trades_csv = export_trades_csv(&report.trades)?;
    std::fs::write(run_dir.join("trades.csv"), &trades_csv)?;

    let equity_csv = export_equity_csv(&report.equity_curve)?;
    std::fs::write(run_dir.join("equity.csv"), &equity_csv)?;

    Ok(run_dir)
}

/// Load a `ReplayReport` from an artifact directory's manifest.json.
pub fn load_artifacts(dir: &Path) -> Result<ReplayReport> {
    let manifest_path = dir.join("manifest.json");
    let json = std::fs::read_to_string(&manifest_path)
        .with_context(|| format!("failed to read {}", manifest_path.display()))?;
    import_json(&json)
}
