//! Input loading: price CSV, signal CSV, and context JSONL files.
//!
//! Loaders normalize headers (case-insensitive, common aliases), sort by
//! timestamp, and hand validated series to the engine. Context files are
//! loaded leniently: malformed lines are skipped with a warning, because a
//! missing snapshot is an ordinary `no_context` rejection downstream, not
//! a reason to abort the whole run.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use replaylab_core::domain::{ContextSnapshot, PriceBar, SignalEvent};
use replaylab_core::series::{ContextSeries, PriceSeries, SeriesError};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from the input loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse CSV {path}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{path}: missing required column '{column}'")]
    MissingColumn { path: PathBuf, column: &'static str },

    #[error("{path} record {record}: unparseable timestamp '{value}'")]
    BadTimestamp {
        path: PathBuf,
        record: usize,
        value: String,
    },

    #[error("{path} record {record}: unparseable number '{value}' in column '{column}'")]
    BadNumber {
        path: PathBuf,
        record: usize,
        column: String,
        value: String,
    },

    #[error("{path} record {record}: unknown direction '{value}'")]
    BadDirection {
        path: PathBuf,
        record: usize,
        value: String,
    },

    #[error(transparent)]
    Series(#[from] SeriesError),
}

/// Parse a timestamp in RFC 3339 or naive `YYYY-MM-DD HH:MM[:SS]` form;
/// naive timestamps are taken as UTC. A bare date means midnight UTC.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date.and_hms_opt(0, 0, 0)?.and_utc());
    }
    None
}

/// Case-insensitive header lookup across a list of aliases.
fn find_column(headers: &csv::StringRecord, aliases: &[&str]) -> Option<usize> {
    headers.iter().position(|h| {
        let h = h.trim().to_ascii_lowercase();
        aliases.contains(&h.as_str())
    })
}

const TIMESTAMP_ALIASES: &[&str] = &["timestamp", "time", "datetime", "date"];

/// Load an OHLCV price CSV.
///
/// Requires timestamp and close columns; missing open/high/low fall back
/// to the close (flat bar), missing volume to zero. Rows are sorted by
/// timestamp and duplicate timestamps keep the first occurrence.
pub fn load_price_csv(path: &Path) -> Result<PriceSeries, LoadError> {
    let mut reader = csv::Reader::from_path(path).map_err(|source| LoadError::Csv {
        path: path.to_path_buf(),
        source,
    })?;
    let headers = reader
        .headers()
        .map_err(|source| LoadError::Csv {
            path: path.to_path_buf(),
            source,
        })?
        .clone();

    let ts_col = find_column(&headers, TIMESTAMP_ALIASES).ok_or(LoadError::MissingColumn {
        path: path.to_path_buf(),
        column: "timestamp",
    })?;
    let close_col = find_column(&headers, &["close"]).ok_or(LoadError::MissingColumn {
        path: path.to_path_buf(),
        column: "close",
    })?;
    let open_col = find_column(&headers, &["open"]);
    let high_col = find_column(&headers, &["high"]);
    let low_col = find_column(&headers, &["low"]);
    let volume_col = find_column(&headers, &["volume", "tick_volume", "vol"]);

    let mut bars = Vec::new();
    for (record_idx, record) in reader.records().enumerate() {
        let record = record.map_err(|source| LoadError::Csv {
            path: path.to_path_buf(),
            source,
        })?;

        let raw_ts = record.get(ts_col).unwrap_or("");
        let timestamp = parse_timestamp(raw_ts).ok_or_else(|| LoadError::BadTimestamp {
            path: path.to_path_buf(),
            record: record_idx,
            value: raw_ts.to_string(),
        })?;

        let number = |col: Option<usize>, name: &str| -> Result<Option<f64>, LoadError> {
            let Some(col) = col else { return Ok(None) };
            let raw = record.get(col).unwrap_or("").trim();
            if raw.is_empty() {
                return Ok(None);
            }
            raw.parse::<f64>()
                .map(Some)
                .map_err(|_| LoadError::BadNumber {
                    path: path.to_path_buf(),
                    record: record_idx,
                    column: name.to_string(),
                    value: raw.to_string(),
                })
        };

        let close = number(Some(close_col), "close")?.ok_or_else(|| LoadError::BadNumber {
            path: path.to_path_buf(),
            record: record_idx,
            column: "close".to_string(),
            value: String::new(),
        })?;
        let open = number(open_col, "open")?.unwrap_or(close);
        let high = number(high_col, "high")?.unwrap_or(close);
        let low = number(low_col, "low")?.unwrap_or(close);
        let volume = number(volume_col, "volume")?.unwrap_or(0.0);

        bars.push(PriceBar {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        });
    }

    bars.sort_by_key(|b| b.timestamp);
    bars.dedup_by_key(|b| b.timestamp);
    Ok(PriceSeries::new(bars)?)
}

/// Load a signal CSV: timestamp and direction columns, everything else
/// carried along as extra fields. Output is sorted by timestamp.
pub fn load_signals_csv(path: &Path) -> Result<Vec<SignalEvent>, LoadError> {
    let mut reader = csv::Reader::from_path(path).map_err(|source| LoadError::Csv {
        path: path.to_path_buf(),
        source,
    })?;
    let headers = reader
        .headers()
        .map_err(|source| LoadError::Csv {
            path: path.to_path_buf(),
            source,
        })?
        .clone();

    let ts_col = find_column(&headers, TIMESTAMP_ALIASES).ok_or(LoadError::MissingColumn {
        path: path.to_path_buf(),
        column: "timestamp",
    })?;
    let dir_col =
        find_column(&headers, &["direction", "side", "signal"]).ok_or(LoadError::MissingColumn {
            path: path.to_path_buf(),
            column: "direction",
        })?;

    let mut signals = Vec::new();
    for (record_idx, record) in reader.records().enumerate() {
        let record = record.map_err(|source| LoadError::Csv {
            path: path.to_path_buf(),
            source,
        })?;

        let raw_ts = record.get(ts_col).unwrap_or("");
        let timestamp = parse_timestamp(raw_ts).ok_or_else(|| LoadError::BadTimestamp {
            path: path.to_path_buf(),
            record: record_idx,
            value: raw_ts.to_string(),
        })?;

        let raw_dir = record.get(dir_col).unwrap_or("");
        let direction =
            replaylab_core::domain::Direction::parse(raw_dir).ok_or_else(|| {
                LoadError::BadDirection {
                    path: path.to_path_buf(),
                    record: record_idx,
                    value: raw_dir.to_string(),
                }
            })?;

        let mut signal = SignalEvent::new(timestamp, direction);
        for (col, header) in headers.iter().enumerate() {
            if col == ts_col || col == dir_col {
                continue;
            }
            let raw = record.get(col).unwrap_or("").trim();
            if raw.is_empty() {
                continue;
            }
            let value = match raw.parse::<f64>() {
                Ok(n) => serde_json::json!(n),
                Err(_) => serde_json::json!(raw),
            };
            signal.extra.insert(header.trim().to_string(), value);
        }
        signals.push(signal);
    }

    signals.sort_by_key(|s| s.timestamp);
    Ok(signals)
}

/// Load one context source from a JSONL file.
///
/// Each line is an object with a `timestamp` plus numeric fields.
/// Malformed lines and non-numeric fields are skipped with a warning.
/// Snapshots are sorted and duplicate timestamps keep the first.
pub fn load_context_jsonl(path: &Path, name: &str) -> Result<ContextSeries, LoadError> {
    let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut snapshots = Vec::new();
    for (line_idx, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let parsed: Result<BTreeMap<String, serde_json::Value>, _> = serde_json::from_str(line);
        let Ok(object) = parsed else {
            eprintln!(
                "WARNING: {}:{}: skipping malformed context line",
                path.display(),
                line_idx + 1
            );
            continue;
        };
        let Some(timestamp) = object
            .get("timestamp")
            .and_then(|v| v.as_str())
            .and_then(parse_timestamp)
        else {
            eprintln!(
                "WARNING: {}:{}: skipping context line without a valid timestamp",
                path.display(),
                line_idx + 1
            );
            continue;
        };

        let mut snapshot = ContextSnapshot::new(timestamp);
        for (key, value) in &object {
            if key == "timestamp" {
                continue;
            }
            if let Some(n) = value.as_f64() {
                snapshot.fields.insert(key.clone(), n);
            }
        }
        snapshots.push(snapshot);
    }

    snapshots.sort_by_key(|s| s.timestamp);
    snapshots.dedup_by_key(|s| s.timestamp);
    Ok(ContextSeries::new(name, snapshots)?)
}

/// Deterministic BLAKE3 hash over prices and signals, for provenance in
/// exported artifacts.
pub fn dataset_hash(prices: &PriceSeries, signals: &[SignalEvent]) -> String {
    let mut hasher = blake3::Hasher::new();
    for bar in prices.bars() {
        hasher.update(bar.timestamp.to_rfc3339().as_bytes());
        hasher.update(&bar.open.to_le_bytes());
        hasher.update(&bar.high.to_le_bytes());
        hasher.update(&bar.low.to_le_bytes());
        hasher.update(&bar.close.to_le_bytes());
        hasher.update(&bar.volume.to_le_bytes());
    }
    for signal in signals {
        hasher.update(signal.timestamp.to_rfc3339().as_bytes());
        hasher.update(signal.direction.to_string().as_bytes());
    }
    hasher.finalize().to_hex().to_string()
}
