//! Serializable run configuration with a content-addressable run id.

use replaylab_core::engine::{ConfigError, EngineConfig};
use replaylab_core::risk::RegimeRiskModel;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Unique identifier for a replay run (content-addressable hash).
pub type RunId = String;

#[derive(Debug, Error)]
pub enum ConfigFileError {
    #[error("failed to read config file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error(transparent)]
    Invalid(#[from] ConfigError),

    #[error("risk thresholds out of order: low {low} must be below high {high}")]
    ThresholdsOutOfOrder { low: f64, high: f64 },

    #[error("risk parameter {name} must be positive, got {value}")]
    NonPositiveRiskParam { name: &'static str, value: f64 },
}

/// Everything needed to reproduce a replay run: the engine parameters and
/// the risk model. Both sections fall back to their defaults when absent
/// from the TOML file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default)]
    pub backtest: EngineConfig,
    #[serde(default)]
    pub risk: RegimeRiskModel,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            backtest: EngineConfig::default(),
            risk: RegimeRiskModel::default(),
        }
    }
}

impl RunConfig {
    pub fn from_toml(text: &str, path: &Path) -> Result<Self, ConfigFileError> {
        let config: RunConfig = toml::from_str(text).map_err(|source| ConfigFileError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigFileError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigFileError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text, path)
    }

    pub fn validate(&self) -> Result<(), ConfigFileError> {
        self.backtest.validate()?;
        if self.risk.low_vol_threshold >= self.risk.high_vol_threshold {
            return Err(ConfigFileError::ThresholdsOutOfOrder {
                low: self.risk.low_vol_threshold,
                high: self.risk.high_vol_threshold,
            });
        }
        for (name, value) in [
            ("sl_low", self.risk.sl_low),
            ("sl_med", self.risk.sl_med),
            ("sl_high", self.risk.sl_high),
            ("reward_risk_ratio", self.risk.reward_risk_ratio),
        ] {
            if value <= 0.0 {
                return Err(ConfigFileError::NonPositiveRiskParam { name, value });
            }
        }
        Ok(())
    }

    /// Deterministic hash id for this configuration.
    ///
    /// Identical configs share a RunId, so artifacts from re-runs of the
    /// same parameters land in the same place.
    pub fn run_id(&self) -> RunId {
        let json = serde_json::to_string(self).expect("RunConfig serialization failed");
        blake3::hash(json.as_bytes()).to_hex().to_string()
    }
}
