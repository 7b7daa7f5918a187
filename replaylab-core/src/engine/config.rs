//! Engine configuration and up-front validation.

use crate::domain::Session;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default lookahead window: 7 days of one-minute bars.
pub const DEFAULT_MAX_LOOKAHEAD_BARS: usize = 10_080;

/// Configuration errors are fatal and surfaced before any processing.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("end_date {end} is before start_date {start}")]
    EndBeforeStart { start: NaiveDate, end: NaiveDate },

    #[error("cooldown_hours must be non-negative, got {0}")]
    NegativeCooldown(i64),

    #[error("initial_capital must be positive, got {0}")]
    NonPositiveCapital(f64),

    #[error("risk_per_trade must be positive, got {0}")]
    NonPositiveRisk(f64),

    #[error("max_lookahead_bars must be at least 1")]
    ZeroLookahead,

    #[error("allowed_sessions must not be empty")]
    NoSessionsAllowed,
}

/// Parameters for a single replay run.
///
/// Dates are inclusive UTC date bounds on the signal window. The
/// volatility source names the context series whose latest snapshot is
/// mandatory for execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub initial_capital: f64,
    pub risk_per_trade: f64,
    pub cooldown_hours: i64,
    pub allowed_sessions: Vec<Session>,
    #[serde(default = "default_lookahead")]
    pub max_lookahead_bars: usize,
    #[serde(default = "default_volatility_source")]
    pub volatility_source: String,
}

fn default_lookahead() -> usize {
    DEFAULT_MAX_LOOKAHEAD_BARS
}

fn default_volatility_source() -> String {
    "garch".to_string()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 12, 31).unwrap(),
            initial_capital: 100.0,
            risk_per_trade: 5.0,
            cooldown_hours: 12,
            allowed_sessions: vec![Session::London, Session::NewYork],
            max_lookahead_bars: DEFAULT_MAX_LOOKAHEAD_BARS,
            volatility_source: default_volatility_source(),
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.end_date < self.start_date {
            return Err(ConfigError::EndBeforeStart {
                start: self.start_date,
                end: self.end_date,
            });
        }
        if self.cooldown_hours < 0 {
            return Err(ConfigError::NegativeCooldown(self.cooldown_hours));
        }
        if self.initial_capital <= 0.0 {
            return Err(ConfigError::NonPositiveCapital(self.initial_capital));
        }
        if self.risk_per_trade <= 0.0 {
            return Err(ConfigError::NonPositiveRisk(self.risk_per_trade));
        }
        if self.max_lookahead_bars == 0 {
            return Err(ConfigError::ZeroLookahead);
        }
        if self.allowed_sessions.is_empty() {
            return Err(ConfigError::NoSessionsAllowed);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(EngineConfig::default().validate(), Ok(()));
    }

    #[test]
    fn end_before_start_is_fatal() {
        let cfg = EngineConfig {
            start_date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            ..EngineConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::EndBeforeStart { .. })
        ));
    }

    #[test]
    fn single_day_window_is_valid() {
        let day = NaiveDate::from_ymd_opt(2025, 3, 3).unwrap();
        let cfg = EngineConfig {
            start_date: day,
            end_date: day,
            ..EngineConfig::default()
        };
        assert_eq!(cfg.validate(), Ok(()));
    }

    #[test]
    fn negative_cooldown_is_fatal() {
        let cfg = EngineConfig {
            cooldown_hours: -1,
            ..EngineConfig::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::NegativeCooldown(-1)));
    }

    #[test]
    fn zero_cooldown_is_allowed() {
        let cfg = EngineConfig {
            cooldown_hours: 0,
            ..EngineConfig::default()
        };
        assert_eq!(cfg.validate(), Ok(()));
    }

    #[test]
    fn non_positive_amounts_are_fatal() {
        let cfg = EngineConfig {
            initial_capital: 0.0,
            ..EngineConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::NonPositiveCapital(_))
        ));

        let cfg = EngineConfig {
            risk_per_trade: -5.0,
            ..EngineConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(ConfigError::NonPositiveRisk(_))));
    }

    #[test]
    fn empty_sessions_is_fatal() {
        let cfg = EngineConfig {
            allowed_sessions: vec![],
            ..EngineConfig::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::NoSessionsAllowed));
    }

    #[test]
    fn toml_roundtrip_with_defaults() {
        let toml_str = r#"
            start_date = "2025-01-01"
            end_date = "2025-06-30"
            initial_capital = 100.0
            risk_per_trade = 5.0
            cooldown_hours = 12
            allowed_sessions = ["London", "New_York"]
        "#;
        let cfg: EngineConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(cfg.max_lookahead_bars, DEFAULT_MAX_LOOKAHEAD_BARS);
        assert_eq!(cfg.volatility_source, "garch");
        assert_eq!(cfg.allowed_sessions, vec![Session::London, Session::NewYork]);
    }
}
