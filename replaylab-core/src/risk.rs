//! Risk models — stop/target placement policies.
//!
//! The engine is agnostic to the concrete policy; anything implementing
//! `RiskModel` qualifies. The shipped `RegimeRiskModel` adapts stop
//! distance to the current volatility regime.

use crate::domain::Direction;
use serde::{Deserialize, Serialize};

/// Stop-loss and take-profit prices for an entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StopLevels {
    pub stop: f64,
    pub target: f64,
}

/// Maps an entry price, direction, and volatility reading to stop/target
/// levels. Implementations must be pure and total over finite inputs.
pub trait RiskModel: Send + Sync {
    fn stop_levels(&self, entry_price: f64, direction: Direction, volatility: f64) -> StopLevels;
}

/// Discrete volatility bucket used to select stop distances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VolRegime {
    Low,
    Medium,
    High,
}

/// Volatility-regime-adapted stop/target calculator.
///
/// Regimes are half-open buckets over the volatility reading:
/// [0, low) → Low, [low, high) → Medium, [high, ∞) → High. Each regime
/// carries a fixed stop distance in price units; the target distance is
/// the stop distance scaled by the reward:risk ratio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegimeRiskModel {
    pub low_vol_threshold: f64,
    pub high_vol_threshold: f64,
    pub sl_low: f64,
    pub sl_med: f64,
    pub sl_high: f64,
    pub reward_risk_ratio: f64,
}

impl Default for RegimeRiskModel {
    fn default() -> Self {
        Self {
            low_vol_threshold: 25.0,
            high_vol_threshold: 35.0,
            sl_low: 200.0,
            sl_med: 250.0,
            sl_high: 350.0,
            reward_risk_ratio: 2.0,
        }
    }
}

impl RegimeRiskModel {
    pub fn classify(&self, volatility: f64) -> VolRegime {
        if volatility < self.low_vol_threshold {
            VolRegime::Low
        } else if volatility < self.high_vol_threshold {
            VolRegime::Medium
        } else {
            VolRegime::High
        }
    }

    fn stop_distance(&self, regime: VolRegime) -> f64 {
        match regime {
            VolRegime::Low => self.sl_low,
            VolRegime::Medium => self.sl_med,
            VolRegime::High => self.sl_high,
        }
    }
}

impl RiskModel for RegimeRiskModel {
    fn stop_levels(&self, entry_price: f64, direction: Direction, volatility: f64) -> StopLevels {
        let sl_distance = self.stop_distance(self.classify(volatility));
        let tp_distance = sl_distance * self.reward_risk_ratio;

        match direction {
            Direction::Long => StopLevels {
                stop: entry_price - sl_distance,
                target: entry_price + tp_distance,
            },
            Direction::Short => StopLevels {
                stop: entry_price + sl_distance,
                target: entry_price - tp_distance,
            },
        }
    }
}
