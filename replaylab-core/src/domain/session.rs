//! Session — UTC-hour-derived market activity window.

use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Time-of-day trading session, classified from the UTC hour.
///
/// The four sessions partition the 24-hour day with no gaps or overlaps:
/// [0,8) Asian, [8,13) London, [13,22) New_York, [22,24) Off_Hours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Session {
    Asian,
    London,
    #[serde(rename = "New_York")]
    NewYork,
    #[serde(rename = "Off_Hours")]
    OffHours,
}

impl Session {
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            0..=7 => Session::Asian,
            8..=12 => Session::London,
            13..=21 => Session::NewYork,
            _ => Session::OffHours,
        }
    }

    pub fn from_timestamp(ts: DateTime<Utc>) -> Self {
        Session::from_hour(ts.hour())
    }

    /// Canonical session name, matching the configuration surface.
    pub fn name(&self) -> &'static str {
        match self {
            Session::Asian => "Asian",
            Session::London => "London",
            Session::NewYork => "New_York",
            Session::OffHours => "Off_Hours",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Asian" => Some(Session::Asian),
            "London" => Some(Session::London),
            "New_York" => Some(Session::NewYork),
            "Off_Hours" => Some(Session::OffHours),
            _ => None,
        }
    }
}

impl fmt::Display for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
