use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, Error};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityState {
    Working,
    Resting,
    Away,
    /// Errored tick. Never persisted.
    Unknown,
}

impl ActivityState {
    /// States that may appear in the sample log, in report order.
    pub const ACCOUNTED: [ActivityState; 3] = [
        ActivityState::Working,
        ActivityState::Resting,
        ActivityState::Away,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityState::Working => "WORKING",
            ActivityState::Resting => "RESTING",
            ActivityState::Away => "AWAY",
            ActivityState::Unknown => "UNKNOWN",
        }
    }

    pub fn is_accounted(&self) -> bool {
        !matches!(self, ActivityState::Unknown)
    }
}

impl fmt::Display for ActivityState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActivityState {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "WORKING" => Ok(ActivityState::Working),
            "RESTING" => Ok(ActivityState::Resting),
            "AWAY" => Ok(ActivityState::Away),
            "UNKNOWN" => Ok(ActivityState::Unknown),
            other => Err(anyhow!("unknown activity state '{other}'")),
        }
    }
}
