use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{models::ActivityState, utils::clock::DayRange};

/// Seconds spent per state over a day range, derived from sample counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub range: DayRange,
    pub poll_interval_secs: u64,
    pub seconds: BTreeMap<ActivityState, u64>,
}

impl Summary {
    pub fn empty(range: DayRange, poll_interval_secs: u64) -> Self {
        Self {
            range,
            poll_interval_secs,
            seconds: BTreeMap::new(),
        }
    }

    pub fn add_count(&mut self, state: ActivityState, count: u64) {
        *self.seconds.entry(state).or_insert(0) += count * self.poll_interval_secs;
    }

    pub fn seconds_for(&self, state: ActivityState) -> u64 {
        self.seconds.get(&state).copied().unwrap_or(0)
    }

    pub fn total_secs(&self) -> u64 {
        self.seconds.values().sum()
    }

    pub fn sample_count(&self) -> u64 {
        if self.poll_interval_secs == 0 {
            return 0;
        }
        self.total_secs() / self.poll_interval_secs
    }

    /// Share of tracked time in `state`, 0.0 when nothing was tracked.
    pub fn fraction(&self, state: ActivityState) -> f64 {
        let total = self.total_secs();
        if total == 0 {
            0.0
        } else {
            self.seconds_for(state) as f64 / total as f64
        }
    }
}

/// One hour of a day's timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HourlyBucket {
    pub hour: u32,
    pub seconds: BTreeMap<ActivityState, u64>,
}

impl HourlyBucket {
    pub fn seconds_for(&self, state: ActivityState) -> u64 {
        self.seconds.get(&state).copied().unwrap_or(0)
    }

    /// State with the most time in this hour; ties go to report order.
    pub fn dominant(&self) -> Option<ActivityState> {
        ActivityState::ACCOUNTED
            .into_iter()
            .filter(|s| self.seconds_for(*s) > 0)
            .fold(None, |best: Option<ActivityState>, s| match best {
                Some(b) if self.seconds_for(b) >= self.seconds_for(s) => Some(b),
                _ => Some(s),
            })
    }
}
