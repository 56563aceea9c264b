//! One row of the append-only activity log.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::models::ActivityState;

/// Current on-disk record format. Bump when a field is added to `Sample`.
pub const SAMPLE_RECORD_VERSION: i64 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sample {
    /// Assigned by the store on append.
    pub id: Option<i64>,
    /// Local wall-clock time of the tick.
    pub timestamp: NaiveDateTime,
    pub state: ActivityState,
    pub record_version: i64,
}

impl Sample {
    pub fn new(timestamp: NaiveDateTime, state: ActivityState) -> Self {
        Self {
            id: None,
            timestamp,
            state,
            record_version: SAMPLE_RECORD_VERSION,
        }
    }
}
