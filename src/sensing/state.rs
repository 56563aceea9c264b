use serde::{Deserialize, Serialize};

use crate::models::ActivityState;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum LoopStatus {
    Running,
    /// Terminal; only reached through cancellation.
    Stopped,
}

impl Default for LoopStatus {
    fn default() -> Self {
        LoopStatus::Stopped
    }
}

/// What a single poll-classify-persist cycle ended with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Recorded(ActivityState),
    /// Source unreachable, timed out or returned garbage. Counted as UNKNOWN,
    /// nothing persisted.
    SourceError,
    /// Classified, but the sample could not be written.
    StorageError(ActivityState),
}

impl TickOutcome {
    pub fn state(&self) -> ActivityState {
        match self {
            TickOutcome::Recorded(state) | TickOutcome::StorageError(state) => *state,
            TickOutcome::SourceError => ActivityState::Unknown,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TickStats {
    pub recorded: u64,
    pub source_failures: u64,
    pub storage_failures: u64,
}

impl TickStats {
    pub fn record(&mut self, outcome: TickOutcome) {
        match outcome {
            TickOutcome::Recorded(_) => self.recorded += 1,
            TickOutcome::SourceError => self.source_failures += 1,
            TickOutcome::StorageError(_) => self.storage_failures += 1,
        }
    }

    pub fn total(&self) -> u64 {
        self.recorded + self.source_failures + self.storage_failures
    }
}
