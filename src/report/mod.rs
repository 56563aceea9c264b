//! Read-only views over the sample log.
//!
//! Nothing here writes. "Rollover" is only a change of which day the view
//! shows by default; history is untouched.

pub mod format;

use anyhow::Result;
use chrono::NaiveDate;
use serde::Serialize;

use crate::{
    db::{Database, HourlyBucket, Sample, Summary},
    utils::clock::{day_of, now_local, DayRange},
};

pub use format::{format_duration, render_hourly, render_samples, render_summary, status_line};

/// The day a report shows when none is requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportFocus {
    day: NaiveDate,
}

impl ReportFocus {
    pub fn new(day: NaiveDate) -> Self {
        Self { day }
    }

    pub fn today() -> Self {
        Self::new(day_of(now_local()))
    }

    pub fn day(&self) -> NaiveDate {
        self.day
    }

    /// Moves the default focus to `new_day`. Returns the previously focused
    /// day when the focus actually changed.
    pub fn day_rollover(&mut self, new_day: NaiveDate) -> Option<NaiveDate> {
        if new_day == self.day {
            return None;
        }
        let previous = self.day;
        self.day = new_day;
        Some(previous)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyReport {
    pub day: NaiveDate,
    pub summary: Summary,
    pub hourly: Vec<HourlyBucket>,
    pub recent: Vec<Sample>,
}

impl DailyReport {
    pub async fn load(
        db: &Database,
        day: NaiveDate,
        poll_interval_secs: u64,
        recent_limit: u32,
    ) -> Result<Self> {
        let summary = db.summarize(DayRange::single(day), poll_interval_secs).await?;
        let hourly = db.hourly_breakdown(day, poll_interval_secs).await?;
        let recent = if recent_limit > 0 {
            db.recent_samples(recent_limit).await?
        } else {
            Vec::new()
        };

        Ok(Self {
            day,
            summary,
            hourly,
            recent,
        })
    }

    pub fn render_text(&self) -> String {
        let mut out = format!("--- Activity Report for {} ---\n", self.day);
        if self.summary.total_secs() == 0 {
            out.push_str("No samples recorded for this day.\n");
        } else {
            out.push_str(&render_summary(&self.summary));
            out.push_str("\nTimeline:\n");
            out.push_str(&render_hourly(&self.hourly));
        }
        out.push_str("-----------------------------------\n");

        if !self.recent.is_empty() {
            out.push_str(&format!("\nLast {} Raw Entries:\n", self.recent.len()));
            out.push_str(&render_samples(&self.recent));
        }
        out
    }
}
