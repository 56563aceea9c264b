//! Local-time timestamps as stored in the sample log, and the single
//! definition of which calendar day a timestamp belongs to.

use anyhow::{anyhow, Context, Result};
use chrono::{Days, Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const DAY_FORMAT: &str = "%Y-%m-%d";

pub fn now_local() -> NaiveDateTime {
    Local::now().naive_local()
}

pub fn format_timestamp(ts: NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

pub fn parse_timestamp(value: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT)
        .with_context(|| format!("invalid timestamp '{value}'"))
}

pub fn parse_day(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, DAY_FORMAT)
        .with_context(|| format!("invalid date '{value}', expected YYYY-MM-DD"))
}

pub fn day_of(ts: NaiveDateTime) -> NaiveDate {
    ts.date()
}

/// `YYYY-MM-DD`, which is also the prefix of every stored timestamp on that
/// day.
pub fn day_key(day: NaiveDate) -> String {
    day.format(DAY_FORMAT).to_string()
}

/// Inclusive range of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DayRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if end < start {
            return Err(anyhow!("day range ends ({end}) before it starts ({start})"));
        }
        Ok(Self { start, end })
    }

    pub fn single(day: NaiveDate) -> Self {
        Self {
            start: day,
            end: day,
        }
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start <= day && day <= self.end
    }

    /// Half-open timestamp bounds `[start 00:00:00, day after end 00:00:00)`
    /// in stored string form. Lexicographic order of the stored format equals
    /// chronological order.
    pub fn timestamp_bounds(&self) -> Result<(String, String)> {
        let lower = self
            .start
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| anyhow!("invalid range start {}", self.start))?;
        let upper = self
            .end
            .checked_add_days(Days::new(1))
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .ok_or_else(|| anyhow!("range end {} out of bounds", self.end))?;
        Ok((format_timestamp(lower), format_timestamp(upper)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamps_round_trip_and_keep_day() {
        let ts = parse_timestamp("2025-03-09 23:59:55").unwrap();
        assert_eq!(format_timestamp(ts), "2025-03-09 23:59:55");
        assert_eq!(day_key(day_of(ts)), "2025-03-09");
        assert!(parse_timestamp("2025-03-09T23:59:55").is_err());
    }

    #[test]
    fn range_bounds_cover_whole_days() {
        let range = DayRange::new(
            parse_day("2025-03-09").unwrap(),
            parse_day("2025-03-10").unwrap(),
        )
        .unwrap();
        let (lo, hi) = range.timestamp_bounds().unwrap();
        assert_eq!(lo, "2025-03-09 00:00:00");
        assert_eq!(hi, "2025-03-11 00:00:00");
        assert!(range.contains(parse_day("2025-03-10").unwrap()));
        assert!(!range.contains(parse_day("2025-03-11").unwrap()));
    }

    #[test]
    fn inverted_range_is_rejected() {
        let a = parse_day("2025-03-10").unwrap();
        let b = parse_day("2025-03-09").unwrap();
        assert!(DayRange::new(a, b).is_err());
    }
}
