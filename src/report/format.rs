use std::fmt::Write;

use crate::{
    db::{HourlyBucket, Sample, Summary},
    models::ActivityState,
    utils::clock::format_timestamp,
};

/// `3725` -> `1h 2m 5s`.
pub fn format_duration(total_secs: u64) -> String {
    let (minutes, secs) = (total_secs / 60, total_secs % 60);
    let (hours, minutes) = (minutes / 60, minutes % 60);
    format!("{hours}h {minutes}m {secs}s")
}

/// One-line tick log: current state plus today's running totals.
pub fn status_line(state: ActivityState, today: &Summary) -> String {
    let mut line = format!("Status: {state}");
    for s in ActivityState::ACCOUNTED {
        let _ = write!(line, " | {}: {}s", s, today.seconds_for(s));
    }
    line
}

pub fn render_summary(summary: &Summary) -> String {
    let mut out = String::new();
    for state in ActivityState::ACCOUNTED {
        let _ = writeln!(
            out,
            "{:<10}: {:>12} ({:>5.1}%)",
            state.as_str(),
            format_duration(summary.seconds_for(state)),
            summary.fraction(state) * 100.0
        );
    }
    let _ = writeln!(out, "{:<10}: {:>12}", "TOTAL", format_duration(summary.total_secs()));
    out
}

/// Text stand-in for the timeline chart: one row per hour with samples.
pub fn render_hourly(buckets: &[HourlyBucket]) -> String {
    let mut out = String::new();
    for bucket in buckets {
        let _ = write!(out, "{:02}:00", bucket.hour);
        for state in ActivityState::ACCOUNTED {
            let minutes = bucket.seconds_for(state) / 60;
            let _ = write!(out, "  {}={:>2}m", &state.as_str()[..1], minutes);
        }
        if let Some(dominant) = bucket.dominant() {
            let _ = write!(out, "  [{dominant}]");
        }
        out.push('\n');
    }
    out
}

pub fn render_samples(samples: &[Sample]) -> String {
    let mut out = String::new();
    for sample in samples {
        let _ = writeln!(
            out,
            "({}, '{}', '{}')",
            sample.id.unwrap_or_default(),
            format_timestamp(sample.timestamp),
            sample.state
        );
    }
    out
}
