use std::collections::BTreeMap;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use rusqlite::{params, Connection};

use crate::{
    db::{
        connection::Database,
        helpers::{parse_row_state, parse_row_timestamp, to_u64},
        models::{HourlyBucket, Sample, Summary},
    },
    error::StorageError,
    models::ActivityState,
    utils::clock::{day_key, format_timestamp, parse_day, DayRange},
};

fn query_samples(conn: &Connection, sql: &str, param: &dyn rusqlite::ToSql) -> Result<Vec<Sample>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query(params![param])?;

    let mut samples = Vec::new();
    while let Some(row) = rows.next()? {
        let id: i64 = row.get("id")?;
        let timestamp: String = row.get("timestamp")?;
        let state: String = row.get("state")?;
        samples.push(Sample {
            id: Some(id),
            timestamp: parse_row_timestamp(id, &timestamp)?,
            state: parse_row_state(id, &state)?,
            record_version: row.get("record_version")?,
        });
    }

    Ok(samples)
}

impl Database {
    /// Appends one sample in its own transaction and returns its row id.
    /// Once this returns the row is committed to disk.
    pub async fn append(&self, sample: &Sample) -> Result<i64> {
        if !sample.state.is_accounted() {
            bail!("refusing to persist {} sample", sample.state);
        }

        let record = sample.clone();
        self.execute(move |conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "INSERT INTO activity_samples (timestamp, state, record_version)
                 VALUES (?1, ?2, ?3)",
                params![
                    format_timestamp(record.timestamp),
                    record.state.as_str(),
                    record.record_version,
                ],
            )
            .map_err(|err| StorageError::Write(err.to_string()))?;
            let id = tx.last_insert_rowid();
            tx.commit()
                .map_err(|err| StorageError::Write(err.to_string()))?;
            Ok(id)
        })
        .await
    }

    /// All samples whose timestamp starts with `YYYY-MM-DD` of `day`, oldest first.
    pub async fn samples_for_day(&self, day: NaiveDate) -> Result<Vec<Sample>> {
        let prefix = format!("{}%", day_key(day));
        self.execute(move |conn| {
            query_samples(
                conn,
                "SELECT id, timestamp, state, record_version
                 FROM activity_samples
                 WHERE timestamp LIKE ?1
                 ORDER BY id ASC",
                &prefix,
            )
        })
        .await
    }

    /// The `limit` most recently appended samples, newest first.
    pub async fn recent_samples(&self, limit: u32) -> Result<Vec<Sample>> {
        self.execute(move |conn| {
            query_samples(
                conn,
                "SELECT id, timestamp, state, record_version
                 FROM activity_samples
                 ORDER BY id DESC
                 LIMIT ?1",
                &limit,
            )
        })
        .await
    }

    /// Seconds per state over `range`: sample count times the poll interval.
    /// Read-only; repeated calls over an unchanged log return equal results.
    pub async fn summarize(&self, range: DayRange, poll_interval_secs: u64) -> Result<Summary> {
        let (lower, upper) = range.timestamp_bounds()?;
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT state, COUNT(*)
                 FROM activity_samples
                 WHERE timestamp >= ?1 AND timestamp < ?2
                 GROUP BY state",
            )?;
            let mut rows = stmt.query(params![lower, upper])?;

            let mut summary = Summary::empty(range, poll_interval_secs);
            while let Some(row) = rows.next()? {
                let state: String = row.get(0)?;
                let count = to_u64(row.get(1)?, "count")?;
                let state = state
                    .parse::<ActivityState>()
                    .with_context(|| format!("unexpected state in range {lower}..{upper}"))?;
                summary.add_count(state, count);
            }

            Ok(summary)
        })
        .await
    }

    /// Per-hour seconds per state for one day. Hours without samples are omitted.
    pub async fn hourly_breakdown(
        &self,
        day: NaiveDate,
        poll_interval_secs: u64,
    ) -> Result<Vec<HourlyBucket>> {
        let prefix = format!("{}%", day_key(day));
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT CAST(substr(timestamp, 12, 2) AS INTEGER) AS hour, state, COUNT(*)
                 FROM activity_samples
                 WHERE timestamp LIKE ?1
                 GROUP BY hour, state
                 ORDER BY hour ASC",
            )?;
            let mut rows = stmt.query(params![prefix])?;

            let mut buckets: BTreeMap<u32, BTreeMap<ActivityState, u64>> = BTreeMap::new();
            while let Some(row) = rows.next()? {
                let hour = u32::try_from(row.get::<_, i64>(0)?)
                    .context("negative hour in timestamp")?;
                let state: ActivityState = row.get::<_, String>(1)?.parse()?;
                let count = to_u64(row.get(2)?, "count")?;
                *buckets.entry(hour).or_default().entry(state).or_insert(0) +=
                    count * poll_interval_secs;
            }

            Ok(buckets
                .into_iter()
                .map(|(hour, seconds)| HourlyBucket { hour, seconds })
                .collect())
        })
        .await
    }

    /// Calendar days that have at least one sample, ascending.
    pub async fn days_with_samples(&self) -> Result<Vec<NaiveDate>> {
        self.execute(|conn| {
            let mut stmt = conn.prepare(
                "SELECT DISTINCT substr(timestamp, 1, 10) AS day
                 FROM activity_samples
                 ORDER BY day ASC",
            )?;
            let mut rows = stmt.query([])?;

            let mut days = Vec::new();
            while let Some(row) = rows.next()? {
                days.push(parse_day(&row.get::<_, String>(0)?)?);
            }
            Ok(days)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::clock::parse_timestamp;
    use tempfile::TempDir;

    fn open() -> (TempDir, Database) {
        let dir = TempDir::new().unwrap();
        let db = Database::new(dir.path().join("tracker.db")).unwrap();
        (dir, db)
    }

    fn sample(ts: &str, state: ActivityState) -> Sample {
        Sample::new(parse_timestamp(ts).unwrap(), state)
    }

    fn day(value: &str) -> NaiveDate {
        parse_day(value).unwrap()
    }

    #[tokio::test]
    async fn append_then_summarize_counts_interval_per_sample() {
        let (_dir, db) = open();
        for i in 0..7 {
            db.append(&sample(&format!("2025-03-09 10:00:{:02}", i * 5), ActivityState::Working))
                .await
                .unwrap();
        }

        let summary = db
            .summarize(DayRange::single(day("2025-03-09")), 5)
            .await
            .unwrap();
        assert_eq!(summary.seconds_for(ActivityState::Working), 35);
        assert_eq!(summary.seconds_for(ActivityState::Resting), 0);
        assert_eq!(summary.sample_count(), 7);
    }

    #[tokio::test]
    async fn unknown_state_is_never_persisted() {
        let (_dir, db) = open();
        assert!(db
            .append(&sample("2025-03-09 10:00:00", ActivityState::Unknown))
            .await
            .is_err());
        assert!(db.recent_samples(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn midnight_split_sums_to_whole_range() {
        let (_dir, db) = open();
        let rows = [
            ("2025-03-09 23:59:45", ActivityState::Working),
            ("2025-03-09 23:59:50", ActivityState::Working),
            ("2025-03-09 23:59:55", ActivityState::Resting),
            ("2025-03-10 00:00:00", ActivityState::Resting),
            ("2025-03-10 00:00:05", ActivityState::Away),
            ("2025-03-10 00:00:10", ActivityState::Working),
        ];
        for (ts, state) in rows {
            db.append(&sample(ts, state)).await.unwrap();
        }

        let first = db.summarize(DayRange::single(day("2025-03-09")), 5).await.unwrap();
        let second = db.summarize(DayRange::single(day("2025-03-10")), 5).await.unwrap();
        let whole = db
            .summarize(DayRange::new(day("2025-03-09"), day("2025-03-10")).unwrap(), 5)
            .await
            .unwrap();

        for state in ActivityState::ACCOUNTED {
            assert_eq!(
                first.seconds_for(state) + second.seconds_for(state),
                whole.seconds_for(state),
                "{state}"
            );
        }
        assert_eq!(first.total_secs(), 15);
        assert_eq!(second.total_secs(), 15);

        // Summaries do not change the log.
        let again = db
            .summarize(DayRange::new(day("2025-03-09"), day("2025-03-10")).unwrap(), 5)
            .await
            .unwrap();
        assert_eq!(again, whole);
    }

    #[tokio::test]
    async fn day_prefix_and_recent_queries() {
        let (_dir, db) = open();
        db.append(&sample("2025-03-09 08:00:00", ActivityState::Away)).await.unwrap();
        db.append(&sample("2025-03-10 08:00:00", ActivityState::Working)).await.unwrap();
        db.append(&sample("2025-03-10 09:30:00", ActivityState::Resting)).await.unwrap();

        let today = db.samples_for_day(day("2025-03-10")).await.unwrap();
        assert_eq!(today.len(), 2);
        assert_eq!(today[0].state, ActivityState::Working);
        assert!(today.iter().all(|s| s.record_version == 1));

        let recent = db.recent_samples(2).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].state, ActivityState::Resting);
        assert!(recent[0].id > recent[1].id);

        assert_eq!(
            db.days_with_samples().await.unwrap(),
            vec![day("2025-03-09"), day("2025-03-10")]
        );
    }

    #[tokio::test]
    async fn hourly_breakdown_groups_by_hour() {
        let (_dir, db) = open();
        db.append(&sample("2025-03-10 08:00:00", ActivityState::Working)).await.unwrap();
        db.append(&sample("2025-03-10 08:00:05", ActivityState::Working)).await.unwrap();
        db.append(&sample("2025-03-10 08:59:55", ActivityState::Away)).await.unwrap();
        db.append(&sample("2025-03-10 13:10:00", ActivityState::Resting)).await.unwrap();

        let hours = db.hourly_breakdown(day("2025-03-10"), 5).await.unwrap();
        assert_eq!(hours.len(), 2);
        assert_eq!(hours[0].hour, 8);
        assert_eq!(hours[0].seconds_for(ActivityState::Working), 10);
        assert_eq!(hours[0].dominant(), Some(ActivityState::Working));
        assert_eq!(hours[1].hour, 13);
        assert_eq!(hours[1].dominant(), Some(ActivityState::Resting));
    }

    #[tokio::test]
    async fn samples_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tracker.db");
        {
            let db = Database::new(path.clone()).unwrap();
            db.append(&sample("2025-03-10 08:00:00", ActivityState::Working))
                .await
                .unwrap();
        }

        let db = Database::new(path).unwrap();
        let samples = db.recent_samples(5).await.unwrap();
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].state, ActivityState::Working);
    }
}
