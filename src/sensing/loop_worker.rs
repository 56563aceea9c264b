use chrono::{NaiveDate, NaiveDateTime};
use tokio::sync::watch;
use tokio::time::{Duration, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::{
    db::{Database, Sample},
    error::SourceError,
    models::{ActivityState, Detection},
    report::{format_duration, status_line, ReportFocus},
    utils::clock::{day_of, now_local, DayRange},
    zones::{classify, ZoneSet},
};

use super::source::DetectionSource;
use super::state::{LoopStatus, TickOutcome, TickStats};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_error, log_info, log_warn};

/// Everything one sampling loop needs, fixed for its lifetime.
pub struct SamplingContext<S> {
    pub source: S,
    pub zones: ZoneSet,
    pub db: Database,
    pub poll_interval: Duration,
    pub fetch_timeout: Duration,
}

impl<S> SamplingContext<S> {
    fn interval_secs(&self) -> u64 {
        self.poll_interval.as_secs().max(1)
    }
}

pub async fn sampling_loop<S: DetectionSource>(
    ctx: SamplingContext<S>,
    cancel_token: CancellationToken,
    status_tx: watch::Sender<LoopStatus>,
) -> TickStats {
    // Deadlines are absolute multiples of the interval from start, so a slow
    // tick never pushes later ticks back.
    let mut ticker = tokio::time::interval_at(Instant::now(), ctx.poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut stats = TickStats::default();
    let mut focus = ReportFocus::today();
    let _ = status_tx.send(LoopStatus::Running);

    log_info!(
        "sampling loop started: every {}s, zones {:?}",
        ctx.interval_secs(),
        ctx.zones.names()
    );

    loop {
        tokio::select! {
            biased;
            _ = cancel_token.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let now = now_local();
        let fetched = tokio::select! {
            biased;
            _ = cancel_token.cancelled() => {
                log_info!("abandoning in-flight poll for shutdown");
                break;
            }
            fetched = poll_source(&ctx) => fetched,
        };

        // Classification and the write are not cancellable: a sample is
        // either fully appended or never started.
        let outcome = record(&ctx, now, fetched).await;
        stats.record(outcome);

        if let TickOutcome::Recorded(state) = outcome {
            log_today(&ctx, now, state).await;
        }

        let today = day_of(now);
        if let Some(previous) = focus.day_rollover(today) {
            log_rollover(&ctx, previous, today).await;
        }
    }

    let _ = status_tx.send(LoopStatus::Stopped);
    log_info!(
        "sampling loop stopped after {} ticks ({} recorded, {} source failures, {} storage failures)",
        stats.total(),
        stats.recorded,
        stats.source_failures,
        stats.storage_failures
    );
    stats
}

/// One full poll-classify-persist cycle stamped with `now`.
pub async fn run_tick<S: DetectionSource>(
    ctx: &SamplingContext<S>,
    now: NaiveDateTime,
) -> TickOutcome {
    let fetched = poll_source(ctx).await;
    record(ctx, now, fetched).await
}

async fn poll_source<S: DetectionSource>(
    ctx: &SamplingContext<S>,
) -> Result<Vec<Detection>, SourceError> {
    match tokio::time::timeout(ctx.fetch_timeout, ctx.source.fetch()).await {
        Ok(result) => result,
        Err(_) => Err(SourceError::Timeout(ctx.fetch_timeout.as_secs())),
    }
}

async fn record<S>(
    ctx: &SamplingContext<S>,
    now: NaiveDateTime,
    fetched: Result<Vec<Detection>, SourceError>,
) -> TickOutcome {
    let detections = match fetched {
        Ok(detections) => detections,
        Err(err) => {
            log_warn!("tick {} is {}: {err}", now, ActivityState::Unknown);
            return TickOutcome::SourceError;
        }
    };

    let state = classify(&detections, &ctx.zones);

    match ctx.db.append(&Sample::new(now, state)).await {
        Ok(_) => TickOutcome::Recorded(state),
        Err(err) => {
            log_error!("failed to persist {state} sample for {now}: {err:?}");
            TickOutcome::StorageError(state)
        }
    }
}

async fn log_today<S>(ctx: &SamplingContext<S>, now: NaiveDateTime, state: ActivityState) {
    match ctx
        .db
        .summarize(DayRange::single(day_of(now)), ctx.interval_secs())
        .await
    {
        Ok(today) => log_info!("{}", status_line(state, &today)),
        Err(err) => log_warn!("could not total today's samples: {err:?}"),
    }
}

async fn log_rollover<S>(ctx: &SamplingContext<S>, previous: NaiveDate, today: NaiveDate) {
    log_info!("new day {today}; reports now default to it");
    match ctx
        .db
        .summarize(DayRange::single(previous), ctx.interval_secs())
        .await
    {
        Ok(summary) => {
            let totals: Vec<String> = ActivityState::ACCOUNTED
                .iter()
                .map(|s| format!("{s} {}", format_duration(summary.seconds_for(*s))))
                .collect();
            log_info!("totals for {previous}: {}", totals.join(", "));
        }
        Err(err) => log_warn!("could not summarize {previous}: {err:?}"),
    }
}
