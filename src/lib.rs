pub mod db;
pub mod error;
pub mod geometry;
pub mod models;
pub mod report;
pub mod sensing;
pub mod settings;
pub mod utils;
pub mod zones;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::{info, warn};

use db::Database;
use report::{DailyReport, ReportFocus};
use sensing::{EventApiSource, SamplingContext, SensingController};
use settings::Settings;
use utils::clock::parse_day;

#[derive(Parser)]
#[command(name = "zonetrack", version)]
#[command(about = "Tracks desk / bed / away time from camera zone detections")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the sampling loop until Ctrl-C
    Run {
        #[arg(short, long, default_value = "zonetrack.json")]
        config: PathBuf,
    },

    /// Print the activity summary for a day
    Report {
        #[arg(short, long, default_value = "zonetrack.json")]
        config: PathBuf,
        /// Day to report, YYYY-MM-DD (defaults to today)
        #[arg(short, long)]
        date: Option<String>,
        /// Number of most recent raw samples to list
        #[arg(short, long, default_value = "5")]
        recent: u32,
        #[arg(long)]
        json: bool,
    },
}

pub async fn run() -> Result<()> {
    utils::logging::init_logging();

    match Cli::parse().command {
        Command::Run { config } => run_tracker(&config).await,
        Command::Report {
            config,
            date,
            recent,
            json,
        } => run_report(&config, date.as_deref(), recent, json).await,
    }
}

async fn run_tracker(config: &Path) -> Result<()> {
    info!("zonetrack starting up...");

    let settings = Settings::load(config)?;
    // Bad geometry or priority lists stop us here, before any polling.
    let zones = settings
        .build_zones()
        .context("invalid zone configuration")?;
    let db = Database::new(settings.database_path.clone())?;
    let source = EventApiSource::new(settings.source.clone())
        .context("failed to build detection source client")?;

    info!(
        "polling {} for camera '{}' label '{}'",
        source.events_url(),
        settings.source.camera,
        settings.source.label
    );

    let mut controller = SensingController::new();
    controller.start_sensing(SamplingContext {
        source,
        zones,
        db,
        poll_interval: settings.poll_interval(),
        fetch_timeout: std::time::Duration::from_secs(settings.source.timeout_secs),
    })?;

    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutdown requested"),
        Err(err) => warn!("failed to listen for Ctrl-C, stopping: {err}"),
    }

    let stats = controller.stop_sensing().await?;
    info!(
        "zonetrack stopped: {} samples recorded, {} polls failed",
        stats.recorded, stats.source_failures
    );
    Ok(())
}

async fn run_report(config: &Path, date: Option<&str>, recent: u32, json: bool) -> Result<()> {
    let settings = Settings::load(config)?;
    let db = Database::new(settings.database_path.clone())?;

    let day = match date {
        Some(raw) => parse_day(raw)?,
        None => ReportFocus::today().day(),
    };

    let report = DailyReport::load(&db, day, settings.poll_interval_secs, recent).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", report.render_text());
    }
    Ok(())
}
