// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Strava club tracker command line
//!
//! `fetch` downloads club details and daily activity snapshots from Strava.
//! `build` aggregates stored snapshots and writes the standings pages.

use anyhow::Context;
use chrono::{Duration, NaiveDate, Utc};
use clap::{ArgAction, Parser, Subcommand};
use std::fs;
use std::path::PathBuf;
use strava_club_tracker::{
    config::Config,
    db::SnapshotStore,
    services::{export, report, PlaceholderRenderer, ReportBuilder, SnapshotFetcher, StravaClient},
    Tracker,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about = "Strava club distance challenge tracker", long_about = None)]
struct Cli {
    /// Human-readable log output instead of JSON
    #[arg(long, global = true, action = ArgAction::SetTrue)]
    plain: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Download club details and one activity snapshot per day
    Fetch {
        /// First day to fetch (defaults to START_DATE)
        #[arg(long)]
        start: Option<NaiveDate>,
        /// Last day to fetch (defaults to END_DATE, never later than yesterday)
        #[arg(long)]
        end: Option<NaiveDate>,
        /// Clubs to fetch (defaults to CLUB_IDS)
        #[arg(long, value_delimiter = ',')]
        club: Vec<u64>,
    },
    /// Aggregate stored snapshots and write the standings pages
    Build {
        /// Output directory (defaults to OUTPUT_DIR)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Also write a CSV export of every activity to this path
        #[arg(long)]
        csv: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.plain);

    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!(data_dir = %config.data_dir.display(), "Starting club tracker");

    match cli.command {
        Command::Fetch { start, end, club } => fetch(&config, start, end, club).await,
        Command::Build { output, csv } => build(&config, output, csv),
    }
}

async fn fetch(
    config: &Config,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    clubs: Vec<u64>,
) -> anyhow::Result<()> {
    let token = config.require_access_token()?;
    let club_ids = if clubs.is_empty() {
        config.club_ids.clone()
    } else {
        clubs
    };
    let start = start
        .or(config.start_date)
        .context("No start date: pass --start or set START_DATE")?;

    // Today's snapshot is incomplete until the day is over.
    let yesterday = Utc::now().with_timezone(&config.utc_offset).date_naive() - Duration::days(1);
    let end = end.or(config.end_date).unwrap_or(yesterday).min(yesterday);

    let client = StravaClient::with_base_url(config.api_base.clone(), token.to_string());
    let mut fetcher = SnapshotFetcher::new(
        client,
        SnapshotStore::new(config.data_dir.clone()),
        config.utc_offset,
        config.request_limit,
    );

    match fetcher.sync(&club_ids, start, end).await {
        Ok(summary) => {
            tracing::info!(
                clubs_written = summary.clubs_written,
                snapshots_written = summary.snapshots_written,
                snapshots_skipped = summary.snapshots_skipped,
                "Fetch complete"
            );
            Ok(())
        }
        Err(e) if e.is_request_limit() => {
            tracing::warn!(
                requests = fetcher.request_count(),
                "Stopping early at the request limit; run again later to continue"
            );
            Ok(())
        }
        Err(e) if e.is_strava_token_error() => {
            tracing::error!(
                requests = fetcher.request_count(),
                "Strava rejected the access token; re-authorize and set STRAVA_ACCESS_TOKEN"
            );
            Err(e.into())
        }
        Err(e) => Err(e.into()),
    }
}

fn build(config: &Config, output: Option<PathBuf>, csv: Option<PathBuf>) -> anyhow::Result<()> {
    let output = output.unwrap_or_else(|| config.output_dir.clone());
    let tracker = Tracker::from_config(config)?;
    let standings = tracker.load_standings()?;

    let renderer = PlaceholderRenderer::new(config.template_dir.clone());
    let builder = ReportBuilder::new(&standings, &tracker.settings, renderer);

    fs::create_dir_all(&output)
        .with_context(|| format!("Failed to create {}", output.display()))?;
    let index = output.join("index.html");
    fs::write(&index, builder.summary_html()?)?;
    tracing::info!(file = %index.display(), "Wrote summary");

    let mut pages = 0;
    for club in standings.clubs() {
        for athlete in &club.athletes {
            let path = report::person_file(&output, club.club.id, &athlete.name)?;
            fs::write(&path, builder.person_html(club.club.id, &athlete.name)?)?;
            pages += 1;
        }
    }
    tracing::info!(pages, "Wrote athlete pages");

    if let Some(path) = csv {
        fs::write(&path, export::to_csv(&standings, tracker.settings.scoring))?;
        tracing::info!(file = %path.display(), "Wrote CSV export");
    }

    Ok(())
}

/// Initialize structured JSON logging, or plain text with `--plain`.
fn init_logging(plain: bool) {
    let mut filter = EnvFilter::from_default_env();
    for directive in ["strava_club_tracker=debug", "info"] {
        if let Ok(directive) = directive.parse() {
            filter = filter.add_directive(directive);
        }
    }

    let registry = tracing_subscriber::registry().with(filter);
    if plain {
        registry.with(tracing_subscriber::fmt::layer()).init();
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(false)
                    .with_current_span(true)
                    .flatten_event(true),
            )
            .init();
    }
}
