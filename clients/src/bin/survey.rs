//! `triangle-survey` — Surveys the orbit closure of a triangle billiard.
//!
//! Predicts the ambient stratum of the unfolding of the triangle with angles
//! proportional to the given weights, then replays flow decompositions in the
//! directions of saddle connections up to the bound and reports the orbit
//! closure dimension, its rank, and whether every sampled direction was
//! periodic and parabolic.
//!
//! **Usage:**
//! ```
//! triangle-survey <a> <b> <c> [--bound <N>] [--trace <path>] [--trace-dir <dir>] [--json] [-v]
//! ```
//!
//! Exits non-zero on malformed weights, an unreadable trace, or a direction
//! that could not be fully decomposed.

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use flatsurf_survey::{
    run_survey, ReplayBackend, Reporter, SurveyConfig, DEFAULT_BOUND, DEFAULT_TRACE_DIR,
};
use tracing_subscriber::EnvFilter;

/// Survey the orbit closure of a triangle billiard.
#[derive(Parser)]
#[command(
    name = "triangle-survey",
    about = "Bracket the orbit closure of a triangle unfolding"
)]
struct Args {
    /// Angles of the triangle as coprime positive integer weights.
    #[arg(required = true, num_args = 1.., allow_negative_numbers = true)]
    angles: Vec<i64>,

    /// Bound on the length of the sampled saddle connections.
    #[arg(long, default_value_t = i64::from(DEFAULT_BOUND), allow_negative_numbers = true)]
    bound: i64,

    /// Recorded trace to replay (default: <trace-dir>/<a>-<b>-<c>.json).
    #[arg(long)]
    trace: Option<PathBuf>,

    /// Directory holding recorded traces.
    #[arg(long, default_value = DEFAULT_TRACE_DIR)]
    trace_dir: PathBuf,

    /// Print the final report as JSON instead of the summary.
    #[arg(long)]
    json: bool,

    /// Raise log verbosity (-v: info, -vv: debug).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = SurveyConfig::from_args(&args.angles, args.bound, args.trace, &args.trace_dir)
        .context("invalid configuration")?;
    let backend = ReplayBackend::from_path(&config.trace)
        .with_context(|| format!("cannot replay {}", config.trace.display()))?;

    let stdout = io::stdout();
    let mut reporter = Reporter::new(stdout.lock());
    let mut write_error = None;
    let report = run_survey(&backend, &config, |event| {
        if write_error.is_none() {
            write_error = reporter.event(event).err();
        }
    });

    let report = match report {
        Ok(report) => report,
        Err(e) => {
            // Terminate a pending progress line before the diagnostic.
            let mut out = reporter.into_inner();
            writeln!(out)?;
            return Err(e).with_context(|| format!("survey of {} failed", config.weights));
        }
    };
    if let Some(e) = write_error {
        return Err(e).context("cannot write progress");
    }

    if args.json {
        reporter.json(&report)?;
    } else {
        reporter.summary(&report)?;
    }
    Ok(())
}
