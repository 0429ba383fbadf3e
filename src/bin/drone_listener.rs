//! Append drone telemetry payloads to the CSV flight log.
//!
//! Reads one payload per line from stdin (the subscription transport is
//! whatever feeds this process) and appends each well-formed sample to the
//! log. Malformed payloads are reported and skipped, never fatal.
//!
//! Usage: drone_listener --log data/drone_logs.csv < telemetry_stream

use anyhow::Result;
use chrono::Utc;
use clap::Parser;
use drone_telemetry::{TelemetryLog, TelemetryRecord};
use std::io::BufRead;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Log drone telemetry messages to CSV")]
struct Args {
    /// Path of the CSV flight log
    #[arg(short, long, default_value = "data/drone_logs.csv")]
    log: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let log = TelemetryLog::new(&args.log);

    info!(path = %args.log.display(), "listening for telemetry on stdin");

    let stdin = std::io::stdin();
    let mut received = 0u64;
    let mut malformed = 0u64;

    for line in stdin.lock().lines() {
        let line = line?;
        let payload = line.trim();
        if payload.is_empty() {
            continue;
        }

        match TelemetryRecord::parse_message(payload, Utc::now()) {
            Ok(record) => {
                log.append(&record)?;
                received += 1;
            }
            Err(e) => {
                malformed += 1;
                error!(error = %e, "skipping malformed message");
            }
        }
    }

    info!(received, malformed, "input closed, shutting down");
    Ok(())
}
