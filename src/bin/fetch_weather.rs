//! Fetch hourly weather history from the Open-Meteo archive.
//!
//! Usage: fetch_weather --latitude 10.8505 --longitude 76.2711 --days 30

use anyhow::Result;
use chrono::{Duration, NaiveDate, Utc};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;
use weather_api::{ArchiveClient, ArchiveRequest, DEFAULT_HOURLY_VARIABLES};

#[derive(Parser, Debug)]
#[command(author, version, about = "Fetch hourly weather history from Open-Meteo")]
struct Args {
    /// Latitude in decimal degrees
    #[arg(long, default_value = "10.8505")]
    latitude: f64,

    /// Longitude in decimal degrees
    #[arg(long, default_value = "76.2711")]
    longitude: f64,

    /// Days of history to fetch, ending today (ignored when --start-date is set)
    #[arg(short, long, default_value = "30")]
    days: i64,

    /// First day of the range (YYYY-MM-DD)
    #[arg(long)]
    start_date: Option<NaiveDate>,

    /// Last day of the range (YYYY-MM-DD, defaults to today)
    #[arg(long)]
    end_date: Option<NaiveDate>,

    /// Hourly variables to request
    #[arg(long, value_delimiter = ',')]
    variables: Option<Vec<String>>,

    /// Timezone for the returned timestamps
    #[arg(long, default_value = "UTC")]
    timezone: String,

    /// Output CSV path
    #[arg(short, long, default_value = "data/weather_history.csv")]
    output: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let end = args.end_date.unwrap_or_else(|| Utc::now().date_naive());
    let start = match args.start_date {
        Some(date) => date,
        None => end - Duration::days(args.days),
    };

    let variables = args.variables.unwrap_or_else(|| {
        DEFAULT_HOURLY_VARIABLES
            .iter()
            .map(|s| s.to_string())
            .collect()
    });

    info!(
        latitude = args.latitude,
        longitude = args.longitude,
        %start,
        %end,
        "fetching weather history"
    );

    let request = ArchiveRequest::new(args.latitude, args.longitude, start, end)
        .with_variables(variables)
        .with_timezone(args.timezone.as_str());

    let client = ArchiveClient::new();
    let series = client.fetch_hourly(&request).await?;

    println!("Fetched {} hourly rows", series.len());
    if let Some(first) = series.rows.first() {
        println!("  from {}", first.timestamp);
    }
    if let Some(last) = series.rows.last() {
        println!("  to   {}", last.timestamp);
    }

    series.save_csv(&args.output)?;
    println!("Weather history saved to {}", args.output.display());

    Ok(())
}
