//! # Weather API
//!
//! Client for the Open-Meteo historical weather archive, plus CSV
//! persistence for the fetched hourly series.
//!
//! The archive endpoint returns hourly variables as parallel arrays keyed by
//! variable name; this crate turns them into row-oriented
//! [`WeatherSeries`] data that the rest of the pipeline consumes, and reads
//! and writes the `weather_history.csv` schema used downstream.
//!
//! ## Usage Example
//!
//! ```no_run
//! use chrono::NaiveDate;
//! use weather_api::{ArchiveClient, ArchiveRequest};
//!
//! # async fn run() -> Result<(), weather_api::WeatherApiError> {
//! let request = ArchiveRequest::new(
//!     10.8505,
//!     76.2711,
//!     NaiveDate::from_ymd_opt(2023, 6, 1).unwrap(),
//!     NaiveDate::from_ymd_opt(2023, 6, 30).unwrap(),
//! );
//!
//! let client = ArchiveClient::new();
//! let series = client.fetch_hourly(&request).await?;
//! series.save_csv("data/weather_history.csv")?;
//! # Ok(())
//! # }
//! ```

use chrono::{DateTime, Utc};
use thiserror::Error;

mod client;
mod history;

pub use crate::client::{parse_archive_response, ArchiveClient, ArchiveRequest, ARCHIVE_URL};
pub use crate::history::WeatherSeries;

/// Hourly variables requested by default, matching the training pipeline's
/// feature schema.
pub const DEFAULT_HOURLY_VARIABLES: &[&str] = &[
    "temperature_2m",
    "relative_humidity_2m",
    "rain",
    "cloudcover",
    "windspeed_10m",
];

/// Errors from fetching or persisting weather history
#[derive(Error, Debug)]
pub enum WeatherApiError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Archive API error: {0}")]
    Api(String),

    #[error("Malformed archive response: {0}")]
    Response(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// One hourly row of weather values, aligned with the owning series'
/// variable list.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherRow {
    /// Hour start, UTC
    pub timestamp: DateTime<Utc>,
    /// One value per variable; missing API values surface as NaN
    pub values: Vec<f64>,
}
