//! Open-Meteo archive endpoint client

use crate::history::WeatherSeries;
use crate::{WeatherApiError, WeatherRow, DEFAULT_HOURLY_VARIABLES};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::info;

/// Production archive endpoint.
pub const ARCHIVE_URL: &str = "https://archive-api.open-meteo.com/v1/archive";

/// Parameters for one archive query.
#[derive(Debug, Clone)]
pub struct ArchiveRequest {
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
    /// First day of the range, inclusive
    pub start_date: NaiveDate,
    /// Last day of the range, inclusive
    pub end_date: NaiveDate,
    /// Hourly variables to request, in response column order
    pub hourly: Vec<String>,
    /// IANA timezone name, or "auto"
    pub timezone: String,
}

impl ArchiveRequest {
    /// Build a request for the default hourly variables in UTC.
    pub fn new(latitude: f64, longitude: f64, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            latitude,
            longitude,
            start_date,
            end_date,
            hourly: DEFAULT_HOURLY_VARIABLES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            timezone: "UTC".to_string(),
        }
    }

    /// Replace the hourly variable list.
    pub fn with_variables(mut self, variables: Vec<String>) -> Self {
        self.hourly = variables;
        self
    }

    /// Replace the timezone.
    pub fn with_timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = timezone.into();
        self
    }
}

#[derive(Debug, Deserialize)]
struct ArchiveResponse {
    #[serde(default)]
    error: bool,
    #[serde(default)]
    reason: Option<String>,
    hourly: Option<HourlyBlock>,
}

#[derive(Debug, Deserialize)]
struct HourlyBlock {
    time: Vec<String>,
    #[serde(flatten)]
    variables: HashMap<String, Vec<Option<f64>>>,
}

/// Client for the Open-Meteo archive API.
///
/// Transport-level retries are deliberately not implemented here; callers
/// that need them wrap the fetch at the I/O boundary.
#[derive(Debug, Clone)]
pub struct ArchiveClient {
    client: Client,
    base_url: String,
}

impl Default for ArchiveClient {
    fn default() -> Self {
        Self::new()
    }
}

impl ArchiveClient {
    /// Create a client against the production endpoint.
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            base_url: ARCHIVE_URL.to_string(),
        }
    }

    /// Create a client against a custom base URL (used by tests and mirrors).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Fetch the hourly series described by `request`.
    pub async fn fetch_hourly(
        &self,
        request: &ArchiveRequest,
    ) -> Result<WeatherSeries, WeatherApiError> {
        info!(
            latitude = request.latitude,
            longitude = request.longitude,
            start = %request.start_date,
            end = %request.end_date,
            "fetching hourly weather history"
        );

        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("latitude", request.latitude.to_string()),
                ("longitude", request.longitude.to_string()),
                ("start_date", request.start_date.to_string()),
                ("end_date", request.end_date.to_string()),
                ("hourly", request.hourly.join(",")),
                ("timezone", request.timezone.clone()),
            ])
            .send()
            .await?;

        let body = response.text().await?;
        let series = parse_archive_response(&body, &request.hourly)?;

        info!(rows = series.len(), "fetched weather history");
        Ok(series)
    }
}

/// Parse an archive response body into a [`WeatherSeries`] holding the
/// requested variables in request order.
///
/// Split out from the client so the decoding rules are testable without a
/// live endpoint.
pub fn parse_archive_response(
    body: &str,
    variables: &[String],
) -> Result<WeatherSeries, WeatherApiError> {
    let response: ArchiveResponse = serde_json::from_str(body)
        .map_err(|e| WeatherApiError::Response(format!("invalid JSON: {}", e)))?;

    if response.error {
        return Err(WeatherApiError::Api(
            response.reason.unwrap_or_else(|| "unknown reason".to_string()),
        ));
    }

    let hourly = response
        .hourly
        .ok_or_else(|| WeatherApiError::Response("missing hourly block".to_string()))?;

    let mut columns: Vec<&Vec<Option<f64>>> = Vec::with_capacity(variables.len());
    for name in variables {
        let column = hourly.variables.get(name).ok_or_else(|| {
            WeatherApiError::Response(format!("hourly block missing variable {:?}", name))
        })?;
        if column.len() != hourly.time.len() {
            return Err(WeatherApiError::Response(format!(
                "variable {:?} has {} values for {} timestamps",
                name,
                column.len(),
                hourly.time.len()
            )));
        }
        columns.push(column);
    }

    let mut rows = Vec::with_capacity(hourly.time.len());
    for (i, time) in hourly.time.iter().enumerate() {
        let timestamp = parse_archive_time(time)?;
        let values = columns
            .iter()
            .map(|column| column[i].unwrap_or(f64::NAN))
            .collect();
        rows.push(WeatherRow { timestamp, values });
    }

    Ok(WeatherSeries::new(
        variables.iter().map(|s| s.to_string()).collect(),
        rows,
    ))
}

/// The archive reports local times as `2023-06-01T00:00`; accept that, a
/// seconds-bearing variant, and full RFC 3339.
fn parse_archive_time(value: &str) -> Result<DateTime<Utc>, WeatherApiError> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Ok(parsed.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc));
        }
    }
    Err(WeatherApiError::Response(format!(
        "unparseable timestamp {:?}",
        value
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    fn variables() -> Vec<String> {
        vec!["temperature_2m".to_string(), "rain".to_string()]
    }

    #[test]
    fn parses_hourly_block_in_request_order() {
        let body = r#"{
            "latitude": 10.85,
            "longitude": 76.27,
            "hourly": {
                "time": ["2023-06-01T00:00", "2023-06-01T01:00"],
                "rain": [0.0, 1.2],
                "temperature_2m": [28.4, 27.9]
            }
        }"#;

        let series = parse_archive_response(body, &variables()).unwrap();
        assert_eq!(series.variables, variables());
        assert_eq!(series.len(), 2);
        assert_eq!(series.rows[0].values, vec![28.4, 0.0]);
        assert_eq!(series.rows[1].values, vec![27.9, 1.2]);
        assert_eq!(series.rows[1].timestamp.hour(), 1);
    }

    #[test]
    fn null_values_become_nan() {
        let body = r#"{
            "hourly": {
                "time": ["2023-06-01T00:00"],
                "rain": [null],
                "temperature_2m": [28.4]
            }
        }"#;

        let series = parse_archive_response(body, &variables()).unwrap();
        assert!(series.rows[0].values[1].is_nan());
    }

    #[test]
    fn api_error_surfaces_reason() {
        let body = r#"{"error": true, "reason": "Parameter 'hourly' is invalid"}"#;
        match parse_archive_response(body, &variables()) {
            Err(WeatherApiError::Api(reason)) => assert!(reason.contains("hourly")),
            other => panic!("expected Api error, got {:?}", other),
        }
    }

    #[test]
    fn missing_variable_is_a_response_error() {
        let body = r#"{
            "hourly": {
                "time": ["2023-06-01T00:00"],
                "temperature_2m": [28.4]
            }
        }"#;
        match parse_archive_response(body, &variables()) {
            Err(WeatherApiError::Response(msg)) => assert!(msg.contains("rain")),
            other => panic!("expected Response error, got {:?}", other),
        }
    }

    #[test]
    fn length_mismatch_is_a_response_error() {
        let body = r#"{
            "hourly": {
                "time": ["2023-06-01T00:00", "2023-06-01T01:00"],
                "rain": [0.0],
                "temperature_2m": [28.4, 27.9]
            }
        }"#;
        assert!(matches!(
            parse_archive_response(body, &variables()),
            Err(WeatherApiError::Response(_))
        ));
    }
}
