//! Joining drone telemetry with hourly weather history

use crate::data::ObservationFrame;
use crate::error::{ForecastError, Result};
use chrono::{DateTime, Timelike, Utc};
use drone_telemetry::TelemetryRecord;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Result of a telemetry/weather join
#[derive(Debug)]
pub struct MergeOutcome {
    /// Merged frame: telemetry columns followed by weather columns, one row
    /// per matched telemetry record, timestamped at the telemetry time
    pub frame: ObservationFrame,
    /// Telemetry records that found a weather row for their hour
    pub matched: usize,
    /// Telemetry records dropped for lack of a matching weather hour
    pub dropped: usize,
}

/// Join telemetry records with hourly weather by flooring each telemetry
/// timestamp to the hour and pairing it with that hour's weather row.
///
/// Column names are kept explicit and distinct: a name shared by both
/// sides is an error rather than a silently suffixed duplicate. When the
/// same hour appears twice in the weather frame the first row wins.
pub fn merge_telemetry_weather(
    telemetry: &[TelemetryRecord],
    weather: &ObservationFrame,
) -> Result<MergeOutcome> {
    if telemetry.is_empty() {
        return Err(ForecastError::DataError(
            "no telemetry records to merge".to_string(),
        ));
    }

    let telemetry_fields = TelemetryRecord::field_names();
    for name in weather.field_names() {
        if telemetry_fields.iter().any(|t| t == name) {
            return Err(ForecastError::DataError(format!(
                "column {:?} exists in both telemetry and weather data; rename one side before merging",
                name
            )));
        }
    }

    let weather_timestamps = weather.timestamps()?;
    let mut by_hour: HashMap<DateTime<Utc>, usize> = HashMap::new();
    for (i, ts) in weather_timestamps.iter().enumerate() {
        by_hour.entry(floor_to_hour(*ts)).or_insert(i);
    }

    let weather_columns = weather.columns(weather.field_names())?;

    let mut timestamps = Vec::new();
    let mut telemetry_values: Vec<Vec<f64>> =
        vec![Vec::new(); telemetry_fields.len()];
    let mut weather_values: Vec<Vec<f64>> = vec![Vec::new(); weather_columns.len()];
    let mut dropped = 0usize;

    for record in telemetry {
        match by_hour.get(&floor_to_hour(record.timestamp)) {
            Some(&row) => {
                timestamps.push(record.timestamp);
                for (j, value) in record.field_values().iter().enumerate() {
                    telemetry_values[j].push(*value);
                }
                for (j, column) in weather_columns.iter().enumerate() {
                    weather_values[j].push(column[row]);
                }
            }
            None => dropped += 1,
        }
    }

    if timestamps.is_empty() {
        return Err(ForecastError::DataError(format!(
            "none of the {} telemetry records matched a weather hour",
            telemetry.len()
        )));
    }
    if dropped > 0 {
        warn!(dropped, "telemetry records had no matching weather hour");
    }
    debug!(matched = timestamps.len(), "merged telemetry with weather");

    let mut columns: Vec<(String, Vec<f64>)> = Vec::new();
    for (j, name) in telemetry_fields.iter().enumerate() {
        columns.push((name.to_string(), std::mem::take(&mut telemetry_values[j])));
    }
    for (j, name) in weather.field_names().iter().enumerate() {
        columns.push((name.clone(), std::mem::take(&mut weather_values[j])));
    }

    let matched = timestamps.len();
    Ok(MergeOutcome {
        frame: ObservationFrame::from_columns(&timestamps, columns)?,
        matched,
        dropped,
    })
}

fn floor_to_hour(ts: DateTime<Utc>) -> DateTime<Utc> {
    ts.with_minute(0)
        .and_then(|t| t.with_second(0))
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(ts)
}
