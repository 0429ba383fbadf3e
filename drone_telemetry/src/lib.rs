//! # Drone Telemetry
//!
//! `drone_telemetry` handles the ingestion side of the pipeline: parsing raw
//! telemetry payloads published by the drone and persisting them to an
//! append-only CSV flight log.
//!
//! A telemetry payload is a single line of seven comma-separated numeric
//! fields:
//!
//! ```text
//! latitude,longitude,altitude,speed,heading,temperature,humidity
//! ```
//!
//! The subscription transport (message bus, serial link, stdin) is the
//! caller's concern; this crate only turns payloads into records and records
//! into log rows.
//!
//! ## Usage Example
//!
//! ```no_run
//! use chrono::Utc;
//! use drone_telemetry::{TelemetryLog, TelemetryRecord};
//!
//! # fn main() -> Result<(), drone_telemetry::TelemetryError> {
//! let record = TelemetryRecord::parse_message("10.85,76.27,120.0,14.2,270.0,29.5,78.0", Utc::now())?;
//!
//! let log = TelemetryLog::new("data/drone_logs.csv");
//! log.append(&record)?;
//! # Ok(())
//! # }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

mod log;

pub use crate::log::TelemetryLog;

/// Number of comma-separated fields in a telemetry wire payload.
pub const MESSAGE_FIELDS: usize = 7;

/// Errors that can occur while ingesting telemetry
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Malformed message: {0}")]
    MalformedMessage(String),

    #[error("Log I/O error: {0}")]
    LogIo(#[from] std::io::Error),

    #[error("Log format error: {0}")]
    LogFormat(#[from] csv::Error),
}

/// One timestamped telemetry sample from the drone
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryRecord {
    /// Arrival time of the sample, UTC
    pub timestamp: DateTime<Utc>,
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
    /// Altitude above ground in meters
    pub altitude: f64,
    /// Ground speed in m/s
    pub speed: f64,
    /// Heading in degrees from north
    pub heading: f64,
    /// Onboard temperature in degrees Celsius
    pub temperature: f64,
    /// Onboard relative humidity in percent
    pub humidity: f64,
}

impl TelemetryRecord {
    /// Parse a raw wire payload into a record, stamping it with `timestamp`.
    ///
    /// The payload must contain exactly [`MESSAGE_FIELDS`] comma-separated
    /// numeric fields. A malformed payload never yields a partial record.
    pub fn parse_message(payload: &str, timestamp: DateTime<Utc>) -> Result<Self, TelemetryError> {
        let parts: Vec<&str> = payload.split(',').collect();
        if parts.len() != MESSAGE_FIELDS {
            return Err(TelemetryError::MalformedMessage(format!(
                "expected {} fields, got {}: {:?}",
                MESSAGE_FIELDS,
                parts.len(),
                payload
            )));
        }

        let mut values = [0.0f64; MESSAGE_FIELDS];
        let names = [
            "latitude",
            "longitude",
            "altitude",
            "speed",
            "heading",
            "temperature",
            "humidity",
        ];
        for (i, part) in parts.iter().enumerate() {
            values[i] = part.trim().parse::<f64>().map_err(|e| {
                TelemetryError::MalformedMessage(format!(
                    "invalid {} value {:?}: {}",
                    names[i], part, e
                ))
            })?;
        }

        Ok(Self {
            timestamp,
            latitude: values[0],
            longitude: values[1],
            altitude: values[2],
            speed: values[3],
            heading: values[4],
            temperature: values[5],
            humidity: values[6],
        })
    }

    /// Names of the numeric fields, in log-column order.
    pub fn field_names() -> &'static [&'static str] {
        &[
            "latitude",
            "longitude",
            "altitude",
            "speed",
            "heading",
            "temperature",
            "humidity",
        ]
    }

    /// Numeric field values, in the same order as [`field_names`].
    ///
    /// [`field_names`]: TelemetryRecord::field_names
    pub fn field_values(&self) -> [f64; MESSAGE_FIELDS] {
        [
            self.latitude,
            self.longitude,
            self.altitude,
            self.speed,
            self.heading,
            self.temperature,
            self.humidity,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn parses_well_formed_message() {
        let record =
            TelemetryRecord::parse_message("10.85,76.27,120.0,14.2,270.0,29.5,78.0", ts()).unwrap();

        assert_eq!(record.latitude, 10.85);
        assert_eq!(record.longitude, 76.27);
        assert_eq!(record.altitude, 120.0);
        assert_eq!(record.speed, 14.2);
        assert_eq!(record.heading, 270.0);
        assert_eq!(record.temperature, 29.5);
        assert_eq!(record.humidity, 78.0);
        assert_eq!(record.timestamp, ts());
    }

    #[test]
    fn parses_message_with_spaces() {
        let record =
            TelemetryRecord::parse_message("10.85, 76.27, 120.0, 14.2, 270.0, 29.5, 78.0", ts())
                .unwrap();
        assert_eq!(record.humidity, 78.0);
    }

    #[test]
    fn rejects_wrong_field_count() {
        let result = TelemetryRecord::parse_message("1.0,2.0,3.0", ts());
        match result {
            Err(TelemetryError::MalformedMessage(msg)) => {
                assert!(msg.contains("expected 7 fields"));
            }
            other => panic!("expected MalformedMessage, got {:?}", other),
        }
    }

    #[test]
    fn rejects_non_numeric_field() {
        let result = TelemetryRecord::parse_message("10.85,76.27,high,14.2,270.0,29.5,78.0", ts());
        match result {
            Err(TelemetryError::MalformedMessage(msg)) => {
                assert!(msg.contains("altitude"));
            }
            other => panic!("expected MalformedMessage, got {:?}", other),
        }
    }

    #[test]
    fn field_values_match_field_names_order() {
        let record =
            TelemetryRecord::parse_message("1.0,2.0,3.0,4.0,5.0,6.0,7.0", ts()).unwrap();
        let values = record.field_values();
        assert_eq!(values.len(), TelemetryRecord::field_names().len());
        assert_eq!(values[0], record.latitude);
        assert_eq!(values[6], record.humidity);
    }
}
