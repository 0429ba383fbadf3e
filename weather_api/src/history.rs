//! CSV persistence for fetched weather history

use crate::{WeatherApiError, WeatherRow};
use chrono::{DateTime, Utc};
use std::path::Path;

/// A fetched hourly weather series: an ordered variable list plus one row
/// per hour.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherSeries {
    /// Variable names, in column order
    pub variables: Vec<String>,
    /// Hourly rows, in fetch order
    pub rows: Vec<WeatherRow>,
}

impl WeatherSeries {
    /// Assemble a series; every row must carry one value per variable.
    pub fn new(variables: Vec<String>, rows: Vec<WeatherRow>) -> Self {
        debug_assert!(rows.iter().all(|row| row.values.len() == variables.len()));
        Self { variables, rows }
    }

    /// Number of hourly rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the series holds no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Write the series as CSV: a `time` column of RFC 3339 timestamps
    /// followed by one column per variable. Non-finite values are written as
    /// empty cells so downstream loaders read them back as missing.
    pub fn save_csv<P: AsRef<Path>>(&self, path: P) -> Result<(), WeatherApiError> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut writer = csv::Writer::from_path(path)?;

        let mut header = vec!["time".to_string()];
        header.extend(self.variables.iter().cloned());
        writer.write_record(&header)?;

        for row in &self.rows {
            let mut record = vec![row.timestamp.to_rfc3339()];
            for value in &row.values {
                if value.is_finite() {
                    record.push(value.to_string());
                } else {
                    record.push(String::new());
                }
            }
            writer.write_record(&record)?;
        }

        writer.flush()?;
        Ok(())
    }

    /// Load a series previously written by [`save_csv`].
    ///
    /// [`save_csv`]: WeatherSeries::save_csv
    pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<Self, WeatherApiError> {
        let mut reader = csv::Reader::from_path(path)?;

        let headers = reader.headers()?.clone();
        let mut columns = headers.iter().map(|s| s.to_string());
        match columns.next() {
            Some(first) if first == "time" => {}
            other => {
                return Err(WeatherApiError::Response(format!(
                    "expected leading time column, found {:?}",
                    other
                )))
            }
        }
        let variables: Vec<String> = columns.collect();

        let mut rows = Vec::new();
        for (i, record) in reader.records().enumerate() {
            let record = record?;
            if record.len() != variables.len() + 1 {
                return Err(WeatherApiError::Response(format!(
                    "row {} has {} fields, expected {}",
                    i + 2,
                    record.len(),
                    variables.len() + 1
                )));
            }

            let timestamp: DateTime<Utc> = record[0]
                .parse::<DateTime<Utc>>()
                .map_err(|e| {
                    WeatherApiError::Response(format!("row {}: bad timestamp: {}", i + 2, e))
                })?;

            let mut values = Vec::with_capacity(variables.len());
            for field in record.iter().skip(1) {
                if field.is_empty() {
                    values.push(f64::NAN);
                } else {
                    values.push(field.parse::<f64>().map_err(|e| {
                        WeatherApiError::Response(format!("row {}: bad value: {}", i + 2, e))
                    })?);
                }
            }
            rows.push(WeatherRow { timestamp, values });
        }

        Ok(Self { variables, rows })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::tempdir;

    fn sample_series() -> WeatherSeries {
        let variables = vec!["temperature_2m".to_string(), "rain".to_string()];
        let rows = vec![
            WeatherRow {
                timestamp: Utc.with_ymd_and_hms(2023, 6, 1, 0, 0, 0).unwrap(),
                values: vec![28.4, 0.0],
            },
            WeatherRow {
                timestamp: Utc.with_ymd_and_hms(2023, 6, 1, 1, 0, 0).unwrap(),
                values: vec![27.9, 1.2],
            },
        ];
        WeatherSeries::new(variables, rows)
    }

    #[test]
    fn csv_round_trip_preserves_series() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("weather_history.csv");

        let series = sample_series();
        series.save_csv(&path).unwrap();

        let loaded = WeatherSeries::load_csv(&path).unwrap();
        assert_eq!(loaded, series);
    }

    #[test]
    fn nan_round_trips_as_missing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("weather_history.csv");

        let mut series = sample_series();
        series.rows[0].values[1] = f64::NAN;
        series.save_csv(&path).unwrap();

        let loaded = WeatherSeries::load_csv(&path).unwrap();
        assert!(loaded.rows[0].values[1].is_nan());
        assert_eq!(loaded.rows[1].values[1], 1.2);
    }

    #[test]
    fn rejects_csv_without_time_column() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        std::fs::write(&path, "temperature_2m,rain\n28.4,0.0\n").unwrap();

        assert!(matches!(
            WeatherSeries::load_csv(&path),
            Err(WeatherApiError::Response(_))
        ));
    }
}
