//! Append-only CSV flight log

use crate::{TelemetryError, TelemetryRecord};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Append-only CSV log of telemetry records.
///
/// The log file is created with a header row on first append; subsequent
/// appends add one row without rewriting the file, so concurrent readers see
/// a consistent prefix.
#[derive(Debug, Clone)]
pub struct TelemetryLog {
    path: PathBuf,
}

impl TelemetryLog {
    /// Create a handle for the log at `path`. The file itself is created
    /// lazily on the first append.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Path of the underlying log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record, creating the file with a header row if absent.
    pub fn append(&self, record: &TelemetryRecord) -> Result<(), TelemetryError> {
        let exists = self.path.exists();
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(!exists)
            .from_writer(file);
        writer.serialize(record)?;
        writer.flush()?;

        debug!(path = %self.path.display(), "appended telemetry record");
        Ok(())
    }

    /// Load every record currently in the log, in file order.
    ///
    /// A malformed row is an error, not a silent skip; the log is expected to
    /// contain only rows this crate wrote.
    pub fn load(&self) -> Result<Vec<TelemetryRecord>, TelemetryError> {
        let mut reader = csv::Reader::from_path(&self.path)?;
        let mut records = Vec::new();
        for row in reader.deserialize() {
            records.push(row?);
        }
        Ok(records)
    }

    /// Load the most recent record, if the log has any.
    pub fn latest(&self) -> Result<Option<TelemetryRecord>, TelemetryError> {
        Ok(self.load()?.into_iter().last())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use tempfile::tempdir;

    fn sample(hour: u32) -> TelemetryRecord {
        TelemetryRecord {
            timestamp: Utc.with_ymd_and_hms(2025, 6, 1, hour, 0, 0).unwrap(),
            latitude: 10.85,
            longitude: 76.27,
            altitude: 120.0,
            speed: 14.2,
            heading: 270.0,
            temperature: 29.5,
            humidity: 78.0,
        }
    }

    #[test]
    fn append_and_load_round_trip() {
        let dir = tempdir().unwrap();
        let log = TelemetryLog::new(dir.path().join("drone_logs.csv"));

        log.append(&sample(10)).unwrap();
        log.append(&sample(11)).unwrap();

        let records = log.load().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0], sample(10));
        assert_eq!(records[1], sample(11));
    }

    #[test]
    fn header_is_written_exactly_once() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("drone_logs.csv");
        let log = TelemetryLog::new(&path);

        log.append(&sample(10)).unwrap();
        log.append(&sample(11)).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let header_lines = contents
            .lines()
            .filter(|line| line.starts_with("timestamp"))
            .count();
        assert_eq!(header_lines, 1);
        assert_eq!(contents.lines().count(), 3);
    }

    #[test]
    fn latest_returns_last_record() {
        let dir = tempdir().unwrap();
        let log = TelemetryLog::new(dir.path().join("drone_logs.csv"));

        log.append(&sample(10)).unwrap();
        log.append(&sample(12)).unwrap();

        let latest = log.latest().unwrap().unwrap();
        assert_eq!(latest.timestamp, sample(12).timestamp);
    }

    #[test]
    fn creates_missing_parent_directories() {
        let dir = tempdir().unwrap();
        let log = TelemetryLog::new(dir.path().join("nested/data/drone_logs.csv"));
        log.append(&sample(10)).unwrap();
        assert_eq!(log.load().unwrap().len(), 1);
    }
}
