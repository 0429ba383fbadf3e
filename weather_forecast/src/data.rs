//! Timestamped observation tables for forecasting

use crate::error::{ForecastError, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use polars::prelude::*;
use std::fs::File;
use std::path::Path;

/// A time-indexed table of numeric observation fields.
///
/// One row per observation, one column per sensor/weather field, plus a
/// timestamp column. Rows are expected to be sorted ascending by timestamp
/// with a constant sampling interval; the frame can check and restore
/// sortedness, but irregular spacing is not detected or resampled.
#[derive(Debug, Clone)]
pub struct ObservationFrame {
    /// Data frame containing the observations
    df: DataFrame,
    /// Name of the timestamp column
    time_column: String,
    /// Names of the numeric field columns, in table order
    field_columns: Vec<String>,
}

impl ObservationFrame {
    /// Load observations from a CSV file with schema inference.
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let df = CsvReader::new(file)
            .infer_schema(None)
            .has_header(true)
            .finish()?;

        Self::from_dataframe(df)
    }

    /// Create an observation frame from an existing DataFrame, detecting the
    /// time column and the numeric field columns.
    pub fn from_dataframe(df: DataFrame) -> Result<Self> {
        let time_column = Self::detect_time_column(&df)?;
        let field_columns = Self::detect_field_columns(&df, &time_column)?;

        Ok(Self {
            df,
            time_column,
            field_columns,
        })
    }

    /// Assemble a frame directly from timestamps and named value columns.
    ///
    /// Every column must have one value per timestamp.
    pub fn from_columns(
        timestamps: &[DateTime<Utc>],
        columns: Vec<(String, Vec<f64>)>,
    ) -> Result<Self> {
        if columns.is_empty() {
            return Err(ForecastError::DataError(
                "at least one field column is required".to_string(),
            ));
        }
        for (name, values) in &columns {
            if values.len() != timestamps.len() {
                return Err(ForecastError::DataError(format!(
                    "column {:?} has {} values for {} timestamps",
                    name,
                    values.len(),
                    timestamps.len()
                )));
            }
        }

        let time_series = Series::new(
            "time",
            timestamps
                .iter()
                .map(|t| t.timestamp_millis())
                .collect::<Vec<i64>>(),
        );

        let mut series = vec![time_series];
        let mut field_columns = Vec::with_capacity(columns.len());
        for (name, values) in columns {
            series.push(Series::new(&name, values));
            field_columns.push(name);
        }

        let df = DataFrame::new(series)?;
        Ok(Self {
            df,
            time_column: "time".to_string(),
            field_columns,
        })
    }

    /// Detect the timestamp column by name.
    fn detect_time_column(df: &DataFrame) -> Result<String> {
        let column_names = df.get_column_names();

        for name in &column_names {
            let lower_name = name.to_lowercase();
            if lower_name == "time" || lower_name == "date" || lower_name == "timestamp" {
                return Ok(name.to_string());
            }
        }
        for name in &column_names {
            let lower_name = name.to_lowercase();
            if lower_name.contains("time") || lower_name.contains("date") {
                return Ok(name.to_string());
            }
        }

        Err(ForecastError::DataError(
            "No time column found in data".to_string(),
        ))
    }

    /// All columns other than the time column must be usable as numeric
    /// fields; anything non-numeric is rejected up front rather than
    /// surfacing later as a per-column extraction error.
    fn detect_field_columns(df: &DataFrame, time_column: &str) -> Result<Vec<String>> {
        let mut field_columns = Vec::new();
        for column in df.get_columns() {
            if column.name() == time_column {
                continue;
            }
            if Self::dtype_is_numeric(column.dtype()) {
                field_columns.push(column.name().to_string());
            }
        }

        if field_columns.is_empty() {
            return Err(ForecastError::DataError(
                "No numeric field columns found in data".to_string(),
            ));
        }

        Ok(field_columns)
    }

    fn dtype_is_numeric(dtype: &DataType) -> bool {
        matches!(
            dtype,
            DataType::Float64
                | DataType::Float32
                | DataType::Int64
                | DataType::Int32
                | DataType::Int16
                | DataType::Int8
                | DataType::UInt64
                | DataType::UInt32
                | DataType::UInt16
                | DataType::UInt8
        )
    }

    /// Get the underlying DataFrame
    pub fn dataframe(&self) -> &DataFrame {
        &self.df
    }

    /// Get the time column name
    pub fn time_column(&self) -> &str {
        &self.time_column
    }

    /// Names of the numeric field columns, in table order
    pub fn field_names(&self) -> &[String] {
        &self.field_columns
    }

    /// Whether the frame has a numeric field column with this name
    pub fn has_field(&self, name: &str) -> bool {
        self.field_columns.iter().any(|c| c == name)
    }

    /// Number of observations
    pub fn len(&self) -> usize {
        self.df.height()
    }

    /// Whether the frame holds no observations
    pub fn is_empty(&self) -> bool {
        self.df.height() == 0
    }

    /// Extract a numeric field column as f64 values, in row order.
    ///
    /// Null cells become NaN so row alignment is preserved; dropping
    /// incomplete rows is an explicit downstream step, never an implicit
    /// side effect of extraction.
    pub fn column(&self, name: &str) -> Result<Vec<f64>> {
        let col = self.df.column(name).map_err(|e| {
            ForecastError::DataError(format!("Column '{}' not found: {}", name, e))
        })?;

        match col.dtype() {
            DataType::Float64 => Ok(col
                .f64()
                .unwrap()
                .into_iter()
                .map(|v| v.unwrap_or(f64::NAN))
                .collect()),
            DataType::Float32 => Ok(col
                .f32()
                .unwrap()
                .into_iter()
                .map(|v| v.map(|x| x as f64).unwrap_or(f64::NAN))
                .collect()),
            DataType::Int64 => Ok(col
                .i64()
                .unwrap()
                .into_iter()
                .map(|v| v.map(|x| x as f64).unwrap_or(f64::NAN))
                .collect()),
            DataType::Int32 => Ok(col
                .i32()
                .unwrap()
                .into_iter()
                .map(|v| v.map(|x| x as f64).unwrap_or(f64::NAN))
                .collect()),
            DataType::UInt64 => Ok(col
                .u64()
                .unwrap()
                .into_iter()
                .map(|v| v.map(|x| x as f64).unwrap_or(f64::NAN))
                .collect()),
            DataType::UInt32 => Ok(col
                .u32()
                .unwrap()
                .into_iter()
                .map(|v| v.map(|x| x as f64).unwrap_or(f64::NAN))
                .collect()),
            _ => Err(ForecastError::DataError(format!(
                "Column '{}' cannot be converted to f64",
                name
            ))),
        }
    }

    /// Extract several field columns at once, in the given order.
    pub fn columns(&self, names: &[String]) -> Result<Vec<Vec<f64>>> {
        names.iter().map(|name| self.column(name)).collect()
    }

    /// Parsed timestamps, in row order.
    ///
    /// String columns accept RFC 3339, `YYYY-MM-DDTHH:MM[:SS]`,
    /// `YYYY-MM-DD HH:MM:SS`, and date-only forms; integer columns are read
    /// as epoch milliseconds; temporal dtypes are converted directly. A null
    /// or unparseable cell is an error, since it would silently break
    /// feature/target row alignment.
    pub fn timestamps(&self) -> Result<Vec<DateTime<Utc>>> {
        let col = self.df.column(&self.time_column)?;

        match col.dtype() {
            DataType::Utf8 => col
                .utf8()
                .unwrap()
                .into_iter()
                .enumerate()
                .map(|(i, value)| match value {
                    Some(s) => Self::parse_timestamp(s).ok_or_else(|| {
                        ForecastError::DataError(format!(
                            "row {}: unparseable timestamp {:?}",
                            i, s
                        ))
                    }),
                    None => Err(ForecastError::DataError(format!(
                        "row {}: null timestamp",
                        i
                    ))),
                })
                .collect(),
            DataType::Int64 => col
                .i64()
                .unwrap()
                .into_iter()
                .enumerate()
                .map(|(i, value)| {
                    let millis = value.ok_or_else(|| {
                        ForecastError::DataError(format!("row {}: null timestamp", i))
                    })?;
                    DateTime::<Utc>::from_timestamp_millis(millis).ok_or_else(|| {
                        ForecastError::DataError(format!(
                            "row {}: timestamp {} out of range",
                            i, millis
                        ))
                    })
                })
                .collect(),
            DataType::Datetime(unit, _) => {
                let divisor = match unit {
                    TimeUnit::Nanoseconds => 1_000_000,
                    TimeUnit::Microseconds => 1_000,
                    TimeUnit::Milliseconds => 1,
                };
                col.datetime()
                    .unwrap()
                    .into_iter()
                    .enumerate()
                    .map(|(i, value)| {
                        let raw = value.ok_or_else(|| {
                            ForecastError::DataError(format!("row {}: null timestamp", i))
                        })?;
                        DateTime::<Utc>::from_timestamp_millis(raw / divisor).ok_or_else(|| {
                            ForecastError::DataError(format!(
                                "row {}: timestamp {} out of range",
                                i, raw
                            ))
                        })
                    })
                    .collect()
            }
            DataType::Date => col
                .date()
                .unwrap()
                .into_iter()
                .enumerate()
                .map(|(i, value)| {
                    let days = value.ok_or_else(|| {
                        ForecastError::DataError(format!("row {}: null timestamp", i))
                    })?;
                    DateTime::<Utc>::from_timestamp_millis(days as i64 * 86_400_000).ok_or_else(
                        || {
                            ForecastError::DataError(format!(
                                "row {}: date {} out of range",
                                i, days
                            ))
                        },
                    )
                })
                .collect(),
            other => Err(ForecastError::DataError(format!(
                "Time column '{}' has unsupported dtype {:?}",
                self.time_column, other
            ))),
        }
    }

    fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
        if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
            return Some(parsed.with_timezone(&Utc));
        }
        for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
            if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
                return Some(DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc));
            }
        }
        if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
            let naive = date.and_hms_opt(0, 0, 0)?;
            return Some(DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc));
        }
        None
    }

    /// Whether timestamps are sorted ascending (ties allowed).
    pub fn is_time_sorted(&self) -> Result<bool> {
        let timestamps = self.timestamps()?;
        Ok(timestamps.windows(2).all(|pair| pair[0] <= pair[1]))
    }

    /// Return a copy of this frame sorted ascending by timestamp.
    ///
    /// The sort is stable, so rows sharing a timestamp keep their relative
    /// order.
    pub fn sorted_by_time(&self) -> Result<Self> {
        let timestamps = self.timestamps()?;
        let mut order: Vec<usize> = (0..timestamps.len()).collect();
        order.sort_by_key(|&i| timestamps[i]);

        let sorted_timestamps: Vec<DateTime<Utc>> =
            order.iter().map(|&i| timestamps[i]).collect();

        let mut columns = Vec::with_capacity(self.field_columns.len());
        for name in &self.field_columns {
            let values = self.column(name)?;
            let sorted: Vec<f64> = order.iter().map(|&i| values[i]).collect();
            columns.push((name.clone(), sorted));
        }

        Self::from_columns(&sorted_timestamps, columns)
    }

    /// Rename field columns according to `(from, to)` pairs; absent `from`
    /// names are ignored. Fails if a target name already exists.
    pub fn renamed(mut self, pairs: &[(&str, &str)]) -> Result<Self> {
        for &(from, to) in pairs {
            if !self.has_field(from) {
                continue;
            }
            if self.has_field(to) {
                return Err(ForecastError::DataError(format!(
                    "cannot rename {:?} to {:?}: column already exists",
                    from, to
                )));
            }
            self.df.rename(from, to)?;
            for name in self.field_columns.iter_mut() {
                if name.as_str() == from {
                    *name = to.to_string();
                }
            }
        }
        Ok(self)
    }

    /// Strip the `_x` suffix that a naive table merge leaves on overlapping
    /// columns, so `temperature_x` and friends come back under their
    /// canonical names.
    pub fn strip_merge_suffixes(self) -> Result<Self> {
        let pairs: Vec<(String, String)> = self
            .field_columns
            .iter()
            .filter_map(|name| {
                name.strip_suffix("_x")
                    .map(|base| (name.clone(), base.to_string()))
            })
            .collect();

        let borrowed: Vec<(&str, &str)> = pairs
            .iter()
            .map(|(from, to)| (from.as_str(), to.as_str()))
            .collect();
        self.renamed(&borrowed)
    }

    /// Write the frame as CSV with an RFC 3339 `time` column followed by the
    /// field columns. Non-finite values are written as empty cells.
    pub fn to_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let timestamps = self.timestamps()?;
        let columns = self.columns(&self.field_columns)?;

        let mut writer = csv::Writer::from_path(path)?;
        let mut header = vec!["time".to_string()];
        header.extend(self.field_columns.iter().cloned());
        writer.write_record(&header)?;

        for i in 0..self.len() {
            let mut record = vec![timestamps[i].to_rfc3339()];
            for column in &columns {
                if column[i].is_finite() {
                    record.push(column[i].to_string());
                } else {
                    record.push(String::new());
                }
            }
            writer.write_record(&record)?;
        }

        writer.flush()?;
        Ok(())
    }
}
