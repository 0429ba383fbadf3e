//! Error types for the weather_forecast crate

use polars::prelude::PolarsError;
use thiserror::Error;

/// Custom error types for the weather_forecast crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// Named fields are absent from the input schema. Carries every missing
    /// field so the caller can report them all at once.
    #[error("missing fields in input schema: {}", .fields.join(", "))]
    MissingField {
        /// The absent field names, in request order
        fields: Vec<String>,
    },

    /// The forecast horizon is not a positive row count
    #[error("invalid horizon: must be a positive number of rows")]
    InvalidHorizon,

    /// Too few observations to pair any row with a future row. Distinct from
    /// [`ForecastError::InvalidHorizon`] so callers can tell "bad config"
    /// from "not enough data yet".
    #[error("{rows} observation(s) cannot support a horizon of {horizon} rows")]
    EmptyResult {
        /// Number of observations available
        rows: usize,
        /// Requested horizon
        horizon: usize,
    },

    /// Error related to data validation or processing
    #[error("Data error: {0}")]
    DataError(String),

    /// Error related to model fitting or prediction
    #[error("Model error: {0}")]
    ModelError(String),

    /// Error from invalid parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Error from IO operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error from CSV operations
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    /// Error from serializing or deserializing artifacts
    #[error("Serialization error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Error from Polars operations
    #[error("Polars error: {0}")]
    PolarsError(String),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl From<PolarsError> for ForecastError {
    fn from(err: PolarsError) -> Self {
        ForecastError::PolarsError(err.to_string())
    }
}
