//! # Weather Forecast
//!
//! A Rust library for turning drone telemetry and hourly weather history
//! into supervised forecast models.
//!
//! ## Features
//!
//! - Timestamped observation tables loaded from CSV ([`ObservationFrame`])
//! - Forecast dataset construction: pairing each observation with the
//!   observation a fixed number of rows ahead ([`ForecastDatasetBuilder`])
//! - Feature standardization ([`scaler::StandardScaler`])
//! - Regression models: ridge linear, decision tree, random forest,
//!   gradient boosting, and a one-model-per-target wrapper
//! - Per-target accuracy metrics (RMSE, MAE, R²)
//! - Self-describing model artifacts that carry their feature schema,
//!   horizon, and scaler ([`artifact::ModelBundle`])
//! - Telemetry/weather merging and threshold weather alerts
//!
//! ## Quick Start
//!
//! ```no_run
//! use weather_forecast::data::ObservationFrame;
//! use weather_forecast::dataset::ForecastDatasetBuilder;
//! use weather_forecast::models::forest::RandomForestRegressor;
//! use weather_forecast::models::multi::MultiOutputRegressor;
//! use weather_forecast::models::Regressor;
//!
//! # fn main() -> weather_forecast::error::Result<()> {
//! // Load merged observations
//! let frame = ObservationFrame::from_csv("data/merged_data.csv")?;
//!
//! // Pair each row with the row 12 hours ahead
//! let builder = ForecastDatasetBuilder::new(
//!     vec!["temperature".into(), "humidity".into(), "wind_speed".into()],
//!     vec!["temperature".into(), "humidity".into(), "wind_speed".into()],
//!     12,
//! )?;
//! let dataset = builder.build(&frame)?;
//!
//! // Train one forest per target
//! let model = MultiOutputRegressor::new(RandomForestRegressor::default());
//! let trained = model.fit(&dataset)?;
//! # Ok(())
//! # }
//! ```
//!
//! The horizon is always a row count; the pipeline assumes hourly rows and
//! does not detect or resample irregular spacing.

pub mod alerts;
pub mod artifact;
pub mod data;
pub mod dataset;
pub mod error;
pub mod merge;
pub mod metrics;
pub mod models;
pub mod scaler;

// Re-export commonly used types
pub use crate::data::ObservationFrame;
pub use crate::dataset::{build_dataset, ForecastDatasetBuilder, SupervisedDataset};
pub use crate::error::ForecastError;
pub use crate::models::{Regressor, TrainedRegressor};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
