//! Supervised dataset construction: pairing observations with future targets

use crate::data::ObservationFrame;
use crate::error::{ForecastError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Builds supervised (feature, future-target) pairs from a time-ordered
/// observation table.
///
/// The horizon is a row count, not a wall-clock duration: with hourly data a
/// horizon of 12 pairs each row with the row twelve hours later. The builder
/// trusts the caller's row order and never re-sorts (see
/// [`ObservationFrame::sorted_by_time`] when order is in doubt); constant
/// sampling is assumed and not verified.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastDatasetBuilder {
    feature_fields: Vec<String>,
    target_fields: Vec<String>,
    horizon: usize,
}

impl ForecastDatasetBuilder {
    /// Configure a builder.
    ///
    /// Fails with [`ForecastError::InvalidHorizon`] when `horizon` is zero
    /// and with [`ForecastError::InvalidParameter`] when either field list is
    /// empty; both are misconfigurations and are rejected before any data is
    /// touched.
    pub fn new(
        feature_fields: Vec<String>,
        target_fields: Vec<String>,
        horizon: usize,
    ) -> Result<Self> {
        if horizon == 0 {
            return Err(ForecastError::InvalidHorizon);
        }
        if feature_fields.is_empty() {
            return Err(ForecastError::InvalidParameter(
                "feature field list must not be empty".to_string(),
            ));
        }
        if target_fields.is_empty() {
            return Err(ForecastError::InvalidParameter(
                "target field list must not be empty".to_string(),
            ));
        }

        Ok(Self {
            feature_fields,
            target_fields,
            horizon,
        })
    }

    /// Feature field names, in output column order
    pub fn feature_fields(&self) -> &[String] {
        &self.feature_fields
    }

    /// Target field names, in output column order
    pub fn target_fields(&self) -> &[String] {
        &self.target_fields
    }

    /// Configured row-count horizon
    pub fn horizon(&self) -> usize {
        self.horizon
    }

    /// Pair every observation with the observation `horizon` rows later.
    ///
    /// Row `i` of the output takes its feature vector from observation `i`
    /// restricted to the feature fields and its target vector from
    /// observation `i + horizon` restricted to the target fields. The last
    /// `horizon` observations have no future partner and produce no row, so
    /// the output always has exactly `len - horizon` rows, in input order.
    ///
    /// Values are copied exactly: a NaN appears in the output only where the
    /// source column already had one (see
    /// [`SupervisedDataset::drop_incomplete_targets`] for the explicit
    /// cleanup step).
    ///
    /// This is a pure function of its inputs; it performs no I/O and may be
    /// called concurrently from independent callers.
    ///
    /// # Errors
    ///
    /// * [`ForecastError::MissingField`]: any feature or target field is
    ///   absent from the frame's schema; names every missing field.
    /// * [`ForecastError::EmptyResult`]: `horizon` is at least the number of
    ///   observations, so no row has a future partner.
    pub fn build(&self, frame: &ObservationFrame) -> Result<SupervisedDataset> {
        let mut missing: Vec<String> = Vec::new();
        for name in self.feature_fields.iter().chain(self.target_fields.iter()) {
            if !frame.has_field(name) && !missing.contains(name) {
                missing.push(name.clone());
            }
        }
        if !missing.is_empty() {
            return Err(ForecastError::MissingField { fields: missing });
        }

        let rows = frame.len();
        if self.horizon >= rows {
            return Err(ForecastError::EmptyResult {
                rows,
                horizon: self.horizon,
            });
        }

        let feature_columns = frame.columns(&self.feature_fields)?;
        let target_columns = frame.columns(&self.target_fields)?;
        let timestamps = frame.timestamps()?;

        let n_samples = rows - self.horizon;
        let mut features = Vec::with_capacity(n_samples);
        let mut targets = Vec::with_capacity(n_samples);
        let mut feature_timestamps = Vec::with_capacity(n_samples);
        let mut target_timestamps = Vec::with_capacity(n_samples);

        for i in 0..n_samples {
            features.push(feature_columns.iter().map(|col| col[i]).collect());
            targets.push(
                target_columns
                    .iter()
                    .map(|col| col[i + self.horizon])
                    .collect(),
            );
            feature_timestamps.push(timestamps[i]);
            target_timestamps.push(timestamps[i + self.horizon]);
        }

        Ok(SupervisedDataset {
            feature_names: self.feature_fields.clone(),
            target_names: self.target_fields.clone(),
            features,
            targets,
            feature_timestamps,
            target_timestamps,
            horizon: self.horizon,
        })
    }
}

/// Convenience wrapper: configure a builder and run it in one call.
pub fn build_dataset(
    frame: &ObservationFrame,
    feature_fields: &[&str],
    target_fields: &[&str],
    horizon: usize,
) -> Result<SupervisedDataset> {
    ForecastDatasetBuilder::new(
        feature_fields.iter().map(|s| s.to_string()).collect(),
        target_fields.iter().map(|s| s.to_string()).collect(),
        horizon,
    )?
    .build(frame)
}

/// A supervised learning table: one feature vector per row paired with the
/// target vector drawn `horizon` rows ahead of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupervisedDataset {
    /// Feature column names
    pub feature_names: Vec<String>,
    /// Target column names
    pub target_names: Vec<String>,
    /// Feature matrix, row-major (n_samples x n_features)
    pub features: Vec<Vec<f64>>,
    /// Target matrix, row-major (n_samples x n_targets)
    pub targets: Vec<Vec<f64>>,
    /// Timestamp of each feature row
    pub feature_timestamps: Vec<DateTime<Utc>>,
    /// Timestamp of each paired target row, `horizon` rows later
    pub target_timestamps: Vec<DateTime<Utc>>,
    /// Row-count offset between each feature row and its target row
    pub horizon: usize,
}

impl SupervisedDataset {
    /// Number of training rows
    pub fn n_samples(&self) -> usize {
        self.features.len()
    }

    /// Number of feature columns
    pub fn n_features(&self) -> usize {
        self.feature_names.len()
    }

    /// Number of target columns
    pub fn n_targets(&self) -> usize {
        self.target_names.len()
    }

    /// Whether the dataset holds no rows
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Rows selected by index, preserving the given order.
    pub fn subset(&self, indices: &[usize]) -> Self {
        Self {
            feature_names: self.feature_names.clone(),
            target_names: self.target_names.clone(),
            features: indices.iter().map(|&i| self.features[i].clone()).collect(),
            targets: indices.iter().map(|&i| self.targets[i].clone()).collect(),
            feature_timestamps: indices.iter().map(|&i| self.feature_timestamps[i]).collect(),
            target_timestamps: indices.iter().map(|&i| self.target_timestamps[i]).collect(),
            horizon: self.horizon,
        }
    }

    /// Restrict the dataset to a single target column.
    pub fn with_single_target(&self, index: usize) -> Result<Self> {
        if index >= self.n_targets() {
            return Err(ForecastError::InvalidParameter(format!(
                "target index {} out of range for {} targets",
                index,
                self.n_targets()
            )));
        }

        Ok(Self {
            feature_names: self.feature_names.clone(),
            target_names: vec![self.target_names[index].clone()],
            features: self.features.clone(),
            targets: self.targets.iter().map(|row| vec![row[index]]).collect(),
            feature_timestamps: self.feature_timestamps.clone(),
            target_timestamps: self.target_timestamps.clone(),
            horizon: self.horizon,
        })
    }

    /// Split into train and test sets by time order (no shuffling), the only
    /// split that makes sense for forecasting data.
    pub fn train_test_split(&self, test_ratio: f64) -> Result<(Self, Self)> {
        if !(0.0..1.0).contains(&test_ratio) {
            return Err(ForecastError::InvalidParameter(format!(
                "test ratio must be in [0, 1), got {}",
                test_ratio
            )));
        }

        let n = self.n_samples();
        let test_size = (n as f64 * test_ratio).round() as usize;
        let train_size = n - test_size;

        let train_indices: Vec<usize> = (0..train_size).collect();
        let test_indices: Vec<usize> = (train_size..n).collect();

        Ok((self.subset(&train_indices), self.subset(&test_indices)))
    }

    /// Remove rows whose target vector contains a non-finite value, the
    /// explicit counterpart of the usual drop-missing-labels step before
    /// training. Returns the surviving dataset and the number of rows
    /// removed.
    pub fn drop_incomplete_targets(&self) -> (Self, usize) {
        let keep: Vec<usize> = (0..self.n_samples())
            .filter(|&i| self.targets[i].iter().all(|v| v.is_finite()))
            .collect();
        let dropped = self.n_samples() - keep.len();
        (self.subset(&keep), dropped)
    }
}
