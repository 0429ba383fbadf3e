//! Regression models for forecast training
//!
//! A model is split into an untrained configuration ([`Regressor`]) and the
//! trained artifact it produces ([`TrainedRegressor`]). Trained artifacts
//! are plain serializable values passed around explicitly by callers; there
//! is no process-global model state.

use crate::dataset::SupervisedDataset;
use crate::error::{ForecastError, Result};
use std::fmt::Debug;

/// A regressor configuration that can be fitted to a supervised dataset
pub trait Regressor: Debug + Clone {
    /// The type of trained model produced
    type Trained: TrainedRegressor;

    /// Fit the model to the dataset
    fn fit(&self, dataset: &SupervisedDataset) -> Result<Self::Trained>;

    /// Get the name of the model
    fn name(&self) -> &str;
}

/// A fitted model that maps feature vectors to target vectors
pub trait TrainedRegressor: Debug {
    /// Predict one target vector per input feature row
    fn predict(&self, features: &[Vec<f64>]) -> Result<Vec<Vec<f64>>>;

    /// Number of feature columns the model expects
    fn n_features(&self) -> usize;

    /// Number of target columns the model produces
    fn n_targets(&self) -> usize;

    /// Name of the model
    fn name(&self) -> &str;
}

/// Shared input validation for trained models: every row must have the
/// fitted feature width.
pub(crate) fn check_feature_width(features: &[Vec<f64>], expected: usize) -> Result<()> {
    for (i, row) in features.iter().enumerate() {
        if row.len() != expected {
            return Err(ForecastError::ModelError(format!(
                "feature row {} has {} columns, model expects {}",
                i,
                row.len(),
                expected
            )));
        }
    }
    Ok(())
}

/// Guard for single-target models: trees and forests predict one column and
/// rely on [`MultiOutputRegressor`] for multi-target training.
///
/// [`MultiOutputRegressor`]: crate::models::multi::MultiOutputRegressor
pub(crate) fn require_single_target(dataset: &SupervisedDataset, model: &str) -> Result<()> {
    if dataset.n_targets() != 1 {
        return Err(ForecastError::ModelError(format!(
            "{} fits a single target, got {}; wrap it in MultiOutputRegressor",
            model,
            dataset.n_targets()
        )));
    }
    Ok(())
}

/// Guard against fitting on an empty dataset.
pub(crate) fn require_samples(dataset: &SupervisedDataset, model: &str) -> Result<()> {
    if dataset.is_empty() {
        return Err(ForecastError::ModelError(format!(
            "{} cannot be fitted on an empty dataset",
            model
        )));
    }
    Ok(())
}

pub mod boosting;
pub mod forest;
pub mod linear;
pub mod multi;
pub mod tree;
