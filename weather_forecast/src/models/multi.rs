//! One-regressor-per-target wrapper for single-target models

use crate::dataset::SupervisedDataset;
use crate::error::{ForecastError, Result};
use crate::models::{check_feature_width, Regressor, TrainedRegressor};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Fits one copy of the inner regressor per target column and stitches the
/// per-target predictions back into target vectors.
#[derive(Debug, Clone)]
pub struct MultiOutputRegressor<R: Regressor> {
    name: String,
    inner: R,
}

/// Trained multi-output wrapper
#[derive(Debug, Serialize, Deserialize)]
pub struct TrainedMultiOutput<T> {
    name: String,
    models: Vec<T>,
    target_names: Vec<String>,
    n_features: usize,
}

impl<R: Regressor> MultiOutputRegressor<R> {
    /// Wrap a single-target regressor.
    pub fn new(inner: R) -> Self {
        Self {
            name: format!("MultiOutput({})", inner.name()),
            inner,
        }
    }
}

impl<R: Regressor> Regressor for MultiOutputRegressor<R> {
    type Trained = TrainedMultiOutput<R::Trained>;

    fn fit(&self, dataset: &SupervisedDataset) -> Result<Self::Trained> {
        if dataset.n_targets() == 0 {
            return Err(ForecastError::ModelError(
                "dataset has no target columns".to_string(),
            ));
        }

        let mut models = Vec::with_capacity(dataset.n_targets());
        for index in 0..dataset.n_targets() {
            let single = dataset.with_single_target(index)?;
            debug!(target = %single.target_names[0], "fitting per-target model");
            models.push(self.inner.fit(&single)?);
        }

        Ok(TrainedMultiOutput {
            name: self.name.clone(),
            models,
            target_names: dataset.target_names.clone(),
            n_features: dataset.n_features(),
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl<T> TrainedMultiOutput<T> {
    /// Target names, in output column order
    pub fn target_names(&self) -> &[String] {
        &self.target_names
    }
}

impl<T: TrainedRegressor> TrainedRegressor for TrainedMultiOutput<T> {
    fn predict(&self, features: &[Vec<f64>]) -> Result<Vec<Vec<f64>>> {
        check_feature_width(features, self.n_features)?;

        let mut columns = Vec::with_capacity(self.models.len());
        for model in &self.models {
            let predicted = model.predict(features)?;
            columns.push(predicted);
        }

        let mut rows = Vec::with_capacity(features.len());
        for i in 0..features.len() {
            rows.push(columns.iter().map(|col| col[i][0]).collect());
        }
        Ok(rows)
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn n_targets(&self) -> usize {
        self.models.len()
    }

    fn name(&self) -> &str {
        &self.name
    }
}
