//! Gradient boosting with shallow regression trees

use crate::dataset::SupervisedDataset;
use crate::error::{ForecastError, Result};
use crate::models::tree::{DecisionTreeRegressor, TrainedDecisionTree, TreeParams};
use crate::models::{
    check_feature_width, require_samples, require_single_target, Regressor, TrainedRegressor,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Gradient boosting configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoostingParams {
    /// Number of boosting stages
    pub n_estimators: usize,
    /// Shrinkage applied to each stage's contribution
    pub learning_rate: f64,
    /// Depth of each stage's tree; boosting wants them shallow
    pub max_depth: usize,
    /// Minimum samples to attempt a split
    pub min_samples_split: usize,
    /// Minimum samples per leaf
    pub min_samples_leaf: usize,
    /// Seed passed to the stage trees
    pub seed: u64,
}

impl Default for BoostingParams {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            learning_rate: 0.1,
            max_depth: 3,
            min_samples_split: 5,
            min_samples_leaf: 2,
            seed: 42,
        }
    }
}

/// Least-squares gradient boosting: each stage fits a shallow tree to the
/// current residuals and contributes `learning_rate` of its prediction.
///
/// Single-target; multi-target training goes through
/// `MultiOutputRegressor`.
#[derive(Debug, Clone)]
pub struct GradientBoostingRegressor {
    name: String,
    params: BoostingParams,
}

/// Trained boosting ensemble
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainedGradientBoosting {
    name: String,
    /// Constant initial prediction (the training-target mean)
    init: f64,
    learning_rate: f64,
    stages: Vec<TrainedDecisionTree>,
    n_features: usize,
}

impl GradientBoostingRegressor {
    /// Create a boosting regressor with the given configuration.
    pub fn new(params: BoostingParams) -> Result<Self> {
        if !(params.learning_rate > 0.0 && params.learning_rate <= 1.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "learning rate must be in (0, 1], got {}",
                params.learning_rate
            )));
        }
        if params.n_estimators == 0 {
            return Err(ForecastError::InvalidParameter(
                "n_estimators must be positive".to_string(),
            ));
        }
        Ok(Self {
            name: format!(
                "Gradient Boosting (n_estimators={}, learning_rate={})",
                params.n_estimators, params.learning_rate
            ),
            params,
        })
    }
}

impl Default for GradientBoostingRegressor {
    fn default() -> Self {
        Self::new(BoostingParams::default()).unwrap()
    }
}

impl Regressor for GradientBoostingRegressor {
    type Trained = TrainedGradientBoosting;

    fn fit(&self, dataset: &SupervisedDataset) -> Result<Self::Trained> {
        require_samples(dataset, "GradientBoostingRegressor")?;
        require_single_target(dataset, "GradientBoostingRegressor")?;

        let labels: Vec<f64> = dataset.targets.iter().map(|row| row[0]).collect();
        let init = labels.iter().sum::<f64>() / labels.len() as f64;

        let mut predictions = vec![init; labels.len()];
        let mut stages = Vec::with_capacity(self.params.n_estimators);
        let mut residual_dataset = dataset.clone();

        for stage in 0..self.params.n_estimators {
            for (i, row) in residual_dataset.targets.iter_mut().enumerate() {
                row[0] = labels[i] - predictions[i];
            }

            let tree = DecisionTreeRegressor::new(TreeParams {
                max_depth: self.params.max_depth,
                min_samples_split: self.params.min_samples_split,
                min_samples_leaf: self.params.min_samples_leaf,
                max_features: None,
                seed: self.params.seed.wrapping_add(stage as u64),
            });
            let fitted = tree.fit(&residual_dataset)?;

            for (i, row) in dataset.features.iter().enumerate() {
                predictions[i] += self.params.learning_rate * fitted.predict_value(row);
            }
            stages.push(fitted);
        }

        debug!(stages = stages.len(), "fitted gradient boosting ensemble");

        Ok(TrainedGradientBoosting {
            name: self.name.clone(),
            init,
            learning_rate: self.params.learning_rate,
            stages,
            n_features: dataset.n_features(),
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl TrainedGradientBoosting {
    /// Number of fitted boosting stages
    pub fn n_stages(&self) -> usize {
        self.stages.len()
    }
}

impl TrainedRegressor for TrainedGradientBoosting {
    fn predict(&self, features: &[Vec<f64>]) -> Result<Vec<Vec<f64>>> {
        check_feature_width(features, self.n_features)?;

        Ok(features
            .iter()
            .map(|row| {
                let boosted: f64 = self
                    .stages
                    .iter()
                    .map(|stage| stage.predict_value(row))
                    .sum();
                vec![self.init + self.learning_rate * boosted]
            })
            .collect())
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn n_targets(&self) -> usize {
        1
    }

    fn name(&self) -> &str {
        &self.name
    }
}
