//! Random forest of regression trees

use crate::dataset::SupervisedDataset;
use crate::error::Result;
use crate::models::tree::{DecisionTreeRegressor, TrainedDecisionTree, TreeParams};
use crate::models::{
    check_feature_width, require_samples, require_single_target, Regressor, TrainedRegressor,
};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Random forest configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestParams {
    /// Number of trees
    pub n_trees: usize,
    /// Maximum depth of each tree
    pub max_depth: usize,
    /// Minimum samples to attempt a split
    pub min_samples_split: usize,
    /// Minimum samples per leaf
    pub min_samples_leaf: usize,
    /// Candidate features per split (n_features / 3 when None)
    pub max_features: Option<usize>,
    /// Draw a bootstrap sample per tree
    pub bootstrap: bool,
    /// Base seed; tree i uses seed + i
    pub seed: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: 10,
            min_samples_split: 5,
            min_samples_leaf: 2,
            max_features: None,
            bootstrap: true,
            seed: 42,
        }
    }
}

/// Bootstrap-aggregated regression trees, fitted in parallel.
///
/// Single-target; multi-target training goes through
/// `MultiOutputRegressor`.
#[derive(Debug, Clone)]
pub struct RandomForestRegressor {
    name: String,
    params: ForestParams,
}

/// Trained random forest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainedRandomForest {
    name: String,
    trees: Vec<TrainedDecisionTree>,
    n_features: usize,
}

impl RandomForestRegressor {
    /// Create a forest with the given configuration.
    pub fn new(params: ForestParams) -> Self {
        Self {
            name: format!("Random Forest (n_trees={})", params.n_trees),
            params,
        }
    }
}

impl Default for RandomForestRegressor {
    fn default() -> Self {
        Self::new(ForestParams::default())
    }
}

fn bootstrap_indices(n: usize, seed: u64) -> Vec<usize> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..n).map(|_| rng.gen_range(0..n)).collect()
}

impl Regressor for RandomForestRegressor {
    type Trained = TrainedRandomForest;

    fn fit(&self, dataset: &SupervisedDataset) -> Result<Self::Trained> {
        require_samples(dataset, "RandomForestRegressor")?;
        require_single_target(dataset, "RandomForestRegressor")?;

        let n_features = dataset.n_features();
        let max_features = self
            .params
            .max_features
            .unwrap_or_else(|| (n_features / 3).max(1));

        debug!(
            n_trees = self.params.n_trees,
            max_features, "fitting random forest"
        );

        let trees: Result<Vec<TrainedDecisionTree>> = (0..self.params.n_trees)
            .into_par_iter()
            .map(|i| {
                let tree_params = TreeParams {
                    max_depth: self.params.max_depth,
                    min_samples_split: self.params.min_samples_split,
                    min_samples_leaf: self.params.min_samples_leaf,
                    max_features: Some(max_features),
                    seed: self.params.seed.wrapping_add(i as u64),
                };
                let tree = DecisionTreeRegressor::new(tree_params);

                if self.params.bootstrap {
                    let indices = bootstrap_indices(
                        dataset.n_samples(),
                        self.params.seed.wrapping_add(i as u64),
                    );
                    tree.fit(&dataset.subset(&indices))
                } else {
                    tree.fit(dataset)
                }
            })
            .collect();

        Ok(TrainedRandomForest {
            name: self.name.clone(),
            trees: trees?,
            n_features,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl TrainedRandomForest {
    /// Number of fitted trees
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

impl TrainedRegressor for TrainedRandomForest {
    fn predict(&self, features: &[Vec<f64>]) -> Result<Vec<Vec<f64>>> {
        check_feature_width(features, self.n_features)?;

        Ok(features
            .iter()
            .map(|row| {
                let sum: f64 = self.trees.iter().map(|tree| tree.predict_value(row)).sum();
                vec![sum / self.trees.len() as f64]
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
