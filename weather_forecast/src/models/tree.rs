//! Regression tree with variance-reduction splits

use crate::dataset::SupervisedDataset;
use crate::error::Result;
use crate::models::{
    check_feature_width, require_samples, require_single_target, Regressor, TrainedRegressor,
};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Growth limits for a regression tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeParams {
    /// Maximum depth of the tree
    pub max_depth: usize,
    /// Minimum samples required to attempt a split
    pub min_samples_split: usize,
    /// Minimum samples each side of a split must keep
    pub min_samples_leaf: usize,
    /// Number of candidate features per split (all when None)
    pub max_features: Option<usize>,
    /// Seed for feature subsampling
    pub seed: u64,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            max_depth: 10,
            min_samples_split: 5,
            min_samples_leaf: 2,
            max_features: None,
            seed: 42,
        }
    }
}

/// Single-target regression tree.
///
/// Multi-target training goes through `MultiOutputRegressor`.
#[derive(Debug, Clone)]
pub struct DecisionTreeRegressor {
    name: String,
    params: TreeParams,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct TreeNode {
    /// Split feature index; None marks a leaf
    feature: Option<usize>,
    threshold: f64,
    /// Mean target of the samples that reached this node
    value: f64,
    left: Option<Box<TreeNode>>,
    right: Option<Box<TreeNode>>,
}

/// Trained regression tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainedDecisionTree {
    name: String,
    root: TreeNode,
    n_features: usize,
}

impl DecisionTreeRegressor {
    /// Create a tree with the given growth limits.
    pub fn new(params: TreeParams) -> Self {
        Self {
            name: format!("Decision Tree (max_depth={})", params.max_depth),
            params,
        }
    }
}

impl Default for DecisionTreeRegressor {
    fn default() -> Self {
        Self::new(TreeParams::default())
    }
}

struct TreeFit<'a> {
    features: &'a [Vec<f64>],
    labels: Vec<f64>,
    params: &'a TreeParams,
    n_features: usize,
}

impl TreeFit<'_> {
    fn mean(&self, indices: &[usize]) -> f64 {
        indices.iter().map(|&i| self.labels[i]).sum::<f64>() / indices.len() as f64
    }

    fn sum_squared_error(&self, indices: &[usize]) -> f64 {
        let mean = self.mean(indices);
        indices
            .iter()
            .map(|&i| (self.labels[i] - mean).powi(2))
            .sum()
    }

    fn build(&self, indices: &[usize], depth: usize, rng: &mut ChaCha8Rng) -> TreeNode {
        let n = indices.len();
        let value = self.mean(indices);

        if depth >= self.params.max_depth
            || n < self.params.min_samples_split
            || n < 2 * self.params.min_samples_leaf
        {
            return TreeNode::leaf(value);
        }

        match self.best_split(indices, rng) {
            Some((feature, threshold, left_idx, right_idx)) => {
                let left = self.build(&left_idx, depth + 1, rng);
                let right = self.build(&right_idx, depth + 1, rng);
                TreeNode {
                    feature: Some(feature),
                    threshold,
                    value,
                    left: Some(Box::new(left)),
                    right: Some(Box::new(right)),
                }
            }
            None => TreeNode::leaf(value),
        }
    }

    /// Find the (feature, threshold) pair minimizing the summed squared
    /// error of the two sides, over a random subset of features.
    fn best_split(
        &self,
        indices: &[usize],
        rng: &mut ChaCha8Rng,
    ) -> Option<(usize, f64, Vec<usize>, Vec<usize>)> {
        let parent_sse = self.sum_squared_error(indices);
        let min_leaf = self.params.min_samples_leaf;

        let mut candidates: Vec<usize> = (0..self.n_features).collect();
        if let Some(max_features) = self.params.max_features {
            if max_features < self.n_features {
                candidates.shuffle(rng);
                candidates.truncate(max_features.max(1));
            }
        }

        let mut best: Option<(usize, f64, f64)> = None;

        for &feature in &candidates {
            let mut ordered: Vec<(f64, f64)> = indices
                .iter()
                .map(|&i| (self.features[i][feature], self.labels[i]))
                .collect();
            ordered.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

            let total_sum: f64 = ordered.iter().map(|(_, y)| y).sum();
            let total_sq: f64 = ordered.iter().map(|(_, y)| y * y).sum();
            let n = ordered.len() as f64;

            let mut left_sum = 0.0;
            let mut left_sq = 0.0;

            for split in 1..ordered.len() {
                let (x_prev, y_prev) = ordered[split - 1];
                left_sum += y_prev;
                left_sq += y_prev * y_prev;

                let x_next = ordered[split].0;
                if x_next <= x_prev {
                    continue;
                }
                if split < min_leaf || ordered.len() - split < min_leaf {
                    continue;
                }

                let left_n = split as f64;
                let right_n = n - left_n;
                let right_sum = total_sum - left_sum;
                let right_sq = total_sq - left_sq;

                let sse = (left_sq - left_sum * left_sum / left_n)
                    + (right_sq - right_sum * right_sum / right_n);

                if best.map_or(true, |(_, _, best_sse)| sse < best_sse) {
                    let threshold = (x_prev + x_next) / 2.0;
                    best = Some((feature, threshold, sse));
                }
            }
        }

        let (feature, threshold, sse) = best?;
        if sse >= parent_sse {
            return None;
        }

        let mut left_idx = Vec::new();
        let mut right_idx = Vec::new();
        for &i in indices {
            if self.features[i][feature] <= threshold {
                left_idx.push(i);
            } else {
                right_idx.push(i);
            }
        }
        if left_idx.is_empty() || right_idx.is_empty() {
            return None;
        }

        Some((feature, threshold, left_idx, right_idx))
    }
}

impl Regressor for DecisionTreeRegressor {
    type Trained = TrainedDecisionTree;

    fn fit(&self, dataset: &SupervisedDataset) -> Result<Self::Trained> {
        require_samples(dataset, "DecisionTreeRegressor")?;
        require_single_target(dataset, "DecisionTreeRegressor")?;

        let fit = TreeFit {
            features: &dataset.features,
            labels: dataset.targets.iter().map(|row| row[0]).collect(),
            params: &self.params,
            n_features: dataset.n_features(),
        };

        let indices: Vec<usize> = (0..dataset.n_samples()).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(self.params.seed);
        let root = fit.build(&indices, 0, &mut rng);

        Ok(TrainedDecisionTree {
            name: self.name.clone(),
            root,
            n_features: dataset.n_features(),
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl TreeNode {
    fn leaf(value: f64) -> Self {
        Self {
            feature: None,
            threshold: 0.0,
            value,
            left: None,
            right: None,
        }
    }

    fn predict_one(&self, row: &[f64]) -> f64 {
        match (self.feature, &self.left, &self.right) {
            (Some(feature), Some(left), Some(right)) => {
                // A NaN feature fails the comparison and falls right
                if row[feature] <= self.threshold {
                    left.predict_one(row)
                } else {
                    right.predict_one(row)
                }
            }
            _ => self.value,
        }
    }

    pub(crate) fn depth(&self) -> usize {
        match (&self.left, &self.right) {
            (Some(left), Some(right)) => 1 + left.depth().max(right.depth()),
            _ => 1,
        }
    }
}

impl TrainedDecisionTree {
    /// Depth of the fitted tree, counting the root as 1.
    pub fn depth(&self) -> usize {
        self.root.depth()
    }

    /// Predict a single row without the row-of-rows ceremony; used by the
    /// forest and boosting aggregators.
    pub(crate) fn predict_value(&self, row: &[f64]) -> f64 {
        self.root.predict_one(row)
    }
}

impl TrainedRegressor for TrainedDecisionTree {
    fn predict(&self, features: &[Vec<f64>]) -> Result<Vec<Vec<f64>>> {
        check_feature_width(features, self.n_features)?;
        Ok(features
            .iter()
            .map(|row| vec![self.root.predict_one(row)])
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
