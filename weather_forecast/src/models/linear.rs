//! Multi-output ridge regression via the normal equations

use crate::dataset::SupervisedDataset;
use crate::error::{ForecastError, Result};
use crate::models::{check_feature_width, require_samples, Regressor, TrainedRegressor};
use serde::{Deserialize, Serialize};

/// Ridge-regularized linear regression.
///
/// Handles any number of targets directly: the normal-equation system is
/// solved once per target column against the same factorized design matrix.
#[derive(Debug, Clone)]
pub struct LinearRegressor {
    name: String,
    ridge: f64,
}

/// Trained linear model: an intercept and weight vector per target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainedLinearRegressor {
    name: String,
    /// Weight matrix, (n_features + 1) x n_targets; row 0 is the intercept
    weights: Vec<Vec<f64>>,
    n_features: usize,
    n_targets: usize,
}

impl LinearRegressor {
    /// Create a regressor with the given ridge penalty (0 disables it).
    pub fn new(ridge: f64) -> Result<Self> {
        if !ridge.is_finite() || ridge < 0.0 {
            return Err(ForecastError::InvalidParameter(format!(
                "ridge penalty must be a non-negative number, got {}",
                ridge
            )));
        }
        Ok(Self {
            name: format!("Linear (ridge={})", ridge),
            ridge,
        })
    }
}

impl Default for LinearRegressor {
    fn default() -> Self {
        // Small enough to leave coefficients untouched, large enough to keep
        // the normal equations solvable on collinear weather columns
        Self::new(1e-6).unwrap()
    }
}

impl Regressor for LinearRegressor {
    type Trained = TrainedLinearRegressor;

    fn fit(&self, dataset: &SupervisedDataset) -> Result<Self::Trained> {
        require_samples(dataset, "LinearRegressor")?;

        let n_samples = dataset.n_samples();
        let n_features = dataset.n_features();
        let n_targets = dataset.n_targets();
        let d = n_features + 1;

        // Gram matrix A = X'X (+ ridge on the non-intercept diagonal) and
        // right-hand sides B = X'Y, with an implicit leading 1 column.
        let mut a = vec![vec![0.0; d]; d];
        let mut b = vec![vec![0.0; n_targets]; d];

        for i in 0..n_samples {
            let row = &dataset.features[i];
            let target = &dataset.targets[i];
            for p in 0..d {
                let xp = if p == 0 { 1.0 } else { row[p - 1] };
                for q in p..d {
                    let xq = if q == 0 { 1.0 } else { row[q - 1] };
                    a[p][q] += xp * xq;
                }
                for (t, &y) in target.iter().enumerate() {
                    b[p][t] += xp * y;
                }
            }
        }
        for p in 0..d {
            for q in 0..p {
                a[p][q] = a[q][p];
            }
        }
        for p in 1..d {
            a[p][p] += self.ridge;
        }

        let weights = solve_columns(a, b)?;

        Ok(TrainedLinearRegressor {
            name: self.name.clone(),
            weights,
            n_features,
            n_targets,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Solve A W = B for W with Gaussian elimination and partial pivoting.
/// A is d x d, B is d x t; both are consumed.
fn solve_columns(mut a: Vec<Vec<f64>>, mut b: Vec<Vec<f64>>) -> Result<Vec<Vec<f64>>> {
    let d = a.len();
    let t = if d > 0 { b[0].len() } else { 0 };

    for col in 0..d {
        let mut pivot = col;
        for row in col + 1..d {
            if a[row][col].abs() > a[pivot][col].abs() {
                pivot = row;
            }
        }
        if a[pivot][col].abs() < 1e-12 {
            return Err(ForecastError::ModelError(
                "normal equations are singular; add ridge regularization or remove constant/duplicate features"
                    .to_string(),
            ));
        }
        a.swap(col, pivot);
        b.swap(col, pivot);

        for row in col + 1..d {
            let factor = a[row][col] / a[col][col];
            if factor == 0.0 {
                continue;
            }
            for k in col..d {
                a[row][k] -= factor * a[col][k];
            }
            for k in 0..t {
                b[row][k] -= factor * b[col][k];
            }
        }
    }

    // Back substitution, one target column at a time
    let mut weights = vec![vec![0.0; t]; d];
    for k in 0..t {
        for row in (0..d).rev() {
            let mut value = b[row][k];
            for col in row + 1..d {
                value -= a[row][col] * weights[col][k];
            }
            weights[row][k] = value / a[row][row];
        }
    }

    Ok(weights)
}

impl TrainedRegressor for TrainedLinearRegressor {
    fn predict(&self, features: &[Vec<f64>]) -> Result<Vec<Vec<f64>>> {
        check_feature_width(features, self.n_features)?;

        let mut predictions = Vec::with_capacity(features.len());
        for row in features {
            let mut out = Vec::with_capacity(self.n_targets);
            for t in 0..self.n_targets {
                let mut value = self.weights[0][t];
                for (j, &x) in row.iter().enumerate() {
                    value += self.weights[j + 1][t] * x;
                }
                out.push(value);
            }
            predictions.push(out);
        }
        Ok(predictions)
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn n_targets(&self) -> usize {
        self.n_targets
    }

    fn name(&self) -> &str {
        &self.name
    }
}
