//! Feature standardization

use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};

/// Per-column z-score scaler.
///
/// Serializable so a fitted scaler can ride inside a model artifact and be
/// replayed at inference time with the exact training statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    means: Vec<f64>,
    stds: Vec<f64>,
}

const MIN_STD: f64 = 1e-10;

impl StandardScaler {
    /// Fit column means and standard deviations from a row-major matrix.
    ///
    /// Columns with near-zero variance are recorded as pass-through so
    /// transforming never divides by (almost) zero.
    pub fn fit(matrix: &[Vec<f64>]) -> Result<Self> {
        if matrix.is_empty() {
            return Err(ForecastError::DataError(
                "cannot fit scaler on an empty matrix".to_string(),
            ));
        }

        let n_features = matrix[0].len();
        let n_samples = matrix.len() as f64;

        let mut means = vec![0.0; n_features];
        let mut stds = vec![0.0; n_features];

        for j in 0..n_features {
            let mean = matrix.iter().map(|row| row[j]).sum::<f64>() / n_samples;
            let variance = matrix
                .iter()
                .map(|row| (row[j] - mean).powi(2))
                .sum::<f64>()
                / n_samples;
            let std = variance.sqrt();

            if std > MIN_STD {
                means[j] = mean;
                stds[j] = std;
            } else {
                means[j] = 0.0;
                stds[j] = 1.0;
            }
        }

        Ok(Self { means, stds })
    }

    /// Number of columns the scaler was fitted on
    pub fn n_features(&self) -> usize {
        self.means.len()
    }

    /// Standardize a matrix with the fitted statistics.
    pub fn transform(&self, matrix: &[Vec<f64>]) -> Result<Vec<Vec<f64>>> {
        self.apply(matrix, |value, mean, std| (value - mean) / std)
    }

    /// Undo a standardization.
    pub fn inverse_transform(&self, matrix: &[Vec<f64>]) -> Result<Vec<Vec<f64>>> {
        self.apply(matrix, |value, mean, std| value * std + mean)
    }

    fn apply<F>(&self, matrix: &[Vec<f64>], op: F) -> Result<Vec<Vec<f64>>>
    where
        F: Fn(f64, f64, f64) -> f64,
    {
        let mut out = Vec::with_capacity(matrix.len());
        for (i, row) in matrix.iter().enumerate() {
            if row.len() != self.n_features() {
                return Err(ForecastError::DataError(format!(
                    "row {} has {} columns, scaler was fitted on {}",
                    i,
                    row.len(),
                    self.n_features()
                )));
            }
            out.push(
                row.iter()
                    .zip(self.means.iter().zip(self.stds.iter()))
                    .map(|(&value, (&mean, &std))| op(value, mean, std))
                    .collect(),
            );
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn transform_centers_and_scales() {
        let matrix = vec![vec![1.0, 10.0], vec![2.0, 20.0], vec![3.0, 30.0]];
        let scaler = StandardScaler::fit(&matrix).unwrap();
        let scaled = scaler.transform(&matrix).unwrap();

        for j in 0..2 {
            let mean: f64 = scaled.iter().map(|row| row[j]).sum::<f64>() / 3.0;
            let var: f64 = scaled.iter().map(|row| (row[j] - mean).powi(2)).sum::<f64>() / 3.0;
            assert_relative_eq!(mean, 0.0, epsilon = 1e-12);
            assert_relative_eq!(var, 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn inverse_transform_round_trips() {
        let matrix = vec![vec![4.0, -1.5], vec![8.0, 2.5], vec![6.0, 0.5]];
        let scaler = StandardScaler::fit(&matrix).unwrap();
        let restored = scaler
            .inverse_transform(&scaler.transform(&matrix).unwrap())
            .unwrap();

        for (row, original) in restored.iter().zip(matrix.iter()) {
            for (a, b) in row.iter().zip(original.iter()) {
                assert_relative_eq!(a, b, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn constant_column_passes_through() {
        let matrix = vec![vec![5.0, 1.0], vec![5.0, 2.0], vec![5.0, 3.0]];
        let scaler = StandardScaler::fit(&matrix).unwrap();
        let scaled = scaler.transform(&matrix).unwrap();

        assert_eq!(scaled[0][0], 5.0);
        assert_eq!(scaled[2][0], 5.0);
    }

    #[test]
    fn width_mismatch_is_an_error() {
        let scaler = StandardScaler::fit(&[vec![1.0, 2.0]]).unwrap();
        assert!(scaler.transform(&[vec![1.0]]).is_err());
    }

    #[test]
    fn empty_matrix_is_an_error() {
        assert!(StandardScaler::fit(&[]).is_err());
    }
}
