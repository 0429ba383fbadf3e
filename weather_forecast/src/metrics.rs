//! Metrics for evaluating forecast accuracy

use crate::error::{ForecastError, Result};

/// Accuracy metrics for one predicted target column
#[derive(Debug, Clone, PartialEq)]
pub struct RegressionMetrics {
    /// Root Mean Squared Error
    pub rmse: f64,
    /// Mean Absolute Error
    pub mae: f64,
    /// Coefficient of determination
    pub r2: f64,
}

impl std::fmt::Display for RegressionMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "RMSE: {:.4}, MAE: {:.4}, R2: {:.4}",
            self.rmse, self.mae, self.r2
        )
    }
}

/// Compare one predicted column against the actual values.
pub fn evaluate(predicted: &[f64], actual: &[f64]) -> Result<RegressionMetrics> {
    if predicted.len() != actual.len() || predicted.is_empty() {
        return Err(ForecastError::DataError(
            "predicted and actual values must have the same non-zero length".to_string(),
        ));
    }

    let n = predicted.len() as f64;
    let errors: Vec<f64> = predicted
        .iter()
        .zip(actual.iter())
        .map(|(&p, &a)| a - p)
        .collect();

    let mae = errors.iter().map(|e| e.abs()).sum::<f64>() / n;
    let mse = errors.iter().map(|e| e.powi(2)).sum::<f64>() / n;
    let rmse = mse.sqrt();

    let actual_mean = actual.iter().sum::<f64>() / n;
    let ss_tot: f64 = actual.iter().map(|&a| (a - actual_mean).powi(2)).sum();
    let ss_res: f64 = errors.iter().map(|e| e.powi(2)).sum();
    let r2 = if ss_tot > 0.0 {
        1.0 - ss_res / ss_tot
    } else {
        0.0
    };

    Ok(RegressionMetrics { rmse, mae, r2 })
}

/// Per-target accuracy report for multi-output predictions.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationReport {
    /// (target name, metrics) in target order
    pub per_target: Vec<(String, RegressionMetrics)>,
}

impl std::fmt::Display for EvaluationReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Evaluation:")?;
        for (target, metrics) in &self.per_target {
            writeln!(f, "  {}: {}", target, metrics)?;
        }
        Ok(())
    }
}

/// Evaluate row-major prediction and actual matrices target by target.
pub fn evaluate_targets(
    predicted: &[Vec<f64>],
    actual: &[Vec<f64>],
    target_names: &[String],
) -> Result<EvaluationReport> {
    if predicted.len() != actual.len() || predicted.is_empty() {
        return Err(ForecastError::DataError(
            "predicted and actual matrices must have the same non-zero length".to_string(),
        ));
    }
    let width = target_names.len();
    if predicted.iter().any(|row| row.len() != width)
        || actual.iter().any(|row| row.len() != width)
    {
        return Err(ForecastError::DataError(format!(
            "prediction rows must have {} target columns",
            width
        )));
    }

    let mut per_target = Vec::with_capacity(width);
    for (j, name) in target_names.iter().enumerate() {
        let predicted_col: Vec<f64> = predicted.iter().map(|row| row[j]).collect();
        let actual_col: Vec<f64> = actual.iter().map(|row| row[j]).collect();
        per_target.push((name.clone(), evaluate(&predicted_col, &actual_col)?));
    }

    Ok(EvaluationReport { per_target })
}
