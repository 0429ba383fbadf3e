//! Persisted model bundles
//!
//! A trained model is only usable if the exact feature-field list (and any
//! scaler) from training travels with it; inference against renamed or
//! reordered columns is the classic way this kind of pipeline silently rots.
//! The bundle therefore carries the full recipe and re-validates it against
//! the inference-time table before any prediction happens.

use crate::data::ObservationFrame;
use crate::error::{ForecastError, Result};
use crate::models::boosting::TrainedGradientBoosting;
use crate::models::forest::TrainedRandomForest;
use crate::models::linear::TrainedLinearRegressor;
use crate::models::multi::TrainedMultiOutput;
use crate::models::TrainedRegressor;
use crate::scaler::StandardScaler;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use tracing::info;

/// The trained-model shapes the pipeline binaries persist, tagged so a
/// saved bundle is self-describing: loading never requires knowing which
/// trainer produced it.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum TrainedModel {
    /// One random forest per target
    Forest(TrainedMultiOutput<TrainedRandomForest>),
    /// A single multi-target ridge regression
    Linear(TrainedLinearRegressor),
    /// One gradient-boosted ensemble per target
    Boosting(TrainedMultiOutput<TrainedGradientBoosting>),
}

impl TrainedRegressor for TrainedModel {
    fn predict(&self, features: &[Vec<f64>]) -> Result<Vec<Vec<f64>>> {
        match self {
            TrainedModel::Forest(model) => model.predict(features),
            TrainedModel::Linear(model) => model.predict(features),
            TrainedModel::Boosting(model) => model.predict(features),
        }
    }

    fn n_features(&self) -> usize {
        match self {
            TrainedModel::Forest(model) => model.n_features(),
            TrainedModel::Linear(model) => model.n_features(),
            TrainedModel::Boosting(model) => model.n_features(),
        }
    }

    fn n_targets(&self) -> usize {
        match self {
            TrainedModel::Forest(model) => model.n_targets(),
            TrainedModel::Linear(model) => model.n_targets(),
            TrainedModel::Boosting(model) => model.n_targets(),
        }
    }

    fn name(&self) -> &str {
        match self {
            TrainedModel::Forest(model) => model.name(),
            TrainedModel::Linear(model) => model.name(),
            TrainedModel::Boosting(model) => model.name(),
        }
    }
}

/// A trained model plus everything needed to apply it consistently:
/// the ordered feature-field list, the target-field list, the horizon, and
/// the optional feature scaler fitted at training time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelBundle<M> {
    /// The trained model
    pub model: M,
    /// Scaler fitted on the training features, if any
    pub scaler: Option<StandardScaler>,
    /// Feature fields, in the exact order the model was trained on
    pub feature_fields: Vec<String>,
    /// Target fields, in model output order
    pub target_fields: Vec<String>,
    /// Row-count forecast horizon the targets were shifted by
    pub horizon: usize,
    /// When the model was trained
    pub trained_at: DateTime<Utc>,
}

impl<M> ModelBundle<M> {
    /// Assemble a bundle stamped with the current time.
    pub fn new(
        model: M,
        scaler: Option<StandardScaler>,
        feature_fields: Vec<String>,
        target_fields: Vec<String>,
        horizon: usize,
    ) -> Self {
        Self {
            model,
            scaler,
            feature_fields,
            target_fields,
            horizon,
            trained_at: Utc::now(),
        }
    }

    /// Verify that every training-time feature field is present in an
    /// inference-time frame, naming all absent columns.
    pub fn check_features(&self, frame: &ObservationFrame) -> Result<()> {
        let missing: Vec<String> = self
            .feature_fields
            .iter()
            .filter(|name| !frame.has_field(name))
            .cloned()
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ForecastError::MissingField { fields: missing })
        }
    }

    /// Extract the feature matrix from `frame` in training order, applying
    /// the bundled scaler when present.
    pub fn feature_matrix(&self, frame: &ObservationFrame) -> Result<Vec<Vec<f64>>> {
        self.check_features(frame)?;

        let columns = frame.columns(&self.feature_fields)?;
        let mut matrix = Vec::with_capacity(frame.len());
        for i in 0..frame.len() {
            matrix.push(columns.iter().map(|col| col[i]).collect::<Vec<f64>>());
        }

        match &self.scaler {
            Some(scaler) => scaler.transform(&matrix),
            None => Ok(matrix),
        }
    }
}

impl<M: Serialize + DeserializeOwned> ModelBundle<M> {
    /// Write the bundle as pretty-printed JSON.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let file = File::create(&path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;

        info!(path = %path.as_ref().display(), "saved model bundle");
        Ok(())
    }

    /// Load a bundle previously written by [`save`].
    ///
    /// [`save`]: ModelBundle::save
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(&path)?;
        let reader = BufReader::new(file);
        let bundle = serde_json::from_reader(reader)?;
        Ok(bundle)
    }
}
