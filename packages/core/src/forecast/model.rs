//! Regression model behind a small trait seam.
//!
//! [`FeeRegressor`] is the polymorphic interface the forecaster works
//! against, so the random forest can be swapped for another strategy
//! without touching the orchestration. [`RandomForestModel`] is the
//! production implementation (smartcore, 100 trees, fixed seed).
//!
//! Degradation rules:
//! - fewer than 2 training samples, or a fit error → the model is left
//!   untrained (logged, never an error to the caller)
//! - untrained predict → identity on the feature's own price
//! - trained predict → raw output clamped to ±20% of the input price

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};
use smartcore::ensemble::random_forest_regressor::{
    RandomForestRegressor, RandomForestRegressorParameters,
};
use smartcore::linalg::basic::matrix::DenseMatrix;

use crate::forecast::error::ForecastError;
use crate::forecast::types::FeatureVector;

/// Artifact schema version; bumped whenever the feature layout changes.
const ARTIFACT_SCHEMA_VERSION: u32 = 1;

/// Feature column order the model is trained with. Recorded in the
/// artifact and validated on load.
pub const FEATURE_COLUMNS: [&str; 3] = ["price", "hour", "day_of_week"];

/// Maximum relative deviation a trained prediction may have from the
/// input price before being clamped.
const MAX_RELATIVE_CHANGE: f64 = 0.2;

type Forest = RandomForestRegressor<f64, f64, DenseMatrix<f64>, Vec<f64>>;

/// Trainable fee regressor. One training sample is a feature vector plus
/// its observed price.
pub trait FeeRegressor: Send {
    /// Fit the model on the full history window. Insufficient data or a
    /// fit failure leaves the model untrained; neither is an error.
    fn train(&mut self, samples: &[(FeatureVector, f64)]);

    /// Predict a gas price for `feature`. Never fails: untrained models
    /// and internal prediction errors return `feature.price` unchanged.
    fn predict(&self, feature: &FeatureVector) -> f64;

    fn is_trained(&self) -> bool;

    /// Serialize the trained model to a named artifact.
    fn save(&self, path: &Path) -> Result<(), ForecastError>;

    /// Restore a previously trained model from a named artifact. The
    /// artifact's schema version and feature columns must match exactly.
    fn load(&mut self, path: &Path) -> Result<(), ForecastError>;
}

/// Serialized model artifact. The schema fields exist so an artifact
/// trained against a different feature layout is rejected on load instead
/// of silently trusted.
#[derive(Deserialize)]
struct ModelArtifact {
    schema_version: u32,
    feature_columns: Vec<String>,
    model: Forest,
}

/// Borrowing counterpart of [`ModelArtifact`] used when writing.
#[derive(Serialize)]
struct ModelArtifactRef<'a> {
    schema_version: u32,
    feature_columns: Vec<String>,
    model: &'a Forest,
}

/// Random forest regressor over `(price, hour, day_of_week)` features.
pub struct RandomForestModel {
    model: Option<Forest>,
    n_trees: u16,
    seed: u64,
}

impl RandomForestModel {
    pub fn new(n_trees: u16, seed: u64) -> Self {
        Self {
            model: None,
            n_trees,
            seed,
        }
    }

    fn fit_params(&self) -> RandomForestRegressorParameters {
        RandomForestRegressorParameters::default()
            .with_n_trees(self.n_trees.into())
            .with_seed(self.seed)
    }
}

impl FeeRegressor for RandomForestModel {
    fn train(&mut self, samples: &[(FeatureVector, f64)]) {
        if samples.len() < 2 {
            tracing::warn!(
                "Not enough data to train the model ({} samples)",
                samples.len()
            );
            self.model = None;
            return;
        }

        let rows: Vec<Vec<f64>> = samples.iter().map(|(fv, _)| fv.to_row()).collect();
        let targets: Vec<f64> = samples.iter().map(|(_, price)| *price).collect();

        let x = match DenseMatrix::from_2d_vec(&rows) {
            Ok(matrix) => matrix,
            Err(err) => {
                tracing::error!("Error building training matrix: {}", err);
                self.model = None;
                return;
            }
        };

        match RandomForestRegressor::fit(&x, &targets, self.fit_params()) {
            Ok(model) => {
                tracing::info!(
                    "Model trained on {} samples x {} features",
                    samples.len(),
                    FEATURE_COLUMNS.len()
                );
                self.model = Some(model);
            }
            Err(err) => {
                tracing::error!("Error training model: {}", err);
                self.model = None;
            }
        }
    }

    fn predict(&self, feature: &FeatureVector) -> f64 {
        let Some(model) = self.model.as_ref() else {
            return feature.price;
        };

        let x = match DenseMatrix::from_2d_vec(&vec![feature.to_row()]) {
            Ok(matrix) => matrix,
            Err(err) => {
                tracing::error!("Prediction error: {}", err);
                return feature.price;
            }
        };

        let raw = match model.predict(&x) {
            Ok(predictions) => match predictions.first() {
                Some(value) => *value,
                None => {
                    tracing::error!("Prediction error: model returned no output");
                    return feature.price;
                }
            },
            Err(err) => {
                tracing::error!("Prediction error: {}", err);
                return feature.price;
            }
        };

        let max_change = feature.price * MAX_RELATIVE_CHANGE;
        raw.clamp(feature.price - max_change, feature.price + max_change)
    }

    fn is_trained(&self) -> bool {
        self.model.is_some()
    }

    fn save(&self, path: &Path) -> Result<(), ForecastError> {
        let model = self
            .model
            .as_ref()
            .ok_or_else(|| ForecastError::artifact("Cannot persist an untrained model"))?;

        let artifact = ModelArtifactRef {
            schema_version: ARTIFACT_SCHEMA_VERSION,
            feature_columns: FEATURE_COLUMNS.iter().map(|c| c.to_string()).collect(),
            model,
        };

        let file = File::create(path)?;
        serde_json::to_writer(file, &artifact)?;
        tracing::info!("Model artifact saved to {}", path.display());
        Ok(())
    }

    fn load(&mut self, path: &Path) -> Result<(), ForecastError> {
        let file = File::open(path)?;
        let artifact: ModelArtifact = serde_json::from_reader(BufReader::new(file))?;

        if artifact.schema_version != ARTIFACT_SCHEMA_VERSION {
            return Err(ForecastError::artifact(format!(
                "Artifact schema version {} does not match expected {}",
                artifact.schema_version, ARTIFACT_SCHEMA_VERSION
            )));
        }
        if artifact.feature_columns != FEATURE_COLUMNS {
            return Err(ForecastError::artifact(format!(
                "Artifact feature columns {:?} do not match expected {:?}",
                artifact.feature_columns, FEATURE_COLUMNS
            )));
        }

        self.model = Some(artifact.model);
        tracing::info!("Model artifact loaded from {}", path.display());
        Ok(())
    }
}
