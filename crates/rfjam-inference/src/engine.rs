// SPDX-License-Identifier: Apache-2.0

use crate::artifacts::{load_json_artifact, ArtifactError};
use crate::forest::RandomForest;
use crate::scaler::StandardScaler;
use rfjam_model::{FeatureVector, FEATURE_COLUMNS};
use std::fmt::{Display, Formatter};
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum PredictionError {
    NonFiniteInput { feature: &'static str },
    Model(String),
}

impl Display for PredictionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NonFiniteInput { feature } => {
                write!(f, "scaled value for `{feature}` is not finite")
            }
            Self::Model(message) => write!(f, "model evaluation failed: {message}"),
        }
    }
}

impl std::error::Error for PredictionError {}

/// Seam between request handling and the fitted estimator.
pub trait Classifier: Send + Sync + 'static {
    fn predict(&self, features: &FeatureVector) -> Result<String, PredictionError>;

    fn describe(&self) -> String {
        "classifier".to_string()
    }
}

#[derive(Debug, Clone)]
pub struct InferenceEngine {
    scaler: StandardScaler,
    forest: RandomForest,
}

impl InferenceEngine {
    pub fn from_parts(scaler: StandardScaler, forest: RandomForest) -> Result<Self, String> {
        scaler.validate()?;
        forest.validate()?;
        Ok(Self { scaler, forest })
    }

    /// Loads and validates both artifacts. Either one missing or malformed is fatal.
    pub fn load(model_path: &Path, scaler_path: &Path) -> Result<Self, ArtifactError> {
        let forest: RandomForest = load_json_artifact(model_path)?;
        forest.validate().map_err(|reason| ArtifactError::Invalid {
            path: model_path.to_path_buf(),
            reason,
        })?;
        let scaler: StandardScaler = load_json_artifact(scaler_path)?;
        scaler.validate().map_err(|reason| ArtifactError::Invalid {
            path: scaler_path.to_path_buf(),
            reason,
        })?;
        info!(
            model = %model_path.display(),
            scaler = %scaler_path.display(),
            trees = forest.trees.len(),
            classes = forest.classes.len(),
            "inference artifacts loaded"
        );
        Ok(Self { scaler, forest })
    }

    #[must_use]
    pub fn forest(&self) -> &RandomForest {
        &self.forest
    }
}

impl Classifier for InferenceEngine {
    fn predict(&self, features: &FeatureVector) -> Result<String, PredictionError> {
        let scaled = self.scaler.transform(&features.to_array());
        if let Some(idx) = scaled.iter().position(|v| !v.is_finite()) {
            return Err(PredictionError::NonFiniteInput {
                feature: FEATURE_COLUMNS[idx],
            });
        }
        self.forest
            .predict(&scaled)
            .map(ToString::to_string)
            .map_err(PredictionError::Model)
    }

    fn describe(&self) -> String {
        format!(
            "random_forest(trees={}, classes={})",
            self.forest.trees.len(),
            self.forest.classes.len()
        )
    }
}
