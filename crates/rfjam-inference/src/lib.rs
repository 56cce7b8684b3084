// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]
//! Pre-trained jamming classifier: standard scaler followed by a random forest.
//!
//! Both artifacts are JSON exports of the fitted estimators and are loaded once
//! at process start. After loading, the engine is immutable and shared across
//! request tasks.

mod artifacts;
mod engine;
mod forest;
mod scaler;

pub use artifacts::{load_json_artifact, ArtifactError};
pub use engine::{Classifier, InferenceEngine, PredictionError};
pub use forest::{ClassLabel, DecisionTree, RandomForest, FOREST_FORMAT, TREE_LEAF};
pub use scaler::{StandardScaler, SCALER_FORMAT};

pub const CRATE_NAME: &str = "rfjam-inference";

/// Default artifact file names, resolved against the project root.
pub const DEFAULT_MODEL_FILE: &str = "rf_jamming_model.json";
pub const DEFAULT_SCALER_FILE: &str = "scaler.json";
