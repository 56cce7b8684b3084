// SPDX-License-Identifier: Apache-2.0

use crate::features::{FeatureVector, FEATURE_COLUMNS, FEATURE_COUNT};
use serde::{Deserialize, Serialize};

pub const PREDICTION_FIELD: &str = "prediction";
pub const PREDICTION_MAX_LEN: usize = 50;

pub const RECORD_FIELDS: [&str; FEATURE_COUNT + 1] = [
    FEATURE_COLUMNS[0],
    FEATURE_COLUMNS[1],
    FEATURE_COLUMNS[2],
    FEATURE_COLUMNS[3],
    FEATURE_COLUMNS[4],
    FEATURE_COLUMNS[5],
    PREDICTION_FIELD,
];

/// A validated record that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewRecord {
    #[serde(flatten)]
    pub features: FeatureVector,
    pub prediction: String,
}

impl NewRecord {
    #[must_use]
    pub fn new(features: FeatureVector, prediction: impl Into<String>) -> Self {
        Self {
            features,
            prediction: prediction.into(),
        }
    }

    #[must_use]
    pub fn with_id(self, id: i64) -> PredictionRecord {
        PredictionRecord {
            id,
            features: self.features,
            prediction: self.prediction,
        }
    }
}

/// A stored record. Immutable once the store has assigned its id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRecord {
    pub id: i64,
    #[serde(flatten)]
    pub features: FeatureVector,
    pub prediction: String,
}
