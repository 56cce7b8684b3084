// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]
//! Prediction record model SSOT.
//!
//! Feature names, record shapes and the payload validator shared by the
//! inference service and the record service.

mod features;
mod record;
mod validate;

pub use features::{FeatureVector, FEATURE_COLUMNS, FEATURE_COUNT};
pub use record::{
    NewRecord, PredictionRecord, PREDICTION_FIELD, PREDICTION_MAX_LEN, RECORD_FIELDS,
};
pub use validate::{parse_features, parse_new_record, ValidationError};

pub const CRATE_NAME: &str = "rfjam-model";
