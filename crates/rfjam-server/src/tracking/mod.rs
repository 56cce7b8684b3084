// SPDX-License-Identifier: Apache-2.0

//! Best-effort experiment tracking of stored predictions.

use async_trait::async_trait;
use rfjam_model::NewRecord;
use std::fmt::{Display, Formatter};

mod mlflow;

pub use mlflow::MlflowTracker;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackingError(pub String);

impl Display for TrackingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "tracking failed: {}", self.0)
    }
}

impl std::error::Error for TrackingError {}

/// One run per stored record, named after the record id.
#[async_trait]
pub trait ExperimentTracker: Send + Sync + 'static {
    async fn record_prediction(&self, id: i64, record: &NewRecord) -> Result<(), TrackingError>;

    fn describe(&self) -> String;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTracker;

#[async_trait]
impl ExperimentTracker for NoopTracker {
    async fn record_prediction(&self, _id: i64, _record: &NewRecord) -> Result<(), TrackingError> {
        Ok(())
    }

    fn describe(&self) -> String {
        "disabled".to_string()
    }
}

#[must_use]
pub fn run_name(id: i64) -> String {
    format!("pred_{id}")
}

/// How the label is reported to the tracker. Storage always keeps the string.
#[derive(Debug, Clone, PartialEq)]
pub enum LabelValue {
    Metric(f64),
    Param(String),
}

#[must_use]
pub fn classify_label(label: &str) -> LabelValue {
    match label.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => LabelValue::Metric(v),
        _ => LabelValue::Param(label.to_string()),
    }
}
