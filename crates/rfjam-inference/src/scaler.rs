// SPDX-License-Identifier: Apache-2.0

use rfjam_model::{FEATURE_COLUMNS, FEATURE_COUNT};
use serde::{Deserialize, Serialize};

pub const SCALER_FORMAT: &str = "rfjam-standard-scaler/v1";

/// Fitted standard scaler: `(x - mean) / scale` per feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub format: String,
    #[serde(default)]
    pub feature_names: Option<Vec<String>>,
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl StandardScaler {
    #[must_use]
    pub fn new(mean: [f64; FEATURE_COUNT], scale: [f64; FEATURE_COUNT]) -> Self {
        Self {
            format: SCALER_FORMAT.to_string(),
            feature_names: Some(FEATURE_COLUMNS.iter().map(ToString::to_string).collect()),
            mean: mean.to_vec(),
            scale: scale.to_vec(),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.format != SCALER_FORMAT {
            return Err(format!(
                "unsupported scaler format `{}` (expected `{SCALER_FORMAT}`)",
                self.format
            ));
        }
        if self.mean.len() != FEATURE_COUNT || self.scale.len() != FEATURE_COUNT {
            return Err(format!(
                "scaler expects {FEATURE_COUNT} features, got mean={} scale={}",
                self.mean.len(),
                self.scale.len()
            ));
        }
        if let Some(names) = &self.feature_names {
            if names.iter().map(String::as_str).ne(FEATURE_COLUMNS) {
                return Err(format!(
                    "scaler feature order {names:?} does not match {FEATURE_COLUMNS:?}"
                ));
            }
        }
        if self
            .mean
            .iter()
            .chain(self.scale.iter())
            .any(|v| !v.is_finite())
        {
            return Err("scaler parameters must be finite".to_string());
        }
        Ok(())
    }

    /// Zero scale marks a constant feature during fitting; it is treated as 1.0.
    #[must_use]
    pub fn transform(&self, row: &[f64; FEATURE_COUNT]) -> [f64; FEATURE_COUNT] {
        std::array::from_fn(|i| {
            let scale = if self.scale[i] == 0.0 { 1.0 } else { self.scale[i] };
            (row[i] - self.mean[i]) / scale
        })
    }
}
