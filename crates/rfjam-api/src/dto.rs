// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};

pub const RECORD_ADDED_MESSAGE: &str = "Record added";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PredictResponse {
    pub prediction: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AddRecordResponse {
    pub message: String,
    pub id: i64,
}

impl AddRecordResponse {
    #[must_use]
    pub fn added(id: i64) -> Self {
        Self {
            message: RECORD_ADDED_MESSAGE.to_string(),
            id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}

impl HealthResponse {
    #[must_use]
    pub fn ok(service: &str) -> Self {
        Self {
            status: "ok".to_string(),
            service: service.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
