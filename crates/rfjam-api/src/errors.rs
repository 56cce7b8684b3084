// SPDX-License-Identifier: Apache-2.0

use rfjam_model::ValidationError;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub const INVALID_PREDICTION_INPUT_MESSAGE: &str =
    "Invalid input. Ensure all fields are provided and numeric.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum ApiErrorCode {
    MissingFields,
    InvalidInput,
    PredictionFailed,
    StoreConstraint,
    StoreUnavailable,
    Internal,
}

impl ApiErrorCode {
    pub const ALL: [Self; 6] = [
        Self::MissingFields,
        Self::InvalidInput,
        Self::PredictionFailed,
        Self::StoreConstraint,
        Self::StoreUnavailable,
        Self::Internal,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MissingFields => "missing_fields",
            Self::InvalidInput => "invalid_input",
            Self::PredictionFailed => "prediction_failed",
            Self::StoreConstraint => "store_constraint",
            Self::StoreUnavailable => "store_unavailable",
            Self::Internal => "internal",
        }
    }
}

/// Wire error body: `{"error": "...", "code": "...", "details": ...}`.
///
/// Missing-field errors additionally carry `required` and `missing`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    #[serde(rename = "error")]
    pub message: String,
    pub code: ApiErrorCode,
    pub details: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub missing: Option<Vec<String>>,
}

impl ApiError {
    #[must_use]
    pub fn new(code: ApiErrorCode, message: impl Into<String>, details: Value) -> Self {
        Self {
            message: message.into(),
            code,
            details,
            required: None,
            missing: None,
        }
    }

    #[must_use]
    pub fn from_validation(err: &ValidationError) -> Self {
        match err {
            ValidationError::MissingFields { missing, required } => Self {
                message: "Missing required fields".to_string(),
                code: ApiErrorCode::MissingFields,
                details: Value::String(err.to_string()),
                required: Some(required.iter().map(ToString::to_string).collect()),
                missing: Some(missing.iter().map(ToString::to_string).collect()),
            },
            ValidationError::InvalidType { field, .. } => Self::new(
                ApiErrorCode::InvalidInput,
                "Invalid types for one or more fields",
                json!({"field": field, "message": err.to_string()}),
            ),
            _ => Self::new(
                ApiErrorCode::InvalidInput,
                INVALID_PREDICTION_INPUT_MESSAGE,
                Value::String(err.to_string()),
            ),
        }
    }

    /// `/predict` reports every validation failure under one message; the
    /// structured fields still name the offending keys.
    #[must_use]
    pub fn invalid_prediction_input(err: &ValidationError) -> Self {
        Self {
            message: INVALID_PREDICTION_INPUT_MESSAGE.to_string(),
            ..Self::from_validation(err)
        }
    }

    #[must_use]
    pub fn malformed_body(details: impl Into<String>) -> Self {
        Self::new(
            ApiErrorCode::InvalidInput,
            "Malformed request body",
            Value::String(details.into()),
        )
    }

    /// Body over the configured limit. Reported as bad input so both POST
    /// routes keep their documented status set.
    #[must_use]
    pub fn payload_too_large(details: impl Into<String>) -> Self {
        Self::new(
            ApiErrorCode::InvalidInput,
            "Request body too large",
            Value::String(details.into()),
        )
    }

    #[must_use]
    pub fn prediction_failed(details: impl Into<String>) -> Self {
        Self::new(
            ApiErrorCode::PredictionFailed,
            "Model prediction failed",
            Value::String(details.into()),
        )
    }

    #[must_use]
    pub fn store_constraint(details: impl Into<String>) -> Self {
        Self::new(
            ApiErrorCode::StoreConstraint,
            "Record rejected by store",
            Value::String(details.into()),
        )
    }

    #[must_use]
    pub fn store_unavailable(details: impl Into<String>) -> Self {
        Self::new(
            ApiErrorCode::StoreUnavailable,
            "Record store unavailable",
            Value::String(details.into()),
        )
    }

    #[must_use]
    pub fn internal(details: impl Into<String>) -> Self {
        Self::new(
            ApiErrorCode::Internal,
            "Internal error",
            Value::String(details.into()),
        )
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for ApiError {}

const _: fn() = || {
    fn assert_traits<T: Serialize + for<'de> Deserialize<'de>>() {}
    assert_traits::<ApiErrorCode>();
    assert_traits::<ApiError>();
};
