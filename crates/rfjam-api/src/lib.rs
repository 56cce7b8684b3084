// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

pub mod dto;
pub mod error_mapping;
mod errors;
pub mod openapi;

pub use dto::{AddRecordResponse, HealthResponse, PredictResponse, RECORD_ADDED_MESSAGE};
pub use errors::{ApiError, ApiErrorCode, INVALID_PREDICTION_INPUT_MESSAGE};

pub const CRATE_NAME: &str = "rfjam-api";
