// SPDX-License-Identifier: Apache-2.0

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use rfjam_api::error_mapping::map_error;
use rfjam_api::ApiError;
use rfjam_store::{StoreError, StoreErrorKind};

#[must_use]
pub(crate) fn api_error_status(err: &ApiError) -> StatusCode {
    StatusCode::from_u16(map_error(err).status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

#[must_use]
pub(crate) fn api_error_response(err: ApiError) -> Response {
    (api_error_status(&err), Json(err)).into_response()
}

#[must_use]
pub(crate) fn store_error(err: &StoreError) -> ApiError {
    match err.kind {
        StoreErrorKind::Constraint => ApiError::store_constraint(err.message.clone()),
        _ => ApiError::store_unavailable(err.message.clone()),
    }
}
