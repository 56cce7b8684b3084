// SPDX-License-Identifier: Apache-2.0

use super::payload::{decode_payload, read_body};
use super::response_contract::api_error_response;
use crate::telemetry::METRICS_CONTENT_TYPE;
use crate::PredictState;
use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::http::HeaderMap;
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use rfjam_api::{ApiError, PredictResponse};
use rfjam_model::{parse_features, NewRecord};
use tracing::{error, info};

const INDEX_HTML: &str = include_str!("../../static/index.html");

pub(crate) async fn index_handler() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// Validate, predict, then hand the record to the forwarder. The forward
/// outcome never changes the response.
pub(crate) async fn predict_handler(
    State(state): State<PredictState>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let features = match read_body(body)
        .and_then(|body| decode_payload(&headers, &body))
        .and_then(|payload| {
            parse_features(&payload).map_err(|e| ApiError::invalid_prediction_input(&e))
        }) {
        Ok(features) => features,
        Err(err) => {
            info!(code = err.code.as_str(), details = %err.details, "prediction input rejected");
            return api_error_response(err);
        }
    };

    let label = match state.classifier.predict(&features) {
        Ok(label) => label,
        Err(err) => {
            error!(error = %err, classifier = %state.classifier.describe(), "model prediction failed");
            return api_error_response(ApiError::prediction_failed(err.to_string()));
        }
    };
    info!(prediction = %label, "prediction served");

    let outcome = state
        .forwarder
        .forward(NewRecord::new(features, label.clone()))
        .await;
    tracing::debug!(forward = %outcome, "forward finished");

    Json(PredictResponse { prediction: label }).into_response()
}

pub(crate) async fn metrics_handler(State(state): State<PredictState>) -> impl IntoResponse {
    let body = state.telemetry.render(&[]).await;
    ([(CONTENT_TYPE, METRICS_CONTENT_TYPE)], body)
}
