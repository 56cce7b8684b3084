// SPDX-License-Identifier: Apache-2.0

use crate::telemetry::ServiceTelemetry;
use axum::extract::State;
use axum::Json;
use rfjam_api::HealthResponse;
use std::sync::Arc;

mod payload;
pub(crate) mod predict;
pub(crate) mod records;
pub(crate) mod request_tracing;
mod response_contract;

pub(crate) async fn healthz_handler(
    State(telemetry): State<Arc<ServiceTelemetry>>,
) -> Json<HealthResponse> {
    Json(HealthResponse::ok(telemetry.service()))
}
