// SPDX-License-Identifier: Apache-2.0

use crate::telemetry::ServiceTelemetry;
use axum::http::HeaderMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RequestTrace {
    pub request_id: String,
    pub correlation_id: Option<String>,
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToString::to_string)
}

/// Honors a caller-supplied `x-request-id`; otherwise issues the next local id.
#[must_use]
pub(crate) fn extract_request_trace(
    headers: &HeaderMap,
    telemetry: &ServiceTelemetry,
) -> RequestTrace {
    RequestTrace {
        request_id: header_value(headers, "x-request-id")
            .unwrap_or_else(|| telemetry.next_request_id()),
        correlation_id: header_value(headers, "x-correlation-id"),
    }
}
