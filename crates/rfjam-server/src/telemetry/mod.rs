// SPDX-License-Identifier: Apache-2.0

mod logging;
mod metrics;

pub use logging::{init_tracing, LOG_JSON_ENV};
pub use metrics::{ServiceTelemetry, METRICS_CONTENT_TYPE};
