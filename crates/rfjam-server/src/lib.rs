// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]
//! HTTP surface of the jamming detector: the inference service (`/predict`)
//! and the record service (`/add_record`, `/get_records`, `/records_page`).

use axum::extract::{DefaultBodyLimit, FromRef};
use axum::routing::{get, post};
use axum::Router;
use rfjam_inference::Classifier;
use rfjam_store::RecordStore;
use std::sync::Arc;

mod config;
pub mod forward;
mod http;
mod middleware;
mod runtime;
pub mod telemetry;
pub mod tracking;

pub use config::{
    env_bool, validate_predict_config, validate_records_config, PredictServiceConfig,
    RecordServiceConfig, DEFAULT_DB_SERVICE_URL, DEFAULT_FORWARD_TIMEOUT, DEFAULT_MAX_BODY_BYTES,
    DEFAULT_MLFLOW_EXPERIMENT, DEFAULT_MLFLOW_TRACKING_URI, DEFAULT_PREDICT_PORT,
    DEFAULT_RECORDS_PORT,
};
pub use forward::{ForwardOutcome, Forwarder};
pub use runtime::{serve, wait_for_shutdown_signal};
pub use telemetry::ServiceTelemetry;
pub use tracking::{ExperimentTracker, MlflowTracker, NoopTracker, TrackingError};

pub const CRATE_NAME: &str = "rfjam-server";
pub const PREDICT_SERVICE: &str = "predict";
pub const RECORDS_SERVICE: &str = "records";

/// Shared state of the inference service. Built once at startup.
#[derive(Clone)]
pub struct PredictState {
    pub(crate) classifier: Arc<dyn Classifier>,
    pub(crate) forwarder: Forwarder,
    pub(crate) telemetry: Arc<ServiceTelemetry>,
}

impl PredictState {
    pub fn new(
        classifier: Arc<dyn Classifier>,
        db_service_url: &str,
        forward_timeout: std::time::Duration,
    ) -> Result<Self, String> {
        let telemetry = Arc::new(ServiceTelemetry::new(PREDICT_SERVICE));
        let forwarder = Forwarder::new(db_service_url, forward_timeout, Arc::clone(&telemetry))?;
        Ok(Self {
            classifier,
            forwarder,
            telemetry,
        })
    }

    pub fn from_config(
        classifier: Arc<dyn Classifier>,
        cfg: &PredictServiceConfig,
    ) -> Result<Self, String> {
        Self::new(classifier, &cfg.db_service_url, cfg.forward_timeout)
    }

    #[must_use]
    pub fn telemetry(&self) -> Arc<ServiceTelemetry> {
        Arc::clone(&self.telemetry)
    }
}

/// Shared state of the record service.
#[derive(Clone)]
pub struct RecordState {
    pub(crate) store: Arc<dyn RecordStore>,
    pub(crate) tracker: Arc<dyn ExperimentTracker>,
    pub(crate) telemetry: Arc<ServiceTelemetry>,
}

impl RecordState {
    #[must_use]
    pub fn new(store: Arc<dyn RecordStore>, tracker: Arc<dyn ExperimentTracker>) -> Self {
        Self {
            store,
            tracker,
            telemetry: Arc::new(ServiceTelemetry::new(RECORDS_SERVICE)),
        }
    }

    #[must_use]
    pub fn telemetry(&self) -> Arc<ServiceTelemetry> {
        Arc::clone(&self.telemetry)
    }
}

impl FromRef<PredictState> for Arc<ServiceTelemetry> {
    fn from_ref(state: &PredictState) -> Self {
        Arc::clone(&state.telemetry)
    }
}

impl FromRef<RecordState> for Arc<ServiceTelemetry> {
    fn from_ref(state: &RecordState) -> Self {
        Arc::clone(&state.telemetry)
    }
}

pub fn build_predict_router(state: PredictState, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/", get(http::predict::index_handler))
        .route("/predict", post(http::predict::predict_handler))
        .route("/healthz", get(http::healthz_handler))
        .route("/metrics", get(http::predict::metrics_handler))
        .layer(axum::middleware::from_fn_with_state(
            state.telemetry(),
            middleware::request_tracing::request_tracing_middleware,
        ))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .with_state(state)
}

pub fn build_records_router(state: RecordState, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/add_record", post(http::records::add_record_handler))
        .route("/get_records", get(http::records::get_records_handler))
        .route("/records_page", get(http::records::records_page_handler))
        .route("/healthz", get(http::healthz_handler))
        .route("/metrics", get(http::records::metrics_handler))
        .layer(axum::middleware::from_fn_with_state(
            state.telemetry(),
            middleware::request_tracing::request_tracing_middleware,
        ))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .with_state(state)
}
