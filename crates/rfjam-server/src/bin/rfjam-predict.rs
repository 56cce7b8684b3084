// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

use rfjam_inference::InferenceEngine;
use rfjam_server::telemetry::{init_tracing, LOG_JSON_ENV};
use rfjam_server::{
    build_predict_router, env_bool, serve, validate_predict_config, PredictServiceConfig,
    PredictState,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), String> {
    init_tracing(env_bool(LOG_JSON_ENV, true));

    let cfg = PredictServiceConfig::from_env();
    validate_predict_config(&cfg)?;

    let engine = InferenceEngine::load(&cfg.model_path, &cfg.scaler_path)
        .map_err(|e| format!("failed to load inference artifacts: {e}"))?;
    let state = PredictState::from_config(Arc::new(engine), &cfg)?;
    info!(
        db_service_url = %cfg.db_service_url,
        forward_timeout_ms = u64::try_from(cfg.forward_timeout.as_millis()).unwrap_or(u64::MAX),
        "inference service configured"
    );

    let addr = cfg.bind_addr()?;
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| format!("bind {addr} failed: {e}"))?;
    serve(listener, build_predict_router(state, cfg.max_body_bytes)).await
}
