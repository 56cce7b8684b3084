// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

use rfjam_server::telemetry::{init_tracing, LOG_JSON_ENV};
use rfjam_server::{
    build_records_router, env_bool, serve, validate_records_config, ExperimentTracker,
    MlflowTracker, NoopTracker, RecordServiceConfig, RecordState,
};
use rfjam_store::{DatabaseUrl, RecordStore, SqliteRecordStore};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

async fn build_tracker(cfg: &RecordServiceConfig) -> Arc<dyn ExperimentTracker> {
    if !cfg.mlflow_enabled {
        return Arc::new(NoopTracker);
    }
    match MlflowTracker::connect(
        &cfg.mlflow_tracking_uri,
        &cfg.mlflow_experiment,
        cfg.tracking_timeout,
    )
    .await
    {
        Ok(tracker) => Arc::new(tracker),
        Err(e) => {
            warn!(error = %e, "experiment tracking disabled");
            Arc::new(NoopTracker)
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), String> {
    init_tracing(env_bool(LOG_JSON_ENV, true));

    let cfg = RecordServiceConfig::from_env();
    validate_records_config(&cfg)?;

    let url = DatabaseUrl::parse(&cfg.database_url).map_err(|e| e.to_string())?;
    let store: Arc<dyn RecordStore> =
        Arc::new(SqliteRecordStore::open(&url).map_err(|e| e.to_string())?);
    let tracker = build_tracker(&cfg).await;
    info!(
        database = %url.describe(),
        tracker = %tracker.describe(),
        "record service configured"
    );
    let state = RecordState::new(store, tracker);

    let addr = cfg.bind_addr()?;
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| format!("bind {addr} failed: {e}"))?;
    serve(listener, build_records_router(state, cfg.max_body_bytes)).await
}
