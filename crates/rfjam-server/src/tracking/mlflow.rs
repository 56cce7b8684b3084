// SPDX-License-Identifier: Apache-2.0

use super::{classify_label, run_name, ExperimentTracker, LabelValue, TrackingError};
use async_trait::async_trait;
use reqwest::StatusCode;
use rfjam_model::NewRecord;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::{info, warn};

const API_PREFIX: &str = "/api/2.0/mlflow";
/// Runs land here when the named experiment could not be resolved.
const DEFAULT_EXPERIMENT_ID: &str = "0";

#[derive(Deserialize)]
struct ExperimentEnvelope {
    experiment: ExperimentInfo,
}

#[derive(Deserialize)]
struct ExperimentInfo {
    experiment_id: String,
}

#[derive(Deserialize)]
struct CreateExperimentResponse {
    experiment_id: String,
}

#[derive(Deserialize)]
struct CreateRunResponse {
    run: RunEnvelope,
}

#[derive(Deserialize)]
struct RunEnvelope {
    info: RunInfo,
}

#[derive(Deserialize)]
struct RunInfo {
    run_id: String,
}

fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| i64::try_from(d.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

/// MLflow tracking-server client speaking the REST API directly.
pub struct MlflowTracker {
    client: reqwest::Client,
    base_url: String,
    experiment_name: String,
    experiment_id: Option<String>,
}

impl MlflowTracker {
    /// Builds the client and resolves (or creates) the experiment. Resolution
    /// failure is logged; runs then go to the server's default experiment.
    pub async fn connect(
        tracking_uri: &str,
        experiment_name: &str,
        timeout: Duration,
    ) -> Result<Self, TrackingError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TrackingError(format!("client build failed: {e}")))?;
        let mut tracker = Self {
            client,
            base_url: tracking_uri.trim_end_matches('/').to_string(),
            experiment_name: experiment_name.to_string(),
            experiment_id: None,
        };
        match tracker.resolve_experiment().await {
            Ok(id) => {
                info!(experiment = %tracker.experiment_name, experiment_id = %id, "tracking experiment resolved");
                tracker.experiment_id = Some(id);
            }
            Err(e) => {
                warn!(experiment = %tracker.experiment_name, error = %e, "tracking experiment unresolved");
            }
        }
        Ok(tracker)
    }

    #[must_use]
    pub fn experiment_id(&self) -> Option<&str> {
        self.experiment_id.as_deref()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{API_PREFIX}{path}", self.base_url)
    }

    async fn resolve_experiment(&self) -> Result<String, TrackingError> {
        let resp = self
            .client
            .get(self.url("/experiments/get-by-name"))
            .query(&[("experiment_name", self.experiment_name.as_str())])
            .send()
            .await
            .map_err(|e| TrackingError(format!("get experiment: {e}")))?;
        match resp.status() {
            s if s.is_success() => resp
                .json::<ExperimentEnvelope>()
                .await
                .map(|body| body.experiment.experiment_id)
                .map_err(|e| TrackingError(format!("decode experiment: {e}"))),
            StatusCode::NOT_FOUND => {
                let created: CreateExperimentResponse = self
                    .post("/experiments/create", &json!({"name": self.experiment_name}))
                    .await?;
                Ok(created.experiment_id)
            }
            s => Err(TrackingError(format!("get experiment returned {s}"))),
        }
    }

    async fn post<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        body: &Value,
    ) -> Result<T, TrackingError> {
        let resp = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(|e| TrackingError(format!("{path}: {e}")))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(TrackingError(format!("{path} returned {status}")));
        }
        resp.json::<T>()
            .await
            .map_err(|e| TrackingError(format!("{path}: decode response: {e}")))
    }
}

fn log_batch_body(run_id: &str, record: &NewRecord, timestamp: i64) -> Value {
    let mut params: Vec<Value> = record
        .features
        .named()
        .iter()
        .map(|(name, value)| json!({"key": name, "value": value.to_string()}))
        .collect();
    let mut metrics = Vec::new();
    match classify_label(&record.prediction) {
        LabelValue::Metric(v) => metrics.push(json!({
            "key": "prediction", "value": v, "timestamp": timestamp, "step": 0
        })),
        LabelValue::Param(label) => params.push(json!({"key": "prediction", "value": label})),
    }
    json!({"run_id": run_id, "params": params, "metrics": metrics})
}

#[async_trait]
impl ExperimentTracker for MlflowTracker {
    async fn record_prediction(&self, id: i64, record: &NewRecord) -> Result<(), TrackingError> {
        let name = run_name(id);
        let started = now_millis();
        let created: CreateRunResponse = self
            .post(
                "/runs/create",
                &json!({
                    "experiment_id": self.experiment_id.as_deref().unwrap_or(DEFAULT_EXPERIMENT_ID),
                    "run_name": name,
                    "start_time": started,
                    "tags": [{"key": "mlflow.runName", "value": name}],
                }),
            )
            .await?;
        let run_id = created.run.info.run_id;
        self.post::<Value>("/runs/log-batch", &log_batch_body(&run_id, record, started))
            .await?;
        self.post::<Value>(
            "/runs/update",
            &json!({"run_id": run_id, "status": "FINISHED", "end_time": now_millis()}),
        )
        .await?;
        Ok(())
    }

    fn describe(&self) -> String {
        format!("mlflow({}, experiment={})", self.base_url, self.experiment_name)
    }
}
