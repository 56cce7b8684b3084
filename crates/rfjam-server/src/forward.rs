// SPDX-License-Identifier: Apache-2.0

use crate::telemetry::ServiceTelemetry;
use rfjam_api::AddRecordResponse;
use rfjam_model::NewRecord;
use std::fmt::{Display, Formatter};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn, Instrument};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForwardOutcome {
    Stored { id: Option<i64> },
    Failed(String),
}

impl ForwardOutcome {
    #[must_use]
    pub fn is_stored(&self) -> bool {
        matches!(self, Self::Stored { .. })
    }
}

impl Display for ForwardOutcome {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stored { id: Some(id) } => write!(f, "stored as record {id}"),
            Self::Stored { id: None } => f.write_str("stored"),
            Self::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}

/// Posts predictions to the record service's `/add_record`.
///
/// Single attempt, bounded by `timeout`. The outcome is only logged and counted.
#[derive(Clone)]
pub struct Forwarder {
    client: reqwest::Client,
    endpoint: String,
    timeout: Duration,
    telemetry: Arc<ServiceTelemetry>,
}

impl Forwarder {
    pub fn new(
        db_service_url: &str,
        timeout: Duration,
        telemetry: Arc<ServiceTelemetry>,
    ) -> Result<Self, String> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| format!("forwarder client build failed: {e}"))?;
        Ok(Self {
            client,
            endpoint: format!("{}/add_record", db_service_url.trim_end_matches('/')),
            timeout,
            telemetry,
        })
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Runs the side call as its own task and waits for it at most `timeout`.
    pub async fn forward(&self, record: NewRecord) -> ForwardOutcome {
        let this = self.clone();
        let outcome = run_bounded(async move { this.send(&record).await }, self.timeout).await;
        self.telemetry.record_forward(outcome.is_stored());
        match &outcome {
            ForwardOutcome::Stored { id } => {
                debug!(endpoint = %self.endpoint, record_id = ?id, "prediction forwarded");
            }
            ForwardOutcome::Failed(reason) => {
                warn!(endpoint = %self.endpoint, reason = %reason, "prediction forward failed");
            }
        }
        outcome
    }

    async fn send(&self, record: &NewRecord) -> ForwardOutcome {
        let response = match self.client.post(&self.endpoint).json(record).send().await {
            Ok(resp) => resp,
            Err(e) => return ForwardOutcome::Failed(format!("request error: {e}")),
        };
        let status = response.status();
        if !status.is_success() {
            return ForwardOutcome::Failed(format!("record service returned {status}"));
        }
        let id = response
            .json::<AddRecordResponse>()
            .await
            .ok()
            .map(|body| body.id);
        ForwardOutcome::Stored { id }
    }
}

/// Spawns `call` and waits at most `timeout`. A call still running at the
/// deadline is aborted, so a late success cannot follow a counted failure.
async fn run_bounded<F>(call: F, timeout: Duration) -> ForwardOutcome
where
    F: Future<Output = ForwardOutcome> + Send + 'static,
{
    let mut task = tokio::spawn(call.in_current_span());
    match tokio::time::timeout(timeout, &mut task).await {
        Ok(Ok(outcome)) => outcome,
        Ok(Err(join)) => ForwardOutcome::Failed(format!("forward task aborted: {join}")),
        Err(_) => {
            task.abort();
            ForwardOutcome::Failed(format!("no response within {} ms", timeout.as_millis()))
        }
    }
}
