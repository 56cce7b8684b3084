// SPDX-License-Identifier: Apache-2.0

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;

pub const METRICS_CONTENT_TYPE: &str = "text/plain; version=0.0.4";

const LATENCY_BUCKETS_SECONDS: [f64; 11] = [
    0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
];

#[derive(Debug, Clone, Default)]
struct Histogram {
    buckets: [u64; LATENCY_BUCKETS_SECONDS.len()],
    sum_seconds: f64,
    count: u64,
}

impl Histogram {
    fn observe(&mut self, seconds: f64) {
        for (slot, bound) in self.buckets.iter_mut().zip(LATENCY_BUCKETS_SECONDS) {
            if seconds <= bound {
                *slot += 1;
            }
        }
        self.sum_seconds += seconds;
        self.count += 1;
    }
}

type RequestKey = (String, String, u16);
type LatencyKey = (String, String);

/// Per-service counters. Request series are keyed by matched route, method and status.
pub struct ServiceTelemetry {
    service: &'static str,
    request_id_seed: AtomicU64,
    counts: Mutex<BTreeMap<RequestKey, u64>>,
    latency: Mutex<BTreeMap<LatencyKey, Histogram>>,
    forward_success: AtomicU64,
    forward_failures: AtomicU64,
    tracking_failures: AtomicU64,
}

impl ServiceTelemetry {
    #[must_use]
    pub fn new(service: &'static str) -> Self {
        Self {
            service,
            request_id_seed: AtomicU64::new(1),
            counts: Mutex::new(BTreeMap::new()),
            latency: Mutex::new(BTreeMap::new()),
            forward_success: AtomicU64::new(0),
            forward_failures: AtomicU64::new(0),
            tracking_failures: AtomicU64::new(0),
        }
    }

    #[must_use]
    pub fn service(&self) -> &'static str {
        self.service
    }

    pub(crate) fn next_request_id(&self) -> String {
        let id = self.request_id_seed.fetch_add(1, Ordering::Relaxed);
        format!("req-{id:016x}")
    }

    pub(crate) async fn observe_request(
        &self,
        endpoint: &str,
        method: &str,
        status: u16,
        latency: Duration,
    ) {
        let mut counts = self.counts.lock().await;
        *counts
            .entry((endpoint.to_string(), method.to_string(), status))
            .or_insert(0) += 1;
        drop(counts);
        let mut latency_map = self.latency.lock().await;
        latency_map
            .entry((endpoint.to_string(), method.to_string()))
            .or_default()
            .observe(latency.as_secs_f64());
    }

    pub(crate) fn record_forward(&self, stored: bool) {
        let counter = if stored {
            &self.forward_success
        } else {
            &self.forward_failures
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_tracking_failure(&self) {
        self.tracking_failures.fetch_add(1, Ordering::Relaxed);
    }

    #[must_use]
    pub fn forward_failures(&self) -> u64 {
        self.forward_failures.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn forward_successes(&self) -> u64 {
        self.forward_success.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn tracking_failures(&self) -> u64 {
        self.tracking_failures.load(Ordering::Relaxed)
    }

    /// Prometheus text exposition. `gauges` are appended as `name value` pairs
    /// labelled with this service.
    pub(crate) async fn render(&self, gauges: &[(&str, &str, f64)]) -> String {
        let service = self.service;
        let mut body = String::new();

        body.push_str("# HELP rfjam_http_requests_total HTTP requests by endpoint, method and status.\n");
        body.push_str("# TYPE rfjam_http_requests_total counter\n");
        let counts = self.counts.lock().await.clone();
        for ((endpoint, method, status), count) in &counts {
            let _ = writeln!(
                body,
                "rfjam_http_requests_total{{service=\"{service}\",endpoint=\"{endpoint}\",method=\"{method}\",http_status=\"{status}\"}} {count}"
            );
        }

        body.push_str("# HELP rfjam_http_request_duration_seconds HTTP request latency.\n");
        body.push_str("# TYPE rfjam_http_request_duration_seconds histogram\n");
        let latency = self.latency.lock().await.clone();
        for ((endpoint, method), hist) in &latency {
            push_histogram(
                &mut body,
                "rfjam_http_request_duration_seconds",
                &format!("service=\"{service}\",endpoint=\"{endpoint}\",method=\"{method}\""),
                hist,
            );
        }

        for (name, help, value) in [
            (
                "rfjam_forward_success_total",
                "Predictions stored by the record service.",
                self.forward_successes(),
            ),
            (
                "rfjam_forward_failures_total",
                "Predictions the record service did not acknowledge.",
                self.forward_failures(),
            ),
            (
                "rfjam_tracking_failures_total",
                "Experiment tracking runs that failed.",
                self.tracking_failures(),
            ),
        ] {
            let _ = writeln!(body, "# HELP {name} {help}");
            let _ = writeln!(body, "# TYPE {name} counter");
            let _ = writeln!(body, "{name}{{service=\"{service}\"}} {value}");
        }

        for (name, help, value) in gauges {
            let _ = writeln!(body, "# HELP {name} {help}");
            let _ = writeln!(body, "# TYPE {name} gauge");
            let _ = writeln!(body, "{name}{{service=\"{service}\"}} {value}");
        }
        body
    }
}

fn push_histogram(body: &mut String, metric_name: &str, base_labels: &str, hist: &Histogram) {
    for (bound, count) in LATENCY_BUCKETS_SECONDS.iter().zip(hist.buckets) {
        let _ = writeln!(
            body,
            "{metric_name}_bucket{{{base_labels},le=\"{bound}\"}} {count}"
        );
    }
    let _ = writeln!(
        body,
        "{metric_name}_bucket{{{base_labels},le=\"+Inf\"}} {}",
        hist.count
    );
    let _ = writeln!(
        body,
        "{metric_name}_sum{{{base_labels}}} {:.9}",
        hist.sum_seconds
    );
    let _ = writeln!(body, "{metric_name}_count{{{base_labels}}} {}", hist.count);
}
