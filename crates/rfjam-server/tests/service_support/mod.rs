#![allow(dead_code)]

use async_trait::async_trait;
use rfjam_inference::{Classifier, InferenceEngine, PredictionError};
use rfjam_model::{FeatureVector, NewRecord, PredictionRecord};
use rfjam_server::{
    build_predict_router, build_records_router, ExperimentTracker, NoopTracker, PredictState,
    RecordState, TrackingError,
};
use rfjam_store::{RecordStore, SqliteRecordStore, StoreError};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

pub const MAX_BODY_BYTES: usize = 16 * 1024;
pub const CLEAR_PAYLOAD: &str =
    r#"{"Time": 0, "SNR": 10, "Speed": 5, "RSSI": -70, "PDR": 0.9, "Relative_Speed": 2}"#;
pub const JAMMED_PAYLOAD: &str =
    r#"{"Time": 30, "SNR": 2, "Speed": 20, "RSSI": -95, "PDR": 0.2, "Relative_Speed": 5}"#;

/// Adds an ignored `note` field of `extra` bytes to a JSON object payload.
pub fn with_padding(payload: &str, extra: usize) -> String {
    let mut value: serde_json::Value = serde_json::from_str(payload).expect("json payload");
    value["note"] = serde_json::Value::String("x".repeat(extra));
    value.to_string()
}

pub fn workspace_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .and_then(|p| p.parent())
        .expect("workspace root")
        .to_path_buf()
}

pub fn bundled_engine() -> Arc<InferenceEngine> {
    let root = workspace_root();
    Arc::new(
        InferenceEngine::load(
            &root.join("rf_jamming_model.json"),
            &root.join("scaler.json"),
        )
        .expect("bundled artifacts"),
    )
}

pub struct FixedClassifier(pub &'static str);

impl Classifier for FixedClassifier {
    fn predict(&self, _features: &FeatureVector) -> Result<String, PredictionError> {
        Ok(self.0.to_string())
    }
}

pub struct FailingClassifier;

impl Classifier for FailingClassifier {
    fn predict(&self, _features: &FeatureVector) -> Result<String, PredictionError> {
        Err(PredictionError::Model("tree walk exceeded depth".to_string()))
    }
}

/// Store whose every call fails as if the database were gone.
pub struct UnavailableStore;

impl RecordStore for UnavailableStore {
    fn insert(&self, _record: &NewRecord) -> Result<i64, StoreError> {
        Err(StoreError::unavailable("unable to open database file"))
    }

    fn list(&self) -> Result<Vec<PredictionRecord>, StoreError> {
        Err(StoreError::unavailable("unable to open database file"))
    }

    fn count(&self) -> Result<u64, StoreError> {
        Err(StoreError::unavailable("unable to open database file"))
    }
}

#[derive(Default)]
pub struct RecordingTracker {
    pub runs: Mutex<Vec<(i64, NewRecord)>>,
    pub fail: bool,
}

#[async_trait]
impl ExperimentTracker for RecordingTracker {
    async fn record_prediction(&self, id: i64, record: &NewRecord) -> Result<(), TrackingError> {
        self.runs
            .lock()
            .expect("tracker lock")
            .push((id, record.clone()));
        if self.fail {
            return Err(TrackingError("tracking server unreachable".to_string()));
        }
        Ok(())
    }

    fn describe(&self) -> String {
        "recording".to_string()
    }
}

pub async fn spawn_router(app: axum::Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });
    addr
}

pub async fn spawn_records_service(
    store: Arc<dyn RecordStore>,
    tracker: Arc<dyn ExperimentTracker>,
) -> (SocketAddr, RecordState) {
    let state = RecordState::new(store, tracker);
    let addr = spawn_router(build_records_router(state.clone(), MAX_BODY_BYTES)).await;
    (addr, state)
}

pub async fn spawn_memory_records_service() -> (SocketAddr, RecordState) {
    spawn_records_service(
        Arc::new(SqliteRecordStore::open_in_memory().expect("memory store")),
        Arc::new(NoopTracker),
    )
    .await
}

pub async fn spawn_predict_service(
    classifier: Arc<dyn Classifier>,
    db_service_url: &str,
    forward_timeout: Duration,
) -> (SocketAddr, PredictState) {
    let state =
        PredictState::new(classifier, db_service_url, forward_timeout).expect("predict state");
    let addr = spawn_router(build_predict_router(state.clone(), MAX_BODY_BYTES)).await;
    (addr, state)
}

/// An address nothing listens on.
pub fn closed_addr() -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    addr
}

pub async fn send_raw(
    addr: SocketAddr,
    path: &str,
    headers: &[(&str, &str)],
) -> (u16, String, String) {
    send_raw_with_method(addr, "GET", path, headers, None).await
}

pub async fn post_json(addr: SocketAddr, path: &str, body: &str) -> (u16, String, String) {
    send_raw_with_method(
        addr,
        "POST",
        path,
        &[("Content-Type", "application/json")],
        Some(body),
    )
    .await
}

pub async fn send_raw_with_method(
    addr: SocketAddr,
    method: &str,
    path: &str,
    headers: &[(&str, &str)],
    body: Option<&str>,
) -> (u16, String, String) {
    let mut stream = tokio::net::TcpStream::connect(addr)
        .await
        .expect("connect server");
    let mut req = format!("{method} {path} HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n");
    if let Some(payload) = body {
        req.push_str(&format!("Content-Length: {}\r\n", payload.len()));
    }
    for (k, v) in headers {
        req.push_str(&format!("{k}: {v}\r\n"));
    }
    req.push_str("\r\n");
    if let Some(payload) = body {
        req.push_str(payload);
    }
    stream
        .write_all(req.as_bytes())
        .await
        .expect("write request");
    let mut response = String::new();
    stream
        .read_to_string(&mut response)
        .await
        .expect("read response");
    let (head, body) = response
        .split_once("\r\n\r\n")
        .expect("http response must have separator");
    let status = head
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .and_then(|s| s.parse::<u16>().ok())
        .expect("http status");
    (status, head.to_string(), body.to_string())
}

pub fn header<'a>(head: &'a str, name: &str) -> Option<&'a str> {
    head.lines().skip(1).find_map(|line| {
        let (k, v) = line.split_once(':')?;
        k.trim().eq_ignore_ascii_case(name).then(|| v.trim())
    })
}

pub fn json(body: &str) -> serde_json::Value {
    serde_json::from_str(body).expect("json body")
}

pub async fn wait_until(mut check: impl FnMut() -> bool) {
    for _ in 0..100 {
        if check() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("condition not reached within 2s");
}
