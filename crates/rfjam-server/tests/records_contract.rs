mod service_support;

use rfjam_server::NoopTracker;
use rfjam_store::{DatabaseUrl, SqliteRecordStore};
use serde_json::json;
use service_support::*;
use std::sync::Arc;

fn record_payload(label: &str) -> String {
    json!({
        "Time": 0, "SNR": 10, "Speed": 5, "RSSI": -70, "PDR": 0.9, "Relative_Speed": 2,
        "prediction": label
    })
    .to_string()
}

#[tokio::test]
async fn identical_records_get_distinct_increasing_ids() {
    let (addr, _) = spawn_memory_records_service().await;
    let mut ids = Vec::new();
    for _ in 0..3 {
        let (status, _, body) = post_json(addr, "/add_record", &record_payload("1")).await;
        assert_eq!(status, 201, "{body}");
        let body = json(&body);
        assert_eq!(body["message"], "Record added");
        ids.push(body["id"].as_i64().expect("id"));
    }
    assert!(ids.windows(2).all(|w| w[1] > w[0]), "{ids:?}");

    let (status, _, body) = send_raw(addr, "/get_records", &[]).await;
    assert_eq!(status, 200);
    let records = json(&body);
    let records = records.as_array().expect("array");
    assert_eq!(records.len(), 3);
    for (record, id) in records.iter().zip(&ids) {
        assert_eq!(record["id"].as_i64(), Some(*id));
        assert_eq!(record["Speed"], 5.0);
        assert_eq!(record["prediction"], "1");
    }
}

#[tokio::test]
async fn numeric_strings_and_numeric_labels_are_coerced() {
    let (addr, _) = spawn_memory_records_service().await;
    let payload = r#"{"Time": "1.5", "SNR": " 10 ", "Speed": 5, "RSSI": -70, "PDR": 0.9,
        "Relative_Speed": 2, "prediction": 1}"#;
    let (status, _, body) = post_json(addr, "/add_record", payload).await;
    assert_eq!(status, 201, "{body}");
    let (_, _, body) = send_raw(addr, "/get_records", &[]).await;
    let records = json(&body);
    assert_eq!(records[0]["Time"], 1.5);
    assert_eq!(records[0]["SNR"], 10.0);
    assert_eq!(records[0]["prediction"], "1");
}

#[tokio::test]
async fn boolean_labels_are_stored_capitalized() {
    let (addr, _) = spawn_memory_records_service().await;
    let payload = r#"{"Time": 0, "SNR": 10, "Speed": 5, "RSSI": -70, "PDR": 0.9,
        "Relative_Speed": 2, "prediction": true}"#;
    let (status, _, body) = post_json(addr, "/add_record", payload).await;
    assert_eq!(status, 201, "{body}");
    let (_, _, body) = send_raw(addr, "/get_records", &[]).await;
    assert_eq!(json(&body)[0]["prediction"], "True");
}

#[tokio::test]
async fn oversized_record_body_is_a_json_client_error() {
    let (addr, _) = spawn_memory_records_service().await;
    let (status, _, body) =
        post_json(addr, "/add_record", &with_padding(&record_payload("1"), 20 * 1024)).await;
    assert_eq!(status, 400, "{body}");
    assert_eq!(json(&body)["error"], "Request body too large");
    let (_, _, records) = send_raw(addr, "/get_records", &[]).await;
    assert_eq!(json(&records), json!([]));
}

#[tokio::test]
async fn missing_fields_list_required_and_missing() {
    let (addr, _) = spawn_memory_records_service().await;
    let (status, _, body) = post_json(addr, "/add_record", r#"{"Time": 0, "SNR": 10}"#).await;
    assert_eq!(status, 400);
    let body = json(&body);
    assert_eq!(body["error"], "Missing required fields");
    assert_eq!(
        body["required"],
        json!(["Time", "SNR", "Speed", "RSSI", "PDR", "Relative_Speed", "prediction"])
    );
    assert_eq!(
        body["missing"],
        json!(["Speed", "RSSI", "PDR", "Relative_Speed", "prediction"])
    );
}

#[tokio::test]
async fn invalid_types_are_rejected_and_nothing_is_stored() {
    let (addr, _) = spawn_memory_records_service().await;
    let payload = r#"{"Time": 0, "SNR": "abc", "Speed": 5, "RSSI": -70, "PDR": 0.9,
        "Relative_Speed": 2, "prediction": "1"}"#;
    let (status, _, body) = post_json(addr, "/add_record", payload).await;
    assert_eq!(status, 400);
    let body = json(&body);
    assert_eq!(body["error"], "Invalid types for one or more fields");
    assert_eq!(body["details"]["field"], "SNR");

    let (_, _, body) = send_raw(addr, "/get_records", &[]).await;
    assert_eq!(json(&body), json!([]));
}

#[tokio::test]
async fn oversized_label_is_a_client_error() {
    let (addr, _) = spawn_memory_records_service().await;
    let (status, _, body) = post_json(addr, "/add_record", &record_payload(&"x".repeat(51))).await;
    assert_eq!(status, 400, "{body}");
    assert_eq!(json(&body)["code"], "store_constraint");
}

#[tokio::test]
async fn unavailable_store_is_a_server_error() {
    let (addr, _) = spawn_records_service(Arc::new(UnavailableStore), Arc::new(NoopTracker)).await;
    let (status, _, body) = post_json(addr, "/add_record", &record_payload("0")).await;
    assert_eq!(status, 500);
    assert_eq!(json(&body)["code"], "store_unavailable");
    let (status, _, _) = send_raw(addr, "/get_records", &[]).await;
    assert_eq!(status, 500);
    let (status, _, _) = send_raw(addr, "/records_page", &[]).await;
    assert_eq!(status, 500);
}

#[tokio::test]
async fn records_page_renders_an_escaped_table() {
    let (addr, _) = spawn_memory_records_service().await;
    post_json(addr, "/add_record", &record_payload("<script>x</script>")).await;
    let (status, head, body) = send_raw(addr, "/records_page", &[]).await;
    assert_eq!(status, 200);
    assert!(header(&head, "content-type").is_some_and(|v| v.starts_with("text/html")));
    assert!(body.contains("<title>Stored RF Predictions</title>"));
    assert!(body.contains("<th>ID</th><th>Time</th><th>SNR</th>"));
    assert!(body.contains("&lt;script&gt;x&lt;/script&gt;"));
    assert!(!body.contains("<script>x</script>"));
}

#[tokio::test]
async fn each_stored_record_gets_a_tracking_run() {
    let tracker = Arc::new(RecordingTracker::default());
    let (addr, _) = spawn_records_service(
        Arc::new(SqliteRecordStore::open_in_memory().expect("store")),
        tracker.clone(),
    )
    .await;
    let (status, _, body) = post_json(addr, "/add_record", &record_payload("jammed")).await;
    assert_eq!(status, 201);
    let id = json(&body)["id"].as_i64().expect("id");

    wait_until(|| tracker.runs.lock().expect("lock").len() == 1).await;
    let runs = tracker.runs.lock().expect("lock");
    assert_eq!(runs[0].0, id);
    assert_eq!(runs[0].1.prediction, "jammed");
}

#[tokio::test]
async fn tracking_failure_is_counted_but_not_surfaced() {
    let tracker = Arc::new(RecordingTracker {
        fail: true,
        ..RecordingTracker::default()
    });
    let (addr, state) = spawn_records_service(
        Arc::new(SqliteRecordStore::open_in_memory().expect("store")),
        tracker.clone(),
    )
    .await;
    let (status, _, _) = post_json(addr, "/add_record", &record_payload("1")).await;
    assert_eq!(status, 201);
    let telemetry = state.telemetry();
    wait_until(|| telemetry.tracking_failures() == 1).await;

    let (_, _, body) = send_raw(addr, "/get_records", &[]).await;
    assert_eq!(json(&body).as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn file_backed_service_keeps_records_across_restarts() {
    let dir = tempfile::tempdir().expect("tempdir");
    let url = DatabaseUrl::File(dir.path().join("rf_predictions.db"));

    let (first, _) = spawn_records_service(
        Arc::new(SqliteRecordStore::open(&url).expect("open")),
        Arc::new(NoopTracker),
    )
    .await;
    let (status, _, _) = post_json(first, "/add_record", &record_payload("0")).await;
    assert_eq!(status, 201);

    let (second, _) = spawn_records_service(
        Arc::new(SqliteRecordStore::open(&url).expect("reopen")),
        Arc::new(NoopTracker),
    )
    .await;
    let (_, _, body) = send_raw(second, "/get_records", &[]).await;
    assert_eq!(json(&body).as_array().map(Vec::len), Some(1));
}
