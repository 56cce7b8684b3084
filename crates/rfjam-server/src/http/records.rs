// SPDX-License-Identifier: Apache-2.0

use super::payload::{decode_payload, read_body};
use super::response_contract::{api_error_response, store_error};
use crate::telemetry::METRICS_CONTENT_TYPE;
use crate::RecordState;
use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use rfjam_api::{AddRecordResponse, ApiError};
use rfjam_model::{parse_new_record, PredictionRecord, FEATURE_COLUMNS};
use rfjam_store::{RecordStore, StoreError};
use std::fmt::Write as _;
use std::sync::Arc;
use tracing::{error, info, warn, Instrument};

pub(crate) const RECORDS_PAGE_TITLE: &str = "Stored RF Predictions";
const TABLE_CSS: &str = "body{font-family:Segoe UI,Roboto,Arial;margin:20px}\
table{border-collapse:collapse;width:100%}\
th,td{border:1px solid #ddd;padding:8px;font-size:14px}\
th{background:#f5f5f5;text-align:left}\
tr:nth-child(even){background:#fafafa}";

/// Runs a store call on the blocking pool.
async fn with_store<T, F>(store: &Arc<dyn RecordStore>, f: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&dyn RecordStore) -> Result<T, StoreError> + Send + 'static,
{
    let store = Arc::clone(store);
    match tokio::task::spawn_blocking(move || f(store.as_ref())).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => {
            error!(error = %err, "record store call failed");
            Err(store_error(&err))
        }
        Err(join) => Err(ApiError::internal(format!("store task failed: {join}"))),
    }
}

pub(crate) async fn add_record_handler(
    State(state): State<RecordState>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let record = match read_body(body)
        .and_then(|body| decode_payload(&headers, &body))
        .and_then(|payload| parse_new_record(&payload).map_err(|e| ApiError::from_validation(&e)))
    {
        Ok(record) => record,
        Err(err) => {
            info!(code = err.code.as_str(), details = %err.details, "record rejected");
            return api_error_response(err);
        }
    };

    let to_insert = record.clone();
    let id = match with_store(&state.store, move |store| store.insert(&to_insert)).await {
        Ok(id) => id,
        Err(err) => return api_error_response(err),
    };
    info!(record_id = id, prediction = %record.prediction, "record stored");

    let tracker = Arc::clone(&state.tracker);
    let telemetry = Arc::clone(&state.telemetry);
    tokio::spawn(
        async move {
            if let Err(err) = tracker.record_prediction(id, &record).await {
                telemetry.record_tracking_failure();
                warn!(record_id = id, tracker = %tracker.describe(), error = %err, "tracking run failed");
            }
        }
        .in_current_span(),
    );

    (StatusCode::CREATED, Json(AddRecordResponse::added(id))).into_response()
}

pub(crate) async fn get_records_handler(State(state): State<RecordState>) -> Response {
    match with_store(&state.store, |store| store.list()).await {
        Ok(records) => Json(records).into_response(),
        Err(err) => api_error_response(err),
    }
}

pub(crate) async fn records_page_handler(State(state): State<RecordState>) -> Response {
    match with_store(&state.store, |store| store.list()).await {
        Ok(records) => Html(render_records_page(&records)).into_response(),
        Err(err) => api_error_response(err),
    }
}

pub(crate) async fn metrics_handler(State(state): State<RecordState>) -> impl IntoResponse {
    let stored = with_store(&state.store, |store| store.count()).await.ok();
    let gauges: Vec<(&str, &str, f64)> = stored
        .map(|n| vec![("rfjam_records_stored", "Records currently stored.", n as f64)])
        .unwrap_or_default();
    let body = state.telemetry.render(&gauges).await;
    ([(CONTENT_TYPE, METRICS_CONTENT_TYPE)], body)
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Whole numbers keep a trailing `.0` so feature cells read as floats.
fn format_cell(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e16 {
        format!("{value:.1}")
    } else {
        value.to_string()
    }
}

pub(crate) fn render_records_page(records: &[PredictionRecord]) -> String {
    let mut html = String::new();
    html.push_str("<!doctype html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str(
        "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n",
    );
    let _ = writeln!(html, "<title>{RECORDS_PAGE_TITLE}</title>");
    let _ = writeln!(html, "<style>{TABLE_CSS}</style>");
    html.push_str("</head>\n<body>\n");
    let _ = writeln!(html, "<h2>{RECORDS_PAGE_TITLE}</h2>");
    html.push_str("<table>\n<thead><tr><th>ID</th>");
    for column in FEATURE_COLUMNS {
        let _ = write!(html, "<th>{}</th>", escape_html(column));
    }
    html.push_str("<th>Prediction</th></tr></thead>\n<tbody>\n");
    for record in records {
        let _ = write!(html, "<tr><td>{}</td>", record.id);
        for value in record.features.to_array() {
            let _ = write!(html, "<td>{}</td>", format_cell(value));
        }
        let _ = writeln!(
            html,
            "<td>{}</td></tr>",
            escape_html(&record.prediction)
        );
    }
    html.push_str("</tbody>\n</table>\n</body>\n</html>\n");
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use rfjam_model::{FeatureVector, NewRecord};

    #[test]
    fn page_escapes_cell_text() {
        let records = vec![NewRecord::new(
            FeatureVector::from_array([0.0, 10.0, 5.0, -70.0, 0.9, 2.0]),
            "<b>jam</b> & \"co\"",
        )
        .with_id(1)];
        let html = render_records_page(&records);
        assert!(html.contains("<title>Stored RF Predictions</title>"));
        assert!(html.contains("<th>Relative_Speed</th><th>Prediction</th>"));
        assert!(html.contains("<td>1</td><td>0.0</td><td>10.0</td><td>5.0</td><td>-70.0</td><td>0.9</td><td>2.0</td>"));
        assert!(html.contains("&lt;b&gt;jam&lt;/b&gt; &amp; &quot;co&quot;"));
        assert!(!html.contains("<b>jam</b>"));
        assert!(html.contains("<meta name=\"viewport\""));
        assert!(html.contains("border-collapse:collapse"));
    }

    #[test]
    fn whole_number_cells_keep_a_decimal_point() {
        assert_eq!(format_cell(0.0), "0.0");
        assert_eq!(format_cell(-70.0), "-70.0");
        assert_eq!(format_cell(0.25), "0.25");
        assert_eq!(format_cell(1e20), "100000000000000000000");
    }

    #[test]
    fn empty_page_still_has_header_row() {
        let html = render_records_page(&[]);
        assert!(html.contains("<th>ID</th>"));
        assert!(!html.contains("<td>"));
    }
}
