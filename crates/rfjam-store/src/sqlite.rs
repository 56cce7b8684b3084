// SPDX-License-Identifier: Apache-2.0

use crate::database_url::DatabaseUrl;
use crate::{RecordStore, StoreError};
use rfjam_model::{FeatureVector, NewRecord, PredictionRecord, PREDICTION_MAX_LEN};
use rusqlite::{params, Connection, ErrorCode, Row};
use std::sync::Mutex;
use std::time::Duration;
use tracing::info;

pub const SQLITE_SCHEMA_VERSION: i64 = 1;
pub const RECORD_TABLE: &str = "rf_prediction";
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const SELECT_ALL_SQL: &str = "SELECT id, \"Time\", \"SNR\", \"Speed\", \"RSSI\", \"PDR\", \"Relative_Speed\", prediction
     FROM rf_prediction ORDER BY id ASC";
const INSERT_SQL: &str = "INSERT INTO rf_prediction
     (\"Time\", \"SNR\", \"Speed\", \"RSSI\", \"PDR\", \"Relative_Speed\", prediction)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)";

fn schema_sql() -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS rf_prediction (
          id INTEGER PRIMARY KEY AUTOINCREMENT,
          \"Time\" REAL NOT NULL,
          \"SNR\" REAL NOT NULL,
          \"Speed\" REAL NOT NULL,
          \"RSSI\" REAL NOT NULL,
          \"PDR\" REAL NOT NULL,
          \"Relative_Speed\" REAL NOT NULL,
          prediction TEXT NOT NULL CHECK (length(prediction) <= {PREDICTION_MAX_LEN})
        );
        PRAGMA user_version={SQLITE_SCHEMA_VERSION};"
    )
}

fn map_sqlite_error(context: &str, err: rusqlite::Error) -> StoreError {
    match &err {
        rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation => {
            StoreError::constraint(format!("{context}: {err}"))
        }
        _ => StoreError::unavailable(format!("{context}: {err}")),
    }
}

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<PredictionRecord> {
    Ok(PredictionRecord {
        id: row.get(0)?,
        features: FeatureVector::from_array([
            row.get(1)?,
            row.get(2)?,
            row.get(3)?,
            row.get(4)?,
            row.get(5)?,
            row.get(6)?,
        ]),
        prediction: row.get(7)?,
    })
}

/// SQLite-backed [`RecordStore`]. The single connection is serialized behind a mutex;
/// callers on an async runtime should invoke it from a blocking task.
pub struct SqliteRecordStore {
    conn: Mutex<Connection>,
}

impl SqliteRecordStore {
    pub fn open(url: &DatabaseUrl) -> Result<Self, StoreError> {
        let conn = match url {
            DatabaseUrl::Memory => Connection::open_in_memory(),
            DatabaseUrl::File(path) => Connection::open(path),
        }
        .map_err(|e| map_sqlite_error("open database", e))?;
        conn.busy_timeout(BUSY_TIMEOUT)
            .map_err(|e| map_sqlite_error("configure busy timeout", e))?;
        if matches!(url, DatabaseUrl::File(_)) {
            conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")
                .map_err(|e| map_sqlite_error("apply pragmas", e))?;
        }
        conn.execute_batch(&schema_sql())
            .map_err(|e| map_sqlite_error("create schema", e))?;
        info!(database = %url.describe(), "record store ready");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::open(&DatabaseUrl::Memory)
    }

    fn with_conn<T>(
        &self,
        f: impl FnOnce(&Connection) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| StoreError::unavailable("record store connection lock poisoned"))?;
        f(&conn)
    }
}

impl RecordStore for SqliteRecordStore {
    fn insert(&self, record: &NewRecord) -> Result<i64, StoreError> {
        let f = &record.features;
        self.with_conn(|conn| {
            conn.execute(
                INSERT_SQL,
                params![
                    f.time,
                    f.snr,
                    f.speed,
                    f.rssi,
                    f.pdr,
                    f.relative_speed,
                    record.prediction
                ],
            )
            .map_err(|e| map_sqlite_error("insert record", e))?;
            Ok(conn.last_insert_rowid())
        })
    }

    fn list(&self) -> Result<Vec<PredictionRecord>, StoreError> {
        self.with_conn(|conn| {
            let mut stmt = conn
                .prepare_cached(SELECT_ALL_SQL)
                .map_err(|e| map_sqlite_error("prepare list", e))?;
            let rows = stmt
                .query_map([], record_from_row)
                .map_err(|e| map_sqlite_error("list records", e))?;
            let records = rows
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| map_sqlite_error("decode record", e))?;
            Ok(records)
        })
    }

    fn count(&self) -> Result<u64, StoreError> {
        self.with_conn(|conn| {
            conn.query_row("SELECT COUNT(*) FROM rf_prediction", [], |row| {
                row.get::<_, i64>(0)
            })
            .map(|n| n.max(0) as u64)
            .map_err(|e| map_sqlite_error("count records", e))
        })
    }
}
