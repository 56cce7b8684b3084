// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

use rfjam_model::{NewRecord, PredictionRecord};
use std::fmt::{Display, Formatter};

mod database_url;
mod sqlite;

pub use database_url::{DatabaseUrl, DEFAULT_DATABASE_URL};
pub use sqlite::{SqliteRecordStore, RECORD_TABLE, SQLITE_SCHEMA_VERSION};

pub const CRATE_NAME: &str = "rfjam-store";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum StoreErrorKind {
    Config,
    Constraint,
    Unavailable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreError {
    pub kind: StoreErrorKind,
    pub message: String,
}

impl StoreError {
    #[must_use]
    pub fn new(kind: StoreErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(StoreErrorKind::Config, message)
    }

    #[must_use]
    pub fn constraint(message: impl Into<String>) -> Self {
        Self::new(StoreErrorKind::Constraint, message)
    }

    #[must_use]
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(StoreErrorKind::Unavailable, message)
    }

    #[must_use]
    pub fn is_constraint(&self) -> bool {
        self.kind == StoreErrorKind::Constraint
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let kind = match self.kind {
            StoreErrorKind::Config => "store config",
            StoreErrorKind::Constraint => "store constraint",
            StoreErrorKind::Unavailable => "store unavailable",
        };
        write!(f, "{kind}: {}", self.message)
    }
}

impl std::error::Error for StoreError {}

/// Append-only record store. Each insert is a single committed statement.
pub trait RecordStore: Send + Sync + 'static {
    fn insert(&self, record: &NewRecord) -> Result<i64, StoreError>;
    /// All records in id order.
    fn list(&self) -> Result<Vec<PredictionRecord>, StoreError>;
    fn count(&self) -> Result<u64, StoreError>;
}
