// SPDX-License-Identifier: Apache-2.0

use crate::StoreError;
use std::path::PathBuf;

pub const DEFAULT_DATABASE_URL: &str = "sqlite:///rf_predictions.db";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseUrl {
    Memory,
    File(PathBuf),
}

impl DatabaseUrl {
    /// Accepts `sqlite:///relative.db`, `sqlite:////abs/path.db`,
    /// `sqlite::memory:`, `sqlite://` (memory) or a bare filesystem path.
    pub fn parse(raw: &str) -> Result<Self, StoreError> {
        let s = raw.trim();
        if s.is_empty() {
            return Err(StoreError::config("database url must not be empty"));
        }
        if s == "sqlite::memory:" || s == "sqlite://" || s == ":memory:" {
            return Ok(Self::Memory);
        }
        if let Some(rest) = s.strip_prefix("sqlite:///") {
            if rest.is_empty() {
                return Err(StoreError::config(format!(
                    "database url `{s}` has no file path"
                )));
            }
            return Ok(Self::File(PathBuf::from(rest)));
        }
        if let Some((scheme, _)) = s.split_once("://") {
            return Err(StoreError::config(format!(
                "unsupported database scheme `{scheme}` (only sqlite is supported)"
            )));
        }
        Ok(Self::File(PathBuf::from(s)))
    }

    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Memory => "sqlite::memory:".to_string(),
            Self::File(path) => format!("sqlite:///{}", path.display()),
        }
    }
}
