// SPDX-License-Identifier: Apache-2.0

use serde::de::DeserializeOwned;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

#[derive(Debug)]
#[non_exhaustive]
pub enum ArtifactError {
    Missing { path: PathBuf },
    Read { path: PathBuf, source: std::io::Error },
    Decode { path: PathBuf, source: serde_json::Error },
    Invalid { path: PathBuf, reason: String },
}

impl ArtifactError {
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Missing { path }
            | Self::Read { path, .. }
            | Self::Decode { path, .. }
            | Self::Invalid { path, .. } => path,
        }
    }
}

impl Display for ArtifactError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Missing { path } => write!(f, "artifact not found: {}", path.display()),
            Self::Read { path, source } => {
                write!(f, "artifact read failed for {}: {source}", path.display())
            }
            Self::Decode { path, source } => {
                write!(f, "artifact decode failed for {}: {source}", path.display())
            }
            Self::Invalid { path, reason } => {
                write!(f, "artifact {} is invalid: {reason}", path.display())
            }
        }
    }
}

impl std::error::Error for ArtifactError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Read { source, .. } => Some(source),
            Self::Decode { source, .. } => Some(source),
            Self::Missing { .. } | Self::Invalid { .. } => None,
        }
    }
}

pub fn load_json_artifact<T: DeserializeOwned>(path: &Path) -> Result<T, ArtifactError> {
    let bytes = std::fs::read(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            ArtifactError::Missing {
                path: path.to_path_buf(),
            }
        } else {
            ArtifactError::Read {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;
    serde_json::from_slice(&bytes).map_err(|source| ArtifactError::Decode {
        path: path.to_path_buf(),
        source,
    })
}
