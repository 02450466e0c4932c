use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::profiles::{default_profiles_path, ProfilesError, Role};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum HistoryOutcome {
    Succeeded,
    Failed,
}

/// One submitted statement and what became of it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HistoryRecord {
    pub timestamp_unix_ms: u128,
    pub database: String,
    pub role: Role,
    pub sql: String,
    pub outcome: HistoryOutcome,
    pub rows_affected: Option<u64>,
    pub error: Option<String>,
}

#[must_use]
pub fn unix_timestamp_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis()
}

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("failed to resolve default config path: {0}")]
    Config(#[from] ProfilesError),
    #[error("invalid history path `{0}`")]
    InvalidPath(PathBuf),
    #[error("failed to create history directory at {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize history record: {source}")]
    Serialize {
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to append history record at {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Append-only ndjson log of submitted statements, one record per line.
#[derive(Debug, Clone)]
pub struct QueryHistory {
    path: PathBuf,
}

impl QueryHistory {
    pub fn load_default() -> Result<Self, HistoryError> {
        Ok(Self {
            path: default_history_path()?,
        })
    }

    #[must_use]
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, record: &HistoryRecord) -> Result<(), HistoryError> {
        let parent_dir = self
            .path
            .parent()
            .ok_or_else(|| HistoryError::InvalidPath(self.path.clone()))?;
        fs::create_dir_all(parent_dir).map_err(|source| HistoryError::CreateDir {
            path: parent_dir.to_path_buf(),
            source,
        })?;

        let rendered =
            serde_json::to_string(record).map_err(|source| HistoryError::Serialize { source })?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| HistoryError::Write {
                path: self.path.clone(),
                source,
            })?;
        writeln!(file, "{rendered}").map_err(|source| HistoryError::Write {
            path: self.path.clone(),
            source,
        })
    }
}

fn default_history_path() -> Result<PathBuf, HistoryError> {
    let profiles_path = default_profiles_path()?;
    let Some(config_dir) = profiles_path.parent() else {
        return Err(HistoryError::InvalidPath(profiles_path));
    };
    Ok(config_dir.join("history.ndjson"))
}
