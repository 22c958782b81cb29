//! On-disk snapshot of the whole graph.
//!
//! A snapshot is a single pretty-printed JSON document:
//!
//! ```json
//! { "buildTimestamp": "2024-05-01T12:00:00Z", "people": [...], "media": [...] }
//! ```
//!
//! There is no version field; readers rely on the serde shape. Writes go to a
//! sibling `.tmp` file that is renamed over the target, so an interrupted
//! write leaves the previous snapshot intact.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ErrorCode;
use crate::model::{Media, Person};

/// Persisted graph state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphSnapshot {
    pub build_timestamp: DateTime<Utc>,
    #[serde(default)]
    pub people: Vec<Person>,
    #[serde(default)]
    pub media: Vec<Media>,
}

/// Why a snapshot could not be loaded or saved.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("snapshot not found: {}", .0.display())]
    Missing(PathBuf),

    #[error("failed to read snapshot {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("snapshot {path} is not valid: {source}")]
    Corrupt {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("snapshot has no {0}")]
    Empty(&'static str),

    #[error("snapshot built at {built} is older than {max_age_hours}h")]
    Stale {
        built: DateTime<Utc>,
        max_age_hours: i64,
    },

    #[error("failed to write snapshot {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to encode snapshot: {0}")]
    Encode(#[source] serde_json::Error),
}

impl CacheError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Missing(_) => ErrorCode::CacheMissing,
            Self::Io { .. } | Self::Corrupt { .. } => ErrorCode::CacheCorrupt,
            Self::Empty(_) => ErrorCode::CacheEmpty,
            Self::Stale { .. } => ErrorCode::CacheStale,
            Self::Write { .. } | Self::Encode(_) => ErrorCode::CacheWriteFailed,
        }
    }
}

impl GraphSnapshot {
    #[must_use]
    pub fn new(people: Vec<Person>, media: Vec<Media>) -> Self {
        Self {
            build_timestamp: Utc::now(),
            people,
            media,
        }
    }

    /// Check that the snapshot is usable at `now`.
    ///
    /// # Errors
    ///
    /// [`CacheError::Stale`] if it is older than `max_age`,
    /// [`CacheError::Empty`] if either collection is empty.
    pub fn validate(&self, now: DateTime<Utc>, max_age: Duration) -> Result<(), CacheError> {
        if now.signed_duration_since(self.build_timestamp) > max_age {
            return Err(CacheError::Stale {
                built: self.build_timestamp,
                max_age_hours: max_age.num_hours(),
            });
        }
        if self.people.is_empty() {
            return Err(CacheError::Empty("people"));
        }
        if self.media.is_empty() {
            return Err(CacheError::Empty("media"));
        }
        Ok(())
    }
}

/// Read a snapshot file.
///
/// # Errors
///
/// [`CacheError::Missing`] when the file does not exist, [`CacheError::Io`]
/// when it cannot be read, [`CacheError::Corrupt`] when it is empty or not a
/// snapshot.
pub fn read_snapshot(path: &Path) -> Result<GraphSnapshot, CacheError> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(CacheError::Missing(path.to_path_buf()));
        }
        Err(e) => {
            return Err(CacheError::Io {
                path: path.display().to_string(),
                source: e,
            });
        }
    };

    serde_json::from_slice(&bytes).map_err(|e| CacheError::Corrupt {
        path: path.display().to_string(),
        source: e,
    })
}

/// Write a snapshot file atomically, creating parent directories.
///
/// Returns the number of bytes written.
///
/// # Errors
///
/// [`CacheError::Encode`] or [`CacheError::Write`].
pub fn write_snapshot(path: &Path, snapshot: &GraphSnapshot) -> Result<u64, CacheError> {
    let write_err = |source: io::Error| CacheError::Write {
        path: path.display().to_string(),
        source,
    };

    let bytes = serde_json::to_vec_pretty(snapshot).map_err(CacheError::Encode)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(write_err)?;
    }

    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, &bytes).map_err(write_err)?;
    fs::rename(&tmp, path).map_err(|e| {
        let _ = fs::remove_file(&tmp);
        write_err(e)
    })?;

    Ok(bytes.len() as u64)
}
