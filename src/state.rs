//! Persisted run state: three append-only history sequences.
//!
//! Only the last element of each sequence is current; earlier elements are
//! rewind history. A rewind pops one element from each sequence, which is the
//! exact inverse of the append performed at the end of a successful run.

use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum StateError {
    #[error("failed to read state file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write state file {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("state file {path} is malformed")]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("no previous state to rewind to")]
    NoHistory,
}

/// The persisted record. Invariant: `last_post_ids` and `offsets` always hold
/// one more element than `tags`, because the seed record carries a starting
/// watermark and offset but no retired tag yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateRecord {
    /// Retired theme tags, oldest first.
    pub tags: Vec<String>,
    /// Watermark history; the last element is current.
    pub last_post_ids: Vec<u64>,
    /// Pagination offset history; the last element is current.
    pub offsets: Vec<u64>,
}

impl StateRecord {
    /// Fresh record for a first run against a conversation.
    #[must_use]
    pub fn seed(last_post_id: u64, offset: u64) -> Self {
        Self {
            tags: Vec::new(),
            last_post_ids: vec![last_post_id],
            offsets: vec![offset],
        }
    }

    /// Current watermark.
    #[must_use]
    pub fn last_post_id(&self) -> u64 {
        self.last_post_ids.last().copied().unwrap_or(0)
    }

    /// Current pagination offset.
    #[must_use]
    pub fn offset(&self) -> u64 {
        self.offsets.last().copied().unwrap_or(0)
    }

    /// Tags retired by previous runs.
    #[must_use]
    pub fn retired_tags(&self) -> &[String] {
        &self.tags
    }

    /// Record the outcome of a successful run: the adopted tag is retired and
    /// the new watermark and offset become current.
    pub fn append(&mut self, tag: String, last_post_id: u64, offset: u64) {
        self.tags.push(tag);
        self.last_post_ids.push(last_post_id);
        self.offsets.push(offset);
    }

    /// Return the record as it was before the most recent run.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::NoHistory`] when no run has completed yet.
    pub fn rewound(mut self) -> Result<Self, StateError> {
        if self.tags.is_empty() || self.last_post_ids.len() < 2 || self.offsets.len() < 2 {
            return Err(StateError::NoHistory);
        }
        self.tags.pop();
        self.last_post_ids.pop();
        self.offsets.pop();
        Ok(self)
    }
}

/// Load/save gateway for the state file.
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the record, or fall back to `seed` when no state file exists yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or decoded.
    pub async fn load_or_seed(&self, seed: StateRecord) -> Result<StateRecord, StateError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| StateError::Decode {
                path: self.path.clone(),
                source: e,
            }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                warn!(path = %self.path.display(), "State file missing, starting from seed");
                Ok(seed)
            }
            Err(e) => Err(StateError::Read {
                path: self.path.clone(),
                source: e,
            }),
        }
    }

    /// Persist the record, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub async fn save(&self, record: &StateRecord) -> Result<(), StateError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StateError::Write {
                    path: self.path.clone(),
                    source: e,
                })?;
        }

        let bytes = serde_json::to_vec_pretty(record).map_err(|e| StateError::Decode {
            path: self.path.clone(),
            source: e,
        })?;

        tokio::fs::write(&self.path, bytes)
            .await
            .map_err(|e| StateError::Write {
                path: self.path.clone(),
                source: e,
            })?;

        info!(path = %self.path.display(), runs = record.tags.len(), "State saved");
        Ok(())
    }
}
