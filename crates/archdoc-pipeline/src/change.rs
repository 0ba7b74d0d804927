//! Change detection against the persisted checksum ledger
//!
//! The ledger maps `level code → entity id → record`. It is loaded once
//! per run, updated by the single writer after rendering, and written
//! back atomically (temp file in the same directory, then rename).

use std::collections::BTreeMap;
use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::debug;

use archdoc_model::Level;

/// One ledger entry for a rendered entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeRecord {
    /// Checksum of the canonical source entity at last render
    pub checksum: String,
    /// When the source entity last changed
    pub last_updated: DateTime<Utc>,
    /// When the page was last generated
    pub generated_at: DateTime<Utc>,
    /// Store path the page was written to
    pub output_path: String,
}

/// Ledger load/save failures
#[derive(Debug, thiserror::Error)]
pub enum ChangeStoreError {
    #[error("failed to read change store {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("change store {path} is not valid JSON: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to write change store {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to replace change store {path}: {source}")]
    Replace {
        path: PathBuf,
        source: tempfile::PersistError,
    },
}

/// Persisted checksum ledger
#[derive(Debug, Clone)]
pub struct ChangeStore {
    path: PathBuf,
    records: BTreeMap<String, BTreeMap<String, ChangeRecord>>,
}

impl ChangeStore {
    /// Load the ledger, starting empty when the file does not exist yet
    ///
    /// # Errors
    /// Returns an error when the file exists but cannot be read or parsed.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ChangeStoreError> {
        let path = path.into();
        let records = match fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str(&text).map_err(|source| ChangeStoreError::Parse {
                path: path.clone(),
                source,
            })?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(source) => {
                return Err(ChangeStoreError::Read {
                    path,
                    source,
                })
            }
        };
        Ok(Self { path, records })
    }

    /// Record for one entity, if it was rendered before
    #[inline]
    #[must_use]
    pub fn get(&self, level: Level, entity_id: &str) -> Option<&ChangeRecord> {
        self.records.get(level.code())?.get(entity_id)
    }

    /// Insert or replace one entity's record
    pub fn upsert(&mut self, level: Level, entity_id: impl Into<String>, record: ChangeRecord) {
        self.records
            .entry(level.code().to_string())
            .or_default()
            .insert(entity_id.into(), record);
    }

    /// Entity ids recorded at a level
    #[must_use]
    pub fn ids_at(&self, level: Level) -> Vec<&str> {
        self.records
            .get(level.code())
            .map(|m| m.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Write the ledger back, replacing the file atomically
    ///
    /// # Errors
    /// Returns an error when serialization, the temp write or the final
    /// rename fails.
    pub fn save(&self) -> Result<(), ChangeStoreError> {
        let json = serde_json::to_string_pretty(&self.records).map_err(|source| {
            ChangeStoreError::Parse {
                path: self.path.clone(),
                source,
            }
        })?;
        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        let mut tmp = NamedTempFile::new_in(dir).map_err(|source| ChangeStoreError::Write {
            path: self.path.clone(),
            source,
        })?;
        tmp.write_all(json.as_bytes())
            .map_err(|source| ChangeStoreError::Write {
                path: self.path.clone(),
                source,
            })?;
        tmp.persist(&self.path)
            .map_err(|source| ChangeStoreError::Replace {
                path: self.path.clone(),
                source,
            })?;
        debug!(path = %self.path.display(), "change store saved");
        Ok(())
    }
}

/// Disjoint partition of a level's entities by change status
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ChangeSet {
    /// Never rendered before
    pub new: Vec<String>,
    /// Checksum differs from the recorded one
    pub modified: Vec<String>,
    /// Checksum matches; rendering is skipped
    pub unchanged: Vec<String>,
}

impl ChangeSet {
    /// Ids that need rendering this run
    #[must_use]
    pub fn to_render(&self) -> Vec<&str> {
        self.new
            .iter()
            .chain(self.modified.iter())
            .map(String::as_str)
            .collect()
    }
}

/// Partitions entities by comparing checksums against the ledger
#[derive(Debug, Clone, Copy, Default)]
pub struct ChangeDetector;

impl ChangeDetector {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Partition `(entity id, checksum)` pairs for one level
    #[must_use]
    pub fn detect(
        &self,
        store: &ChangeStore,
        level: Level,
        checksums: &[(String, String)],
    ) -> ChangeSet {
        let mut set = ChangeSet::default();
        for (id, checksum) in checksums {
            match store.get(level, id) {
                None => set.new.push(id.clone()),
                Some(record) if record.checksum != *checksum => set.modified.push(id.clone()),
                Some(_) => set.unchanged.push(id.clone()),
            }
        }
        debug!(
            level = %level,
            new = set.new.len(),
            modified = set.modified.len(),
            unchanged = set.unchanged.len(),
            "change detection complete"
        );
        set
    }
}
