//! Catalog abstraction over the external media database.
//!
//! The delivery core never owns the relational store; it consumes records
//! through the [`MediaCatalog`] trait and fires the play-recorded side effect
//! back through it. [`MemoryCatalog`] backs the test harness and the demo
//! library mode of the binary.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::{MediaId, Result};

/// A catalog row for one video file. Read-only to the delivery core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaRecord {
    pub id: MediaId,
    pub file_path: PathBuf,
    /// The extension the catalog declared at scan time, lower-cased.
    pub extension: String,
    pub title: String,
    pub show_title: Option<String>,
    pub season: Option<u32>,
    pub episode: Option<u32>,
}

impl MediaRecord {
    /// Build a record from a path, deriving extension and title from the
    /// file name the way the scanner would.
    pub fn from_path(id: MediaId, path: impl Into<PathBuf>) -> Self {
        let file_path: PathBuf = path.into();
        let extension = file_path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        let title = file_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| id.to_string());
        Self {
            id,
            file_path,
            extension,
            title,
            show_title: None,
            season: None,
            episode: None,
        }
    }
}

/// Injected repository interface for the external catalog store.
#[async_trait]
pub trait MediaCatalog: Send + Sync {
    /// Look up a record by its catalog id.
    async fn find_by_id(&self, id: MediaId) -> Result<Option<MediaRecord>>;

    /// Look up a record by its absolute file path.
    async fn find_by_path(&self, path: &Path) -> Result<Option<MediaRecord>>;

    /// Record that playback of `id` started. Failures are the caller's to
    /// log; they never abort a stream.
    async fn record_play(&self, id: MediaId) -> Result<()>;
}

/// In-memory catalog used by tests and the demo library mode.
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    records: RwLock<HashMap<MediaId, MediaRecord>>,
    play_counts: RwLock<HashMap<MediaId, u64>>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a record.
    pub fn insert(&self, record: MediaRecord) {
        self.records.write().insert(record.id, record);
    }

    /// How many times playback of `id` was recorded.
    pub fn play_count(&self, id: MediaId) -> u64 {
        self.play_counts.read().get(&id).copied().unwrap_or(0)
    }

    /// Number of cataloged records.
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

#[async_trait]
impl MediaCatalog for MemoryCatalog {
    async fn find_by_id(&self, id: MediaId) -> Result<Option<MediaRecord>> {
        Ok(self.records.read().get(&id).cloned())
    }

    async fn find_by_path(&self, path: &Path) -> Result<Option<MediaRecord>> {
        Ok(self
            .records
            .read()
            .values()
            .find(|r| r.file_path == path)
            .cloned())
    }

    async fn record_play(&self, id: MediaId) -> Result<()> {
        *self.play_counts.write().entry(id).or_insert(0) += 1;
        Ok(())
    }
}
