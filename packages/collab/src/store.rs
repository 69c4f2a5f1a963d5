//! # Offline Store
//!
//! Durable log of replica updates, keyed by chapter id. A session hydrates
//! its replica from here on open and appends every update it produces or
//! receives, so edits survive a crash between debounced saves.

use crate::error::CollabError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Cached updates for one chapter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OfflineSnapshot {
    pub updates: Vec<Vec<u8>>,
    /// When the last update was written. `None` when nothing is cached.
    pub saved_at: Option<DateTime<Utc>>,
}

impl OfflineSnapshot {
    pub fn is_empty(&self) -> bool {
        self.updates.is_empty()
    }
}

#[async_trait]
pub trait OfflineStore: Send + Sync {
    async fn hydrate(&self, chapter_id: &str) -> Result<OfflineSnapshot, CollabError>;

    async fn append(&self, chapter_id: &str, update: &[u8]) -> Result<(), CollabError>;

    /// Drop everything cached for the chapter.
    async fn destroy(&self, chapter_id: &str) -> Result<(), CollabError>;

    /// Release the chapter's handle. Cached data stays.
    async fn close(&self, chapter_id: &str) -> Result<(), CollabError>;
}

/// Process-local store, for tests and single-run tools.
#[derive(Debug, Default)]
pub struct MemoryOfflineStore {
    chapters: Mutex<HashMap<String, OfflineSnapshot>>,
}

impl MemoryOfflineStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of updates cached for a chapter.
    pub async fn len(&self, chapter_id: &str) -> usize {
        self.chapters
            .lock()
            .await
            .get(chapter_id)
            .map_or(0, |snapshot| snapshot.updates.len())
    }

    /// Replace a chapter's cache wholesale.
    pub async fn insert(&self, chapter_id: &str, snapshot: OfflineSnapshot) {
        self.chapters
            .lock()
            .await
            .insert(chapter_id.to_string(), snapshot);
    }
}

#[async_trait]
impl OfflineStore for MemoryOfflineStore {
    async fn hydrate(&self, chapter_id: &str) -> Result<OfflineSnapshot, CollabError> {
        Ok(self
            .chapters
            .lock()
            .await
            .get(chapter_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn append(&self, chapter_id: &str, update: &[u8]) -> Result<(), CollabError> {
        let mut chapters = self.chapters.lock().await;
        let snapshot = chapters.entry(chapter_id.to_string()).or_default();
        snapshot.updates.push(update.to_vec());
        snapshot.saved_at = Some(Utc::now());
        Ok(())
    }

    async fn destroy(&self, chapter_id: &str) -> Result<(), CollabError> {
        self.chapters.lock().await.remove(chapter_id);
        Ok(())
    }

    async fn close(&self, _chapter_id: &str) -> Result<(), CollabError> {
        Ok(())
    }
}

/// One append-only log file per chapter under a directory.
///
/// Records are a big-endian `u32` length followed by the update bytes. A
/// truncated trailing record (a crash mid-append) is dropped on hydrate.
#[derive(Debug, Clone)]
pub struct FileOfflineStore {
    dir: PathBuf,
}

impl FileOfflineStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `<dir>/<name>.ylog`, where `name` keeps ASCII letters, digits and `-`
    /// and escapes every other byte as `_xx`, so distinct ids never share
    /// a file.
    fn log_path(&self, chapter_id: &str) -> PathBuf {
        let mut name = String::with_capacity(chapter_id.len());
        for byte in chapter_id.bytes() {
            if byte.is_ascii_alphanumeric() || byte == b'-' {
                name.push(char::from(byte));
            } else {
                name.push_str(&format!("_{byte:02x}"));
            }
        }
        self.dir.join(format!("{}.ylog", name))
    }
}

fn decode_records(chapter_id: &str, bytes: &[u8]) -> Vec<Vec<u8>> {
    let mut updates = Vec::new();
    let mut rest = bytes;
    while rest.len() >= 4 {
        let len = u32::from_be_bytes([rest[0], rest[1], rest[2], rest[3]]) as usize;
        let Some(record) = rest.get(4..4 + len) else {
            break;
        };
        updates.push(record.to_vec());
        rest = &rest[4 + len..];
    }
    if !rest.is_empty() {
        warn!(chapter = %chapter_id, bytes = rest.len(), "dropping truncated offline record");
    }
    updates
}

#[async_trait]
impl OfflineStore for FileOfflineStore {
    async fn hydrate(&self, chapter_id: &str) -> Result<OfflineSnapshot, CollabError> {
        let path = self.log_path(chapter_id);
        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(OfflineSnapshot::default())
            }
            Err(e) => return Err(e.into()),
        };

        let updates = decode_records(chapter_id, &bytes);
        let saved_at = if updates.is_empty() {
            None
        } else {
            let modified = fs::metadata(&path).await?.modified()?;
            Some(DateTime::<Utc>::from(modified))
        };
        debug!(chapter = %chapter_id, updates = updates.len(), "hydrated offline log");
        Ok(OfflineSnapshot { updates, saved_at })
    }

    async fn append(&self, chapter_id: &str, update: &[u8]) -> Result<(), CollabError> {
        let len = u32::try_from(update.len())
            .map_err(|_| CollabError::Store(format!("update of {} bytes", update.len())))?;

        fs::create_dir_all(&self.dir).await?;
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.log_path(chapter_id))
            .await?;

        let mut record = Vec::with_capacity(4 + update.len());
        record.extend_from_slice(&len.to_be_bytes());
        record.extend_from_slice(update);
        file.write_all(&record).await?;
        file.flush().await?;
        Ok(())
    }

    async fn destroy(&self, chapter_id: &str) -> Result<(), CollabError> {
        match fs::remove_file(self.log_path(chapter_id)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn close(&self, chapter_id: &str) -> Result<(), CollabError> {
        debug!(chapter = %chapter_id, "closed offline log");
        Ok(())
    }
}
