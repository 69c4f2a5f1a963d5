//! Persistence service seam: where debounced change sets go.

use crate::error::CollabError;
use async_trait::async_trait;
use quire_model::ChangeSetEntry;
use tokio::sync::Mutex;

#[async_trait]
pub trait PersistenceService: Send + Sync {
    /// Apply one patch of upserts and tombstones to a chapter.
    async fn save_changes(
        &self,
        chapter_id: &str,
        changes: Vec<ChangeSetEntry>,
    ) -> Result<(), CollabError>;
}

/// Sends change sets in chunks of at most `chunk_size`, stopping at the
/// first failure.
pub async fn save_in_chunks(
    service: &dyn PersistenceService,
    chapter_id: &str,
    changes: &[ChangeSetEntry],
    chunk_size: usize,
) -> Result<(), CollabError> {
    for chunk in changes.chunks(chunk_size.max(1)) {
        service.save_changes(chapter_id, chunk.to_vec()).await?;
    }
    Ok(())
}

/// Records every call. Used by tests and the CLI's dry runs.
#[derive(Debug, Default)]
pub struct MemoryPersistence {
    calls: Mutex<Vec<(String, Vec<ChangeSetEntry>)>>,
}

impl MemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn calls(&self) -> Vec<(String, Vec<ChangeSetEntry>)> {
        self.calls.lock().await.clone()
    }
}

#[async_trait]
impl PersistenceService for MemoryPersistence {
    async fn save_changes(
        &self,
        chapter_id: &str,
        changes: Vec<ChangeSetEntry>,
    ) -> Result<(), CollabError> {
        self.calls
            .lock()
            .await
            .push((chapter_id.to_string(), changes));
        Ok(())
    }
}
