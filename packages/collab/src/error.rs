//! Error types for chapter sessions

use quire_editor::{EditorError, ReplicaError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CollabError {
    #[error("Offline store error: {0}")]
    Store(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Editor error: {0}")]
    Editor(#[from] EditorError),

    #[error("Replica error: {0}")]
    Replica(#[from] ReplicaError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Session for chapter {0} is closed")]
    Closed(String),
}

/// Outcome of closing a session. Every teardown step runs; failures are
/// collected here instead of stopping the sequence.
#[derive(Debug)]
pub struct TeardownReport {
    pub chapter_id: String,
    pub errors: Vec<CollabError>,
}

impl TeardownReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}
