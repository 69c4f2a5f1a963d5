//! Session events, published over a tokio broadcast channel.

use quire_editor::SideEffect;
use quire_model::Block;
use serde::{Deserialize, Serialize};

/// Progress of the debounced persistence path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncState {
    /// Local changes are waiting for the debounce window to close.
    Waiting,
    Syncing,
    Synced,
    /// The last save failed; it is retried on the next window.
    Error,
}

/// Reachability of the sync transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Connectivity {
    Offline,
    Connecting,
    Online,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// Any committed transaction.
    StateChanged { chapter_id: String, version: u64 },
    /// A committed transaction that changed the document.
    DocUpdated { chapter_id: String, block_count: usize },
    /// Debounced snapshot of the whole chapter.
    BlocksChanged {
        chapter_id: String,
        blocks: Vec<Block>,
    },
    SyncState {
        chapter_id: String,
        state: SyncState,
    },
    Connectivity {
        chapter_id: String,
        state: Connectivity,
    },
    Scroll {
        chapter_id: String,
        effect: SideEffect,
    },
}

impl SessionEvent {
    pub fn chapter_id(&self) -> &str {
        match self {
            SessionEvent::StateChanged { chapter_id, .. }
            | SessionEvent::DocUpdated { chapter_id, .. }
            | SessionEvent::BlocksChanged { chapter_id, .. }
            | SessionEvent::SyncState { chapter_id, .. }
            | SessionEvent::Connectivity { chapter_id, .. }
            | SessionEvent::Scroll { chapter_id, .. } => chapter_id,
        }
    }
}
