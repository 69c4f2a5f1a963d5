//! Session-scoped settings, handed to each chapter session on open.

use quire_editor::{EditorOptions, SEED_CLIENT_ID};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionConfig {
    /// Quiet period before a snapshot is sent to the persistence service.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Maximum change-set entries per persistence call.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Replica client id. Random unless pinned.
    #[serde(default = "random_client_id")]
    pub client_id: u64,

    #[serde(default)]
    pub editor: EditorOptions,
}

fn default_debounce_ms() -> u64 {
    500
}

fn default_chunk_size() -> usize {
    100
}

/// A 32-bit client id that never collides with the seeding id.
pub fn random_client_id() -> u64 {
    let id = (Uuid::new_v4().as_u128() as u64) & 0xFFFF_FFFF;
    if id == SEED_CLIENT_ID {
        id + 1
    } else {
        id
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            chunk_size: default_chunk_size(),
            client_id: random_client_id(),
            editor: EditorOptions::default(),
        }
    }
}

impl SessionConfig {
    pub fn with_client_id(mut self, client_id: u64) -> Self {
        self.client_id = client_id;
        self
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Chunk size, never zero.
    pub fn chunk_size(&self) -> usize {
        self.chunk_size.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_json() {
        let config: SessionConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.debounce_ms, 500);
        assert_eq!(config.chunk_size, 100);
        assert_ne!(config.client_id, SEED_CLIENT_ID);
    }

    #[test]
    fn test_camel_case_keys() {
        let config: SessionConfig =
            serde_json::from_str(r#"{"debounceMs": 50, "chunkSize": 0, "clientId": 7}"#).unwrap();
        assert_eq!(config.debounce(), Duration::from_millis(50));
        assert_eq!(config.chunk_size(), 1);
        assert_eq!(config.client_id, 7);
    }
}
