use quire_collab::SessionConfig;
use quire_editor::{EditorOptions, SearchOptions, TypewriterOptions};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_CONFIG_NAME: &str = "quire.config.json";

/// Quire configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Quiet period before edits are saved, in milliseconds
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Maximum changes per save request
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Where offline replica logs are kept
    #[serde(default = "default_offline_dir")]
    pub offline_dir: String,

    #[serde(default)]
    pub typewriter: TypewriterOptions,

    #[serde(default)]
    pub search: SearchOptions,
}

fn default_debounce_ms() -> u64 {
    500
}

fn default_chunk_size() -> usize {
    100
}

fn default_offline_dir() -> String {
    ".quire/offline".to_string()
}

impl Config {
    /// Load config from a directory
    pub fn load(cwd: &str) -> anyhow::Result<Self> {
        let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Get absolute path to the offline store directory
    pub fn get_offline_dir(&self, cwd: &str) -> PathBuf {
        PathBuf::from(cwd).join(&self.offline_dir)
    }

    pub fn editor_options(&self) -> EditorOptions {
        EditorOptions {
            typewriter: self.typewriter,
            search: self.search,
        }
    }

    /// Settings for one chapter session, with a fresh client id
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            debounce_ms: self.debounce_ms,
            chunk_size: self.chunk_size,
            editor: self.editor_options(),
            ..SessionConfig::default()
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            chunk_size: default_chunk_size(),
            offline_dir: default_offline_dir(),
            typewriter: TypewriterOptions::default(),
            search: SearchOptions::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let json = r#"{
            "debounceMs": 250,
            "chunkSize": 20,
            "offlineDir": "cache",
            "typewriter": { "enabled": true, "strict": true },
            "search": { "caseSensitive": true }
        }"#;

        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.debounce_ms, 250);
        assert_eq!(config.chunk_size, 20);
        assert_eq!(config.offline_dir, "cache");
        assert!(config.typewriter.enabled && config.typewriter.strict);
        assert!(config.search.case_sensitive);

        let session = config.session_config();
        assert_eq!(session.debounce_ms, 250);
        assert_eq!(session.editor.typewriter, config.typewriter);
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.debounce_ms, 500);
        assert_eq!(config.chunk_size, 100);
        assert_eq!(config.offline_dir, ".quire/offline");
        assert!(!config.typewriter.enabled);
    }

    #[test]
    fn test_load_missing_and_present() {
        let dir = tempfile::tempdir().unwrap();
        let cwd = dir.path().display().to_string();
        assert_eq!(Config::load(&cwd).unwrap(), Config::default());

        std::fs::write(dir.path().join(DEFAULT_CONFIG_NAME), r#"{ "chunkSize": 5 }"#).unwrap();
        let config = Config::load(&cwd).unwrap();
        assert_eq!(config.chunk_size, 5);
        assert_eq!(config.debounce_ms, 500);
    }
}
