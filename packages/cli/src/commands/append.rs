//! Append text to a chapter through a full editing session: offline log,
//! input pipeline and debounced change-set persistence back to the file.

use super::resolve_path;
use crate::config::Config;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use clap::Args;
use colored::Colorize;
use quire_collab::{
    ChapterSession, CollabError, FileOfflineStore, LocalHub, PersistenceService, SessionDeps,
};
use quire_common::blocks_io::{read_blocks, write_blocks};
use quire_editor::{blocks_to_doc, EditorInput, Selection};
use quire_model::{Block, ChangeSetEntry, RandomIds, Schema};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

#[derive(Debug, Args)]
pub struct AppendArgs {
    /// Chapter JSON file
    pub input: PathBuf,

    /// Text to paste at the end of the chapter; each line becomes a block
    pub text: String,

    /// Offline log key (defaults to the file name)
    #[arg(long)]
    pub chapter_id: Option<String>,
}

/// Applies change sets to a chapter file.
struct FilePersistence {
    path: PathBuf,
    blocks: Mutex<Vec<Block>>,
}

impl FilePersistence {
    fn new(path: &Path, blocks: Vec<Block>) -> Self {
        Self {
            path: path.to_path_buf(),
            blocks: Mutex::new(blocks),
        }
    }
}

fn apply_changes(blocks: &mut Vec<Block>, changes: Vec<ChangeSetEntry>) {
    for entry in changes {
        match entry {
            ChangeSetEntry::Deleted(tombstone) => blocks.retain(|b| b.id != tombstone.id),
            ChangeSetEntry::Upsert(block) => {
                match blocks.iter_mut().find(|b| b.id == block.id) {
                    Some(existing) => *existing = block,
                    None => blocks.push(block),
                }
            }
        }
    }
    blocks.sort_by_key(|b| b.order);
}

#[async_trait]
impl PersistenceService for FilePersistence {
    async fn save_changes(
        &self,
        chapter_id: &str,
        changes: Vec<ChangeSetEntry>,
    ) -> Result<(), CollabError> {
        let mut blocks = self.blocks.lock().await;
        debug!(chapter = %chapter_id, changes = changes.len(), "writing chapter file");
        apply_changes(&mut blocks, changes);
        write_blocks(&self.path, &blocks).map_err(|e| CollabError::Persistence(e.to_string()))
    }
}

pub fn append(args: AppendArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let path = resolve_path(cwd, &args.input);
    let chapter_id = match args.chapter_id {
        Some(id) => id,
        None => path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .ok_or_else(|| anyhow!("Cannot derive a chapter id from {}", path.display()))?,
    };

    let runtime = tokio::runtime::Runtime::new()?;
    let appended = runtime.block_on(run_session(&config, cwd, &path, chapter_id, args.text))?;

    println!(
        "  {} {} - {} blocks added or changed",
        "✓".green(),
        path.display(),
        appended
    );
    Ok(())
}

async fn run_session(
    config: &Config,
    cwd: &str,
    path: &Path,
    chapter_id: String,
    text: String,
) -> Result<usize> {
    let blocks = read_blocks(path)?;
    let schema = Schema::novel();
    let end = blocks_to_doc(&blocks, &schema)?.size().saturating_sub(1);

    // Ordered by `order` when saved, so start from the file's own order
    let numbered: Vec<Block> = blocks
        .iter()
        .cloned()
        .enumerate()
        .map(|(order, mut block)| {
            block.order = order;
            block
        })
        .collect();
    let deps = SessionDeps {
        schema,
        ids: Arc::new(RandomIds),
        store: Arc::new(FileOfflineStore::new(config.get_offline_dir(cwd))),
        transport: Arc::new(LocalHub::new().transport()),
        persistence: Arc::new(FilePersistence::new(path, numbered)),
    };

    let session = ChapterSession::open(chapter_id, blocks.clone(), deps, config.session_config()).await?;
    session.set_selection(Selection::cursor(end)).await?;
    session.input(EditorInput::Paste(text)).await?;
    let after = session.blocks().await?;

    let report = session.close().await?;
    if let Some(error) = report.errors.into_iter().next() {
        return Err(error.into());
    }
    Ok(quire_editor::get_blocks_change(&blocks, &after).len())
}
