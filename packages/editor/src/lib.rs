//! # Quire Editor
//!
//! Document-sync core of the chapter editor.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ model: Block list, Document Tree, Schema    │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: chapter editing                     │
//! │  - blocks ↔ tree conversion, change sets    │
//! │  - transactions with position mapping       │
//! │  - plugin pipeline (ids, quotes, search,    │
//! │    typewriter scrolling)                    │
//! │  - caret navigation, clipboard              │
//! │  - CRDT replica (optional)                  │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ collab: sessions, offline store, transport, │
//! │         debounced persistence               │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Blocks are the durable format**: the tree and the replica are
//!    rebuilt from them
//! 2. **Corrupt blocks never block a chapter**: they degrade to empty
//!    narration, logged
//! 3. **Every transaction runs the whole pipeline**: plugins never see a
//!    half-applied edit
//! 4. **Ids are unique after every edit**: identity assignment repairs
//!    splits and pastes
//!
//! ## Usage
//!
//! ### Single-user editing
//!
//! ```rust,ignore
//! use quire_editor::{Editor, EditorInput, EditorOptions};
//! use quire_model::{RandomIds, Schema};
//! use std::sync::Arc;
//!
//! let mut editor = Editor::from_blocks(
//!     &blocks,
//!     &Schema::novel(),
//!     EditorOptions::default(),
//!     Arc::new(RandomIds),
//! )?;
//! editor.handle_input(&EditorInput::Text("\"".into()))?;
//!
//! let changes = quire_editor::get_blocks_change(&blocks, &editor.to_blocks());
//! ```
//!
//! ### Collaborative editing
//!
//! ```rust,ignore
//! use quire_editor::ReplicaDocument;
//!
//! // Requires the "collaboration" feature
//! let mut replica = ReplicaDocument::seeded(client_id, editor.doc())?;
//! if let Some(update) = replica.sync_from(editor.doc()) {
//!     // send `update` to peers
//! }
//! ```

pub mod caret;
pub mod clipboard;
pub mod converter;
pub mod differ;
mod editor;
mod errors;
mod pipeline;
pub mod plugins;
pub mod search;
mod state;
mod transaction;
pub mod transform;

#[cfg(feature = "collaboration")]
mod crdt;

pub use caret::{CaretTarget, Direction, MonospaceMeasure, TextMeasure};
pub use clipboard::{copy_range, parse_plain_text, paste_text, transform_copied};
pub use converter::{blocks_to_doc, doc_to_blocks, doc_to_blocks_with, ConvertError};
pub use differ::{get_blocks_change, get_delta_blocks};
pub use editor::{DocListener, Editor, EditorOptions, StateListener};
pub use errors::EditorError;
pub use pipeline::{DispatchOutcome, PluginPipeline};
pub use plugins::highlight::{Decoration, DecorationSet, HighlightEngine, Match};
pub use plugins::scroll_follow::TypewriterOptions;
pub use plugins::{EditorInput, Key, SideEffect};
pub use search::{find_matches, matches_from_hits, SearchHit, SearchOptions};
pub use state::{EditorState, Selection};
pub use transaction::{HighlightMeta, Origin, Transaction};
pub use transform::{Mapping, Step, StepError, StepMap};

#[cfg(feature = "collaboration")]
pub use crdt::{ReplicaDocument, ReplicaError, SEED_CLIENT_ID};
