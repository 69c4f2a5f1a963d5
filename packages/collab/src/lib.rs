//! # Quire Collab
//!
//! Chapter sessions: the editor bound to a CRDT replica, an offline log,
//! a sync transport and a debounced persistence path.
//!
//! ## Lifecycle
//!
//! ```text
//! open ── hydrate (offline cache if fresh, else seed from blocks)
//!   │     connect transport in the background
//!   ▼
//! edit ── local: editor → replica → offline log + peers
//!   │     remote: peers → replica → editor
//!   │     quiet for debounce_ms → change set → persistence (chunked)
//!   ▼
//! close ─ final save, detach, destroy editor, destroy transport,
//!         close offline store
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use quire_collab::{ChapterSession, LocalHub, MemoryOfflineStore, SessionConfig, SessionDeps};
//!
//! let session = ChapterSession::open("chapter-1", blocks, deps, SessionConfig::default()).await?;
//! session.input(EditorInput::Text("\"".into())).await?;
//! let report = session.close().await?;
//! ```

pub mod config;
pub mod error;
pub mod events;
pub mod pane;
pub mod persistence;
pub mod session;
pub mod store;
pub mod transport;

pub use config::{random_client_id, SessionConfig};
pub use error::{CollabError, TeardownReport};
pub use events::{Connectivity, SessionEvent, SyncState};
pub use pane::ChapterPane;
pub use persistence::{save_in_chunks, MemoryPersistence, PersistenceService};
pub use session::{ChapterSession, ReplicaState, SessionDeps, SessionStatus};
pub use store::{FileOfflineStore, MemoryOfflineStore, OfflineSnapshot, OfflineStore};
pub use transport::{HubTransport, LocalHub, SyncChannel, SyncMessage, SyncTransport};
