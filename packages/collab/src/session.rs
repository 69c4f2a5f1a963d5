//! # Chapter Session
//!
//! One open chapter: an [`Editor`], its CRDT replica, the offline log, the
//! sync transport and the debounced persistence path, all owned by a single
//! actor task.
//!
//! ## Flow
//!
//! ```text
//! ChapterSession ──Command──▶ ┌──────────────── actor ────────────────┐
//!   (handle)                   │ Editor ──sync_from──▶ ReplicaDocument  │
//!                              │   ▲                      │   ▲        │
//!                              │   └── replace_document ◀─┘   │        │
//!                              │                          append  apply │
//!                              │                            ▼     │     │
//!                              │                     OfflineStore  SyncTransport
//!                              │ debounce ─▶ get_blocks_change ─▶ PersistenceService
//!                              └────────────────────────────────────────┘
//! ```
//!
//! Everything that touches the editor runs on the actor, one command at a
//! time. Connecting and saving run as spawned tasks whose results come back
//! through the actor's queue tagged with the chapter id; a result for any
//! other chapter is dropped.

use crate::config::SessionConfig;
use crate::error::{CollabError, TeardownReport};
use crate::events::{Connectivity, SessionEvent, SyncState};
use crate::persistence::{save_in_chunks, PersistenceService};
use crate::store::{OfflineSnapshot, OfflineStore};
use crate::transport::{SyncChannel, SyncMessage, SyncTransport};
use quire_editor::{
    doc_to_blocks, get_blocks_change, DecorationSet, Editor, EditorInput, Match, ReplicaDocument,
    Selection, SideEffect,
};
use quire_model::{Block, IdGenerator, Schema};
use std::future;
use std::ops::ControlFlow;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tracing::{debug, info, warn};

const COMMAND_CAPACITY: usize = 100;
const EVENT_CAPACITY: usize = 256;

/// Collaborators a session is built from.
#[derive(Clone)]
pub struct SessionDeps {
    pub schema: Schema,
    pub ids: Arc<dyn IdGenerator>,
    pub store: Arc<dyn OfflineStore>,
    pub transport: Arc<dyn SyncTransport>,
    pub persistence: Arc<dyn PersistenceService>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplicaState {
    /// Built from the offline cache or the given blocks; no peer seen yet.
    HydratedOffline,
    /// At least one remote update has been merged.
    Synchronized,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionStatus {
    pub replica: ReplicaState,
    pub sync: SyncState,
    pub connectivity: Connectivity,
    pub version: u64,
    /// Block index and offset of the caret, when it sits in a textblock.
    pub caret: Option<(usize, usize)>,
}

enum Command {
    Input {
        input: EditorInput,
        reply: oneshot::Sender<Result<Vec<SideEffect>, CollabError>>,
    },
    Select {
        selection: Selection,
        reply: oneshot::Sender<Result<(), CollabError>>,
    },
    Search {
        query: String,
        reply: oneshot::Sender<Result<usize, CollabError>>,
    },
    Highlight {
        matches: Vec<Match>,
        current: usize,
        reply: oneshot::Sender<Result<(), CollabError>>,
    },
    Blocks {
        reply: oneshot::Sender<Vec<Block>>,
    },
    Highlights {
        reply: oneshot::Sender<DecorationSet>,
    },
    Status {
        reply: oneshot::Sender<SessionStatus>,
    },
    Flush {
        reply: oneshot::Sender<Result<(), CollabError>>,
    },
    Close {
        reply: oneshot::Sender<TeardownReport>,
    },
}

struct Envelope {
    chapter_id: String,
    command: Command,
}

enum TaskResult {
    Connected {
        chapter_id: String,
        result: Result<SyncChannel, CollabError>,
    },
    Flushed {
        chapter_id: String,
        snapshot: Vec<Block>,
        result: Result<(), CollabError>,
    },
}

impl TaskResult {
    fn chapter_id(&self) -> &str {
        match self {
            TaskResult::Connected { chapter_id, .. } | TaskResult::Flushed { chapter_id, .. } => {
                chapter_id
            }
        }
    }
}

/// Handle on an open chapter. Cheap to clone; every clone talks to the same
/// actor.
#[derive(Debug, Clone)]
pub struct ChapterSession {
    chapter_id: String,
    commands: mpsc::Sender<Envelope>,
    events: broadcast::Sender<SessionEvent>,
}

impl std::fmt::Debug for Envelope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Envelope")
            .field("chapter_id", &self.chapter_id)
            .finish_non_exhaustive()
    }
}

impl ChapterSession {
    /// Open a chapter from its persisted blocks.
    ///
    /// The replica comes from the offline cache when the cache is at least
    /// as new as the newest block; otherwise the cache is dropped and the
    /// replica is seeded from `blocks`. The transport connects in the
    /// background, and editing works before (or without) it.
    pub async fn open(
        chapter_id: impl Into<String>,
        blocks: Vec<Block>,
        deps: SessionDeps,
        config: SessionConfig,
    ) -> Result<Self, CollabError> {
        let chapter_id = chapter_id.into();
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        let (mut editor, replica) = hydrate(&chapter_id, &blocks, &deps, &config).await?;
        attach_listeners(&mut editor, &chapter_id, &events);

        let (commands, command_rx) = mpsc::channel(COMMAND_CAPACITY);
        let (task_tx, task_rx) = mpsc::channel(COMMAND_CAPACITY);

        let connect_task = {
            let transport = Arc::clone(&deps.transport);
            let tx = task_tx.clone();
            let chapter_id = chapter_id.clone();
            tokio::spawn(async move {
                let result = transport.connect(&chapter_id).await;
                let _ = tx.send(TaskResult::Connected { chapter_id, result }).await;
            })
        };

        let mut actor = SessionActor {
            chapter_id: chapter_id.clone(),
            config,
            editor,
            replica,
            replica_state: ReplicaState::HydratedOffline,
            store: deps.store,
            transport: deps.transport,
            persistence: deps.persistence,
            events: events.clone(),
            commands: command_rx,
            tasks: task_rx,
            task_tx,
            connect_task: Some(connect_task),
            remote: None,
            persisted: blocks,
            deadline: None,
            flushing: false,
            flush_again: false,
            sync_state: SyncState::Synced,
            connectivity: Connectivity::Connecting,
        };
        // Cached edits or id repairs the service hasn't seen yet
        if !get_blocks_change(&actor.persisted, &actor.editor.to_blocks()).is_empty() {
            actor.arm_debounce();
        }
        tokio::spawn(actor.run());

        info!(chapter = %chapter_id, "chapter session opened");
        Ok(Self {
            chapter_id,
            commands,
            events,
        })
    }

    pub fn chapter_id(&self) -> &str {
        &self.chapter_id
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub fn is_closed(&self) -> bool {
        self.commands.is_closed()
    }

    async fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T, CollabError> {
        let (reply, response) = oneshot::channel();
        let envelope = Envelope {
            chapter_id: self.chapter_id.clone(),
            command: command(reply),
        };
        self.commands
            .send(envelope)
            .await
            .map_err(|_| CollabError::Closed(self.chapter_id.clone()))?;
        response
            .await
            .map_err(|_| CollabError::Closed(self.chapter_id.clone()))
    }

    /// Route user input through the editor. Returns the view side effects.
    pub async fn input(&self, input: EditorInput) -> Result<Vec<SideEffect>, CollabError> {
        self.request(|reply| Command::Input { input, reply })
            .await?
    }

    pub async fn set_selection(&self, selection: Selection) -> Result<(), CollabError> {
        self.request(|reply| Command::Select { selection, reply })
            .await?
    }

    /// Highlight every match of `query`. Returns the match count.
    pub async fn search(&self, query: impl Into<String>) -> Result<usize, CollabError> {
        let query = query.into();
        self.request(|reply| Command::Search { query, reply })
            .await?
    }

    pub async fn set_highlights(
        &self,
        matches: Vec<Match>,
        current: usize,
    ) -> Result<(), CollabError> {
        self.request(|reply| Command::Highlight {
            matches,
            current,
            reply,
        })
        .await?
    }

    /// Current content as a Block list.
    pub async fn blocks(&self) -> Result<Vec<Block>, CollabError> {
        self.request(|reply| Command::Blocks { reply }).await
    }

    /// Search decorations as they stand after every edit so far.
    pub async fn highlights(&self) -> Result<DecorationSet, CollabError> {
        self.request(|reply| Command::Highlights { reply }).await
    }

    pub async fn status(&self) -> Result<SessionStatus, CollabError> {
        self.request(|reply| Command::Status { reply }).await
    }

    /// Save now instead of waiting for the debounce window.
    pub async fn flush(&self) -> Result<(), CollabError> {
        self.request(|reply| Command::Flush { reply }).await?
    }

    /// Flush, then tear the session down. Later calls on any clone fail
    /// with [`CollabError::Closed`].
    pub async fn close(&self) -> Result<TeardownReport, CollabError> {
        self.request(|reply| Command::Close { reply }).await
    }
}

async fn hydrate(
    chapter_id: &str,
    blocks: &[Block],
    deps: &SessionDeps,
    config: &SessionConfig,
) -> Result<(Editor, ReplicaDocument), CollabError> {
    let snapshot = match deps.store.hydrate(chapter_id).await {
        Ok(snapshot) => snapshot,
        Err(e) => {
            warn!(chapter = %chapter_id, error = %e, "offline store unavailable, seeding from blocks");
            OfflineSnapshot::default()
        }
    };

    let newest = blocks.iter().filter_map(|block| block.updated_at).max();
    let fresh = match (snapshot.saved_at, newest) {
        (Some(saved_at), Some(newest)) => saved_at >= newest,
        (Some(_), None) => true,
        (None, _) => false,
    };

    if fresh && !snapshot.is_empty() {
        if let Some(replica) = replay(chapter_id, config.client_id, &snapshot) {
            let cached = doc_to_blocks(&replica.to_document());
            let editor = Editor::from_blocks(
                &cached,
                &deps.schema,
                config.editor,
                Arc::clone(&deps.ids),
            )?;
            let mut replica = replica;
            if let Some(update) = replica.sync_from(editor.doc()) {
                append(deps.store.as_ref(), chapter_id, &update).await;
            }
            debug!(chapter = %chapter_id, updates = snapshot.updates.len(), "hydrated from offline cache");
            return Ok((editor, replica));
        }
    }

    if !snapshot.is_empty() {
        debug!(chapter = %chapter_id, "offline cache is stale, reseeding");
        if let Err(e) = deps.store.destroy(chapter_id).await {
            warn!(chapter = %chapter_id, error = %e, "could not drop stale offline cache");
        }
    }

    let editor = Editor::from_blocks(blocks, &deps.schema, config.editor, Arc::clone(&deps.ids))?;
    let replica = ReplicaDocument::seeded(config.client_id, editor.doc())?;
    append(deps.store.as_ref(), chapter_id, &replica.encode_state()).await;
    Ok((editor, replica))
}

/// Rebuild a replica from cached updates. `None` when the cache is unusable.
fn replay(chapter_id: &str, client_id: u64, snapshot: &OfflineSnapshot) -> Option<ReplicaDocument> {
    let mut replica = ReplicaDocument::new(client_id);
    for update in &snapshot.updates {
        if let Err(e) = replica.apply_update(update) {
            warn!(chapter = %chapter_id, error = %e, "discarding corrupt offline cache");
            return None;
        }
    }
    (!replica.is_empty()).then_some(replica)
}

async fn append(store: &dyn OfflineStore, chapter_id: &str, update: &[u8]) {
    if let Err(e) = store.append(chapter_id, update).await {
        warn!(chapter = %chapter_id, error = %e, "offline append failed");
    }
}

fn attach_listeners(
    editor: &mut Editor,
    chapter_id: &str,
    events: &broadcast::Sender<SessionEvent>,
) {
    let tx = events.clone();
    let id = chapter_id.to_string();
    editor.on_state_change(Box::new(move |state| {
        let _ = tx.send(SessionEvent::StateChanged {
            chapter_id: id.clone(),
            version: state.version,
        });
    }));

    let tx = events.clone();
    let id = chapter_id.to_string();
    editor.on_doc_update(Box::new(move |doc| {
        let _ = tx.send(SessionEvent::DocUpdated {
            chapter_id: id.clone(),
            block_count: doc.blocks.len(),
        });
    }));
}

async fn next_remote(remote: &mut Option<SyncChannel>) -> Option<SyncMessage> {
    match remote {
        Some(channel) => channel.incoming.recv().await,
        None => future::pending().await,
    }
}

async fn sleep_until_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(at) => time::sleep_until(at).await,
        None => future::pending().await,
    }
}

struct SessionActor {
    chapter_id: String,
    config: SessionConfig,
    editor: Editor,
    replica: ReplicaDocument,
    replica_state: ReplicaState,
    store: Arc<dyn OfflineStore>,
    transport: Arc<dyn SyncTransport>,
    persistence: Arc<dyn PersistenceService>,
    events: broadcast::Sender<SessionEvent>,
    commands: mpsc::Receiver<Envelope>,
    tasks: mpsc::Receiver<TaskResult>,
    task_tx: mpsc::Sender<TaskResult>,
    connect_task: Option<JoinHandle<()>>,
    remote: Option<SyncChannel>,
    /// Last snapshot the persistence service acknowledged.
    persisted: Vec<Block>,
    deadline: Option<Instant>,
    flushing: bool,
    flush_again: bool,
    sync_state: SyncState,
    connectivity: Connectivity,
}

impl SessionActor {
    async fn run(mut self) {
        loop {
            let deadline = self.deadline;
            tokio::select! {
                envelope = self.commands.recv() => {
                    let Some(envelope) = envelope else {
                        // Every handle dropped without closing
                        let report = self.teardown().await;
                        if !report.is_clean() {
                            warn!(chapter = %self.chapter_id, errors = report.errors.len(), "implicit close reported errors");
                        }
                        break;
                    };
                    if self.handle(envelope).await.is_break() {
                        break;
                    }
                }
                message = next_remote(&mut self.remote) => self.on_remote(message).await,
                Some(result) = self.tasks.recv() => self.on_task(result).await,
                () = sleep_until_deadline(deadline) => self.on_debounce(),
            }
        }
    }

    fn emit(&self, event: SessionEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    fn set_sync_state(&mut self, state: SyncState) {
        if self.sync_state == state {
            return;
        }
        self.sync_state = state;
        self.emit(SessionEvent::SyncState {
            chapter_id: self.chapter_id.clone(),
            state,
        });
    }

    fn set_connectivity(&mut self, state: Connectivity) {
        if self.connectivity == state {
            return;
        }
        self.connectivity = state;
        self.emit(SessionEvent::Connectivity {
            chapter_id: self.chapter_id.clone(),
            state,
        });
    }

    async fn handle(&mut self, envelope: Envelope) -> ControlFlow<()> {
        if envelope.chapter_id != self.chapter_id {
            warn!(chapter = %self.chapter_id, stale = %envelope.chapter_id, "dropping command for another chapter");
            return ControlFlow::Continue(());
        }

        match envelope.command {
            Command::Input { input, reply } => {
                let result = self.input(&input).await;
                let _ = reply.send(result);
            }
            Command::Select { selection, reply } => {
                let result = self.editor.set_selection(selection).map_err(Into::into);
                let _ = reply.send(result);
            }
            Command::Search { query, reply } => {
                let result = self.editor.search(&query).map_err(Into::into);
                let _ = reply.send(result);
            }
            Command::Highlight {
                matches,
                current,
                reply,
            } => {
                let result = self
                    .editor
                    .set_highlights(matches, current)
                    .map_err(Into::into);
                let _ = reply.send(result);
            }
            Command::Blocks { reply } => {
                let _ = reply.send(self.editor.to_blocks());
            }
            Command::Highlights { reply } => {
                let _ = reply.send(self.editor.state().decorations.clone());
            }
            Command::Status { reply } => {
                let _ = reply.send(SessionStatus {
                    replica: self.replica_state,
                    sync: self.sync_state,
                    connectivity: self.connectivity,
                    version: self.editor.state().version,
                    caret: self.editor.state().caret(),
                });
            }
            Command::Flush { reply } => {
                let result = self.flush_now().await;
                let _ = reply.send(result);
            }
            Command::Close { reply } => {
                let report = self.teardown().await;
                let _ = reply.send(report);
                return ControlFlow::Break(());
            }
        }
        ControlFlow::Continue(())
    }

    async fn input(&mut self, input: &EditorInput) -> Result<Vec<SideEffect>, CollabError> {
        let effects = self.editor.handle_input(input)?.unwrap_or_default();
        for effect in &effects {
            self.emit(SessionEvent::Scroll {
                chapter_id: self.chapter_id.clone(),
                effect: *effect,
            });
        }
        self.publish_local().await;
        Ok(effects)
    }

    /// Push the editor's document into the replica, then out to the log and
    /// to peers.
    async fn publish_local(&mut self) {
        let Some(update) = self.replica.sync_from(self.editor.doc()) else {
            return;
        };
        append(self.store.as_ref(), &self.chapter_id, &update).await;
        self.send_remote(SyncMessage::Update(update)).await;
        self.arm_debounce();
    }

    async fn send_remote(&mut self, message: SyncMessage) {
        let Some(channel) = &self.remote else {
            return;
        };
        if channel.outgoing.send(message).await.is_err() {
            warn!(chapter = %self.chapter_id, "sync transport dropped, editing offline");
            self.remote = None;
            self.set_connectivity(Connectivity::Offline);
        }
    }

    async fn on_remote(&mut self, message: Option<SyncMessage>) {
        match message {
            None => {
                warn!(chapter = %self.chapter_id, "sync transport closed, editing offline");
                self.remote = None;
                self.set_connectivity(Connectivity::Offline);
            }
            Some(SyncMessage::StateVector(state_vector)) => {
                match self.replica.encode_delta(&state_vector) {
                    Ok(delta) => self.send_remote(SyncMessage::Update(delta)).await,
                    Err(e) => warn!(chapter = %self.chapter_id, error = %e, "bad state vector from peer"),
                }
            }
            Some(SyncMessage::Update(update)) => self.merge_remote(update).await,
        }
    }

    async fn merge_remote(&mut self, update: Vec<u8>) {
        if let Err(e) = self.replica.apply_update(&update) {
            warn!(chapter = %self.chapter_id, error = %e, "rejected remote update");
            return;
        }
        append(self.store.as_ref(), &self.chapter_id, &update).await;
        if self.replica_state != ReplicaState::Synchronized {
            debug!(chapter = %self.chapter_id, "replica synchronized");
            self.replica_state = ReplicaState::Synchronized;
        }

        let merged = self.replica.to_document();
        if merged == *self.editor.doc() {
            return;
        }
        if let Err(e) = self.editor.replace_document(merged) {
            warn!(chapter = %self.chapter_id, error = %e, "could not apply merged document");
            return;
        }
        // Identity repair may have rewritten the merged document
        self.publish_local().await;
        self.arm_debounce();
    }

    async fn on_task(&mut self, result: TaskResult) {
        if result.chapter_id() != self.chapter_id {
            warn!(chapter = %self.chapter_id, stale = %result.chapter_id(), "dropping task result for another chapter");
            return;
        }

        match result {
            TaskResult::Connected { result, .. } => {
                self.connect_task = None;
                match result {
                    Ok(channel) => {
                        self.remote = Some(channel);
                        self.set_connectivity(Connectivity::Online);
                        let state_vector = self.replica.state_vector();
                        let state = self.replica.encode_state();
                        self.send_remote(SyncMessage::StateVector(state_vector))
                            .await;
                        self.send_remote(SyncMessage::Update(state)).await;
                    }
                    Err(e) => {
                        warn!(chapter = %self.chapter_id, error = %e, "sync transport unavailable, editing offline");
                        self.set_connectivity(Connectivity::Offline);
                    }
                }
            }
            TaskResult::Flushed {
                snapshot, result, ..
            } => self.on_flushed(snapshot, result),
        }
    }

    fn arm_debounce(&mut self) {
        self.deadline = Some(Instant::now() + self.config.debounce());
        self.set_sync_state(SyncState::Waiting);
    }

    fn on_debounce(&mut self) {
        self.deadline = None;
        if self.flushing {
            self.flush_again = true;
            return;
        }
        self.start_flush();
    }

    fn start_flush(&mut self) {
        let current = self.editor.to_blocks();
        let changes = get_blocks_change(&self.persisted, &current);
        if changes.is_empty() {
            self.persisted = current;
            self.set_sync_state(SyncState::Synced);
            return;
        }

        self.emit(SessionEvent::BlocksChanged {
            chapter_id: self.chapter_id.clone(),
            blocks: current.clone(),
        });
        self.flushing = true;
        self.set_sync_state(SyncState::Syncing);
        debug!(chapter = %self.chapter_id, changes = changes.len(), "saving chapter");

        let persistence = Arc::clone(&self.persistence);
        let tx = self.task_tx.clone();
        let chapter_id = self.chapter_id.clone();
        let chunk_size = self.config.chunk_size();
        tokio::spawn(async move {
            let result =
                save_in_chunks(persistence.as_ref(), &chapter_id, &changes, chunk_size).await;
            let _ = tx
                .send(TaskResult::Flushed {
                    chapter_id,
                    snapshot: current,
                    result,
                })
                .await;
        });
    }

    fn on_flushed(&mut self, snapshot: Vec<Block>, result: Result<(), CollabError>) {
        self.flushing = false;
        match result {
            Ok(()) => {
                self.persisted = snapshot;
                if self.flush_again {
                    self.flush_again = false;
                    self.start_flush();
                } else if self.deadline.is_none() {
                    self.set_sync_state(SyncState::Synced);
                }
            }
            Err(e) => {
                warn!(chapter = %self.chapter_id, error = %e, "saving chapter failed, retrying after the next quiet period");
                self.flush_again = false;
                self.deadline = Some(Instant::now() + self.config.debounce());
                self.set_sync_state(SyncState::Error);
            }
        }
    }

    /// Save synchronously, after any in-flight save settles.
    async fn flush_now(&mut self) -> Result<(), CollabError> {
        while self.flushing {
            match self.tasks.recv().await {
                Some(result) => self.on_task(result).await,
                None => break,
            }
        }
        self.deadline = None;
        self.flush_again = false;

        let current = self.editor.to_blocks();
        let changes = get_blocks_change(&self.persisted, &current);
        if changes.is_empty() {
            self.set_sync_state(SyncState::Synced);
            return Ok(());
        }

        self.emit(SessionEvent::BlocksChanged {
            chapter_id: self.chapter_id.clone(),
            blocks: current.clone(),
        });
        self.set_sync_state(SyncState::Syncing);
        let saved = save_in_chunks(
            self.persistence.as_ref(),
            &self.chapter_id,
            &changes,
            self.config.chunk_size(),
        )
        .await;

        match saved {
            Ok(()) => {
                self.persisted = current;
                self.set_sync_state(SyncState::Synced);
                Ok(())
            }
            Err(e) => {
                self.deadline = Some(Instant::now() + self.config.debounce());
                self.set_sync_state(SyncState::Error);
                Err(e)
            }
        }
    }

    /// Final save, then every teardown step in order. A failing step is
    /// recorded and the rest still run.
    async fn teardown(&mut self) -> TeardownReport {
        let mut errors = Vec::new();

        if let Err(e) = self.flush_now().await {
            warn!(chapter = %self.chapter_id, error = %e, "final save failed");
            errors.push(e);
        }

        // Stop listening for replica updates
        self.deadline = None;
        self.remote = None;
        if let Some(task) = self.connect_task.take() {
            task.abort();
        }

        self.editor.destroy();

        if let Err(e) = self.transport.destroy(&self.chapter_id).await {
            warn!(chapter = %self.chapter_id, error = %e, "transport teardown failed");
            errors.push(e);
        }

        if let Err(e) = self.store.close(&self.chapter_id).await {
            warn!(chapter = %self.chapter_id, error = %e, "offline store close failed");
            errors.push(e);
        }

        self.set_connectivity(Connectivity::Offline);
        info!(chapter = %self.chapter_id, errors = errors.len(), "chapter session closed");
        TeardownReport {
            chapter_id: self.chapter_id.clone(),
            errors,
        }
    }
}
