//! The chapter currently on screen, and switching between chapters.
//!
//! A pane owns at most one [`ChapterSession`]. Opening another chapter
//! closes the previous one first. Subscribers see one event stream across
//! switches, filtered to the current chapter: events still draining from a
//! closed chapter are dropped.

use crate::config::SessionConfig;
use crate::error::{CollabError, TeardownReport};
use crate::events::SessionEvent;
use crate::session::{ChapterSession, SessionDeps};
use quire_model::Block;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, watch};
use tracing::{debug, warn};

const EVENT_CAPACITY: usize = 256;

pub struct ChapterPane {
    deps: SessionDeps,
    config: SessionConfig,
    session: Option<ChapterSession>,
    current: watch::Sender<Option<String>>,
    events: broadcast::Sender<SessionEvent>,
}

impl ChapterPane {
    pub fn new(deps: SessionDeps, config: SessionConfig) -> Self {
        let (current, _) = watch::channel(None);
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            deps,
            config,
            session: None,
            current,
            events,
        }
    }

    pub fn session(&self) -> Option<&ChapterSession> {
        self.session.as_ref()
    }

    pub fn current_chapter(&self) -> Option<String> {
        self.current.borrow().clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Show a chapter. Returns the previous chapter's teardown report.
    pub async fn open(
        &mut self,
        chapter_id: impl Into<String>,
        blocks: Vec<Block>,
    ) -> Result<Option<TeardownReport>, CollabError> {
        let previous = self.close().await?;

        let session =
            ChapterSession::open(chapter_id, blocks, self.deps.clone(), self.config).await?;
        self.current
            .send_replace(Some(session.chapter_id().to_string()));
        tokio::spawn(forward(
            session.subscribe(),
            self.current.subscribe(),
            self.events.clone(),
        ));
        self.session = Some(session);
        Ok(previous)
    }

    /// Close the current chapter, if any.
    pub async fn close(&mut self) -> Result<Option<TeardownReport>, CollabError> {
        self.current.send_replace(None);
        let Some(session) = self.session.take() else {
            return Ok(None);
        };
        session.close().await.map(Some)
    }
}

async fn forward(
    mut source: broadcast::Receiver<SessionEvent>,
    current: watch::Receiver<Option<String>>,
    sink: broadcast::Sender<SessionEvent>,
) {
    loop {
        match source.recv().await {
            Ok(event) => {
                let live = current.borrow().as_deref() == Some(event.chapter_id());
                if !live {
                    debug!(chapter = %event.chapter_id(), "dropping event from a closed chapter");
                    continue;
                }
                let _ = sink.send(event);
            }
            Err(RecvError::Lagged(skipped)) => {
                warn!(skipped, "pane fell behind session events");
            }
            Err(RecvError::Closed) => break,
        }
    }
}
