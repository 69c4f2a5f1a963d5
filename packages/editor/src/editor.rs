//! # Editor
//!
//! One open chapter: the current [`EditorState`], the plugin pipeline that
//! commits transactions against it, and the synchronous listeners the UI
//! hangs off it.
//!
//! ## Lifecycle
//!
//! ```text
//! from_blocks → dispatch / handle_input … → destroy
//!                    │
//!                    ├─ on_state_change   every committed transaction
//!                    └─ on_doc_update     document-changing ones only
//! ```
//!
//! Listeners run inline, before `dispatch` returns. The debounced
//! persistence path lives in the collaboration session, not here.

use crate::caret::{self, Direction, TextMeasure};
use crate::clipboard;
use crate::converter::{blocks_to_doc, doc_to_blocks};
use crate::errors::EditorError;
use crate::pipeline::PluginPipeline;
use crate::plugins::highlight::Match;
use crate::plugins::identity::assign_ids;
use crate::plugins::scroll_follow::TypewriterOptions;
use crate::plugins::{EditorInput, SideEffect};
use crate::search::{find_matches, SearchOptions};
use crate::state::{EditorState, Selection};
use crate::transaction::{Origin, Transaction};
use quire_model::{Block, Document, IdGenerator, Schema};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// Options fixed for the lifetime of one editor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorOptions {
    #[serde(default)]
    pub typewriter: TypewriterOptions,
    #[serde(default)]
    pub search: SearchOptions,
}

pub type StateListener = Box<dyn FnMut(&EditorState) + Send>;
pub type DocListener = Box<dyn FnMut(&Document) + Send>;

pub struct Editor {
    state: EditorState,
    pipeline: PluginPipeline,
    options: EditorOptions,
    state_listeners: Vec<StateListener>,
    doc_listeners: Vec<DocListener>,
    destroyed: bool,
}

impl fmt::Debug for Editor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Editor")
            .field("version", &self.state.version)
            .field("blocks", &self.state.doc.blocks.len())
            .field("destroyed", &self.destroyed)
            .finish_non_exhaustive()
    }
}

impl Editor {
    /// Wrap an existing document.
    pub fn new(doc: Document, pipeline: PluginPipeline) -> Self {
        Self {
            state: EditorState::new(doc),
            pipeline,
            options: EditorOptions::default(),
            state_listeners: Vec::new(),
            doc_listeners: Vec::new(),
            destroyed: false,
        }
    }

    /// Open a chapter from its persisted blocks.
    ///
    /// Blocks with missing or repeated ids get fresh ones before the first
    /// transaction runs.
    pub fn from_blocks(
        blocks: &[Block],
        schema: &Schema,
        options: EditorOptions,
        ids: Arc<dyn IdGenerator>,
    ) -> Result<Self, EditorError> {
        let mut doc = blocks_to_doc(blocks, schema)?;
        let repaired = assign_ids(&mut doc, ids.as_ref());
        if repaired > 0 {
            info!(repaired, "repaired block ids on open");
        }

        let pipeline = PluginPipeline::new(ids, options.typewriter);
        let mut editor = Self::new(doc, pipeline);
        editor.options = options;
        Ok(editor)
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn doc(&self) -> &Document {
        &self.state.doc
    }

    pub fn options(&self) -> &EditorOptions {
        &self.options
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn on_state_change(&mut self, listener: StateListener) {
        self.state_listeners.push(listener);
    }

    pub fn on_doc_update(&mut self, listener: DocListener) {
        self.doc_listeners.push(listener);
    }

    fn ensure_live(&self) -> Result<(), EditorError> {
        if self.destroyed {
            Err(EditorError::Destroyed)
        } else {
            Ok(())
        }
    }

    /// Commit a transaction through the pipeline and notify listeners.
    pub fn dispatch(&mut self, tr: Transaction) -> Result<Vec<SideEffect>, EditorError> {
        self.ensure_live()?;
        let outcome = self.pipeline.dispatch(&self.state, tr);
        self.state = outcome.state;

        for listener in &mut self.state_listeners {
            listener(&self.state);
        }
        if outcome.transaction.doc_changed() {
            for listener in &mut self.doc_listeners {
                listener(&self.state.doc);
            }
        }
        Ok(outcome.effects)
    }

    /// Route input through the input handlers. `None` when no handler
    /// accepted it.
    pub fn handle_input(
        &mut self,
        input: &EditorInput,
    ) -> Result<Option<Vec<SideEffect>>, EditorError> {
        self.ensure_live()?;
        match self.pipeline.handle_input(&self.state, input)? {
            Some(tr) => self.dispatch(tr).map(Some),
            None => Ok(None),
        }
    }

    /// Replace the search highlights.
    pub fn set_highlights(
        &mut self,
        matches: Vec<Match>,
        current_index: usize,
    ) -> Result<(), EditorError> {
        let mut tr = self.state.tr();
        tr.set_highlight(matches, current_index);
        self.dispatch(tr).map(|_| ())
    }

    pub fn clear_highlights(&mut self) -> Result<(), EditorError> {
        self.set_highlights(Vec::new(), 0)
    }

    /// Search the chapter and highlight every match, the first one current.
    pub fn search(&mut self, query: &str) -> Result<usize, EditorError> {
        let matches = find_matches(&self.state.doc, query, self.options.search);
        let count = matches.len();
        debug!(query, count, "chapter search");
        self.set_highlights(matches, 0)?;
        Ok(count)
    }

    /// Swap in a document that arrived from elsewhere (a merged replica).
    pub fn replace_document(&mut self, doc: Document) -> Result<(), EditorError> {
        if doc == self.state.doc {
            return Ok(());
        }
        let mut tr = self.state.tr();
        tr.replace_document(doc)?;
        tr.set_origin(Origin::Remote);
        self.dispatch(tr).map(|_| ())
    }

    pub fn set_selection(&mut self, selection: Selection) -> Result<(), EditorError> {
        let mut tr = self.state.tr();
        tr.set_selection(selection);
        self.dispatch(tr).map(|_| ())
    }

    /// Move the caret into the neighbouring textblock. Returns `false` when
    /// there is nowhere to go.
    pub fn move_focus(
        &mut self,
        direction: Direction,
        preserve_column: bool,
        measure: &dyn TextMeasure,
    ) -> Result<bool, EditorError> {
        self.ensure_live()?;
        let Some((index, offset)) = self.state.caret() else {
            return Ok(false);
        };
        let Some(target) = caret::move_focus(
            &self.state.doc,
            index,
            offset,
            direction,
            preserve_column,
            measure,
        ) else {
            return Ok(false);
        };

        let pos = self.state.doc.content_start(target.block_index) + target.offset;
        let mut tr = self.state.tr();
        tr.set_selection(Selection::cursor(pos));
        self.dispatch(tr)?;
        Ok(true)
    }

    /// Current content as a Block list.
    pub fn to_blocks(&self) -> Vec<Block> {
        doc_to_blocks(&self.state.doc)
    }

    /// Clipboard content for `from..to`, without block ids.
    pub fn copy(&self, from: usize, to: usize) -> Document {
        clipboard::copy_range(&self.state.doc, from, to)
    }

    /// Detach every listener. Further dispatches fail.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.state_listeners.clear();
        self.doc_listeners.clear();
        self.destroyed = true;
        debug!(version = self.state.version, "editor destroyed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::caret::MonospaceMeasure;
    use crate::plugins::Key;
    use quire_model::{BlockType, SequentialIds};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn editor() -> Editor {
        let blocks = vec![
            Block::text_block("a", BlockType::Narration, "The rain fell"),
            Block::text_block("b", BlockType::Dialogue, "“Rain again”"),
        ];
        Editor::from_blocks(
            &blocks,
            &Schema::novel(),
            EditorOptions::default(),
            Arc::new(SequentialIds::new("n")),
        )
        .unwrap()
    }

    #[test]
    fn test_open_repairs_duplicate_ids() {
        let blocks = vec![
            Block::text_block("a", BlockType::Narration, "one"),
            Block::text_block("a", BlockType::Narration, "two"),
        ];
        let editor = Editor::from_blocks(
            &blocks,
            &Schema::novel(),
            EditorOptions::default(),
            Arc::new(SequentialIds::new("n")),
        )
        .unwrap();
        assert_eq!(editor.doc().ids(), vec![Some("a"), Some("n-1")]);
    }

    #[test]
    fn test_listeners_fire_synchronously() {
        let mut editor = editor();
        let states = Arc::new(AtomicUsize::new(0));
        let docs = Arc::new(AtomicUsize::new(0));
        let s = states.clone();
        let d = docs.clone();
        editor.on_state_change(Box::new(move |_| {
            s.fetch_add(1, Ordering::SeqCst);
        }));
        editor.on_doc_update(Box::new(move |_| {
            d.fetch_add(1, Ordering::SeqCst);
        }));

        editor.set_selection(Selection::cursor(3)).unwrap();
        editor.handle_input(&EditorInput::Text("x".into())).unwrap();

        assert_eq!(states.load(Ordering::SeqCst), 2);
        assert_eq!(docs.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_enter_gives_new_block_an_id() {
        let mut editor = editor();
        editor.set_selection(Selection::cursor(5)).unwrap();
        editor.handle_input(&EditorInput::Key(Key::Enter)).unwrap();

        let blocks = editor.to_blocks();
        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[1].id, "n-1");
        assert_eq!(blocks[1].text, "rain fell");
    }

    #[test]
    fn test_search_highlights_matches() {
        let mut editor = editor();
        assert_eq!(editor.search("rain").unwrap(), 2);
        let decorations = &editor.state().decorations;
        assert_eq!(decorations.len(), 2);
        assert_eq!(decorations.current().map(|d| d.from), Some(5));

        editor.clear_highlights().unwrap();
        assert!(editor.state().decorations.is_empty());
    }

    #[test]
    fn test_move_focus_keeps_column() {
        let mut editor = editor();
        editor.set_selection(Selection::cursor(5)).unwrap();
        let moved = editor
            .move_focus(Direction::Forward, true, &MonospaceMeasure::default())
            .unwrap();
        assert!(moved);
        assert_eq!(editor.state().caret(), Some((1, 4)));

        let moved = editor
            .move_focus(Direction::Forward, true, &MonospaceMeasure::default())
            .unwrap();
        assert!(!moved);
    }

    #[test]
    fn test_replace_document_is_remote_and_keeps_caret() {
        let mut editor = editor();
        editor.set_selection(Selection::cursor(3)).unwrap();
        let mut next = editor.doc().clone();
        next.blocks[1].replace(0, 0, vec![quire_model::TextRun::plain("!")]);

        editor.replace_document(next.clone()).unwrap();
        assert_eq!(editor.doc(), &next);
        assert_eq!(editor.state().caret(), Some((0, 2)));
    }

    #[test]
    fn test_remote_edit_remaps_search_highlights() {
        let mut editor = editor();
        editor.search("rain").unwrap();
        let before: Vec<(usize, usize)> =
            editor.state().decorations.iter().map(|d| (d.from, d.to)).collect();
        assert_eq!(before, vec![(5, 9), (17, 21)]);

        let mut next = editor.doc().clone();
        let end = next.blocks[1].content_len();
        next.blocks[1].replace(end, end, vec![quire_model::TextRun::plain("!")]);
        editor.replace_document(next.clone()).unwrap();
        let after: Vec<(usize, usize)> =
            editor.state().decorations.iter().map(|d| (d.from, d.to)).collect();
        assert_eq!(after, before);

        next.blocks[0].replace(0, 0, vec![quire_model::TextRun::plain("Oh, ")]);
        editor.replace_document(next).unwrap();
        let shifted: Vec<(usize, usize)> =
            editor.state().decorations.iter().map(|d| (d.from, d.to)).collect();
        assert_eq!(shifted, vec![(9, 13), (21, 25)]);
        assert_eq!(editor.state().decorations.current().map(|d| d.from), Some(9));
    }

    #[test]
    fn test_remote_block_above_keeps_caret_in_its_block() {
        let mut editor = editor();
        // "“Ra|in again”"
        editor.set_selection(Selection::cursor(19)).unwrap();
        assert_eq!(editor.state().caret(), Some((1, 3)));

        let mut next = editor.doc().clone();
        next.blocks.insert(
            0,
            quire_model::BlockNode::textblock(
                BlockType::Narration,
                Some("p".into()),
                vec![quire_model::TextRun::plain("New")],
            ),
        );
        editor.replace_document(next).unwrap();

        assert_eq!(editor.state().caret(), Some((2, 3)));
        assert_eq!(editor.doc().blocks[2].id.as_deref(), Some("b"));
    }

    #[test]
    fn test_destroyed_editor_rejects_dispatch() {
        let mut editor = editor();
        editor.destroy();
        assert!(editor.is_destroyed());
        assert!(matches!(
            editor.set_selection(Selection::cursor(1)),
            Err(EditorError::Destroyed)
        ));
    }
}
