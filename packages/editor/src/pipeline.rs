//! # Plugin Pipeline
//!
//! Coordinates one edit end to end: Input → Transaction → Filters → Commit →
//! Observers.
//!
//! The pipeline owns the ordered plugin lists; it holds no document state.
//! A dispatch either commits completely (filters ran, state applied,
//! observers notified) or not at all.

use crate::plugins::auto_quote::AutoQuote;
use crate::plugins::identity::IdentityAssignment;
use crate::plugins::input_rules::InputRules;
use crate::plugins::keymap::BaseKeymap;
use crate::plugins::scroll_follow::{ScrollFollow, TypewriterOptions};
use crate::plugins::{EditorInput, InputHandler, SideEffect, TransactionFilter, ViewObserver};
use crate::state::EditorState;
use crate::transaction::Transaction;
use crate::transform::StepError;
use quire_model::{IdGenerator, RandomIds};
use std::sync::Arc;
use tracing::trace;

#[derive(Debug)]
pub struct PluginPipeline {
    input_handlers: Vec<Box<dyn InputHandler>>,
    filters: Vec<Box<dyn TransactionFilter>>,
    observers: Vec<Box<dyn ViewObserver>>,
}

/// Result of committing one transaction.
#[derive(Debug, Clone)]
pub struct DispatchOutcome {
    pub state: EditorState,
    pub transaction: Transaction,
    pub effects: Vec<SideEffect>,
}

impl PluginPipeline {
    /// Pipeline with the standard chapter plugins
    pub fn new(ids: Arc<dyn IdGenerator>, typewriter: TypewriterOptions) -> Self {
        Self::empty()
            .with_input_handler(Box::new(InputRules))
            .with_input_handler(Box::new(AutoQuote))
            .with_input_handler(Box::new(BaseKeymap))
            .with_filter(Box::new(IdentityAssignment::new(ids)))
            .with_observer(Box::new(ScrollFollow::new(typewriter)))
    }

    /// Pipeline with no plugins at all
    pub fn empty() -> Self {
        Self {
            input_handlers: Vec::new(),
            filters: Vec::new(),
            observers: Vec::new(),
        }
    }

    pub fn with_input_handler(mut self, handler: Box<dyn InputHandler>) -> Self {
        self.input_handlers.push(handler);
        self
    }

    pub fn with_filter(mut self, filter: Box<dyn TransactionFilter>) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn with_observer(mut self, observer: Box<dyn ViewObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Names of registered plugins, in run order
    pub fn plugin_names(&self) -> Vec<&'static str> {
        self.input_handlers
            .iter()
            .map(|h| h.name())
            .chain(self.filters.iter().map(|f| f.name()))
            .chain(self.observers.iter().map(|o| o.name()))
            .collect()
    }

    /// Turn input into a transaction. The first handler that accepts wins.
    pub fn handle_input(
        &self,
        state: &EditorState,
        input: &EditorInput,
    ) -> Result<Option<Transaction>, StepError> {
        for handler in &self.input_handlers {
            if let Some(tr) = handler.handle(state, input)? {
                trace!(handler = handler.name(), "input handled");
                return Ok(Some(tr));
            }
        }
        Ok(None)
    }

    /// Run every filter in order over the pending transaction
    pub fn filter(&self, tr: Transaction, state: &EditorState) -> Transaction {
        self.filters
            .iter()
            .fold(tr, |tr, filter| filter.filter(tr, state))
    }

    /// Filter, commit and observe a transaction
    ///
    /// This:
    /// 1. Runs the transaction filters
    /// 2. Applies the result to produce the next state
    /// 3. Collects side effects from view observers
    pub fn dispatch(&self, state: &EditorState, tr: Transaction) -> DispatchOutcome {
        let tr = self.filter(tr, state);
        let next = state.apply(&tr);
        let effects = self
            .observers
            .iter()
            .filter_map(|observer| observer.observe(state, &next, &tr))
            .collect();

        DispatchOutcome {
            state: next,
            transaction: tr,
            effects,
        }
    }
}

impl Default for PluginPipeline {
    fn default() -> Self {
        Self::new(Arc::new(RandomIds), TypewriterOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugins::Key;
    use crate::state::Selection;
    use quire_model::{BlockNode, BlockType, Document, SequentialIds, TextRun};

    fn pipeline() -> PluginPipeline {
        PluginPipeline::new(
            Arc::new(SequentialIds::new("id")),
            TypewriterOptions {
                enabled: true,
                strict: true,
            },
        )
    }

    fn state(text: &str) -> EditorState {
        let mut state = EditorState::new(Document::new(vec![BlockNode::textblock(
            BlockType::Narration,
            Some("a".into()),
            vec![TextRun::plain(text)],
        )]));
        state.selection = Selection::cursor(1 + text.chars().count());
        state
    }

    #[test]
    fn test_pipeline_creation() {
        let pipeline = PluginPipeline::default();
        assert_eq!(
            pipeline.plugin_names(),
            vec!["input_rules", "auto_quote", "base_keymap", "identity", "scroll_follow"]
        );
        assert!(PluginPipeline::empty().plugin_names().is_empty());
    }

    #[test]
    fn test_quote_input_beats_base_keymap() {
        let pipeline = pipeline();
        let state = state("");
        let tr = pipeline
            .handle_input(&state, &EditorInput::Text("\"".into()))
            .unwrap()
            .unwrap();
        let outcome = pipeline.dispatch(&state, tr);
        assert_eq!(outcome.state.doc.blocks[0].text_content(), "“”");
    }

    #[test]
    fn test_enter_runs_identity_and_scroll() {
        let pipeline = pipeline();
        let state = state("Hello");
        let tr = pipeline
            .handle_input(&state, &EditorInput::Key(Key::Enter))
            .unwrap()
            .unwrap();
        let outcome = pipeline.dispatch(&state, tr);

        let ids = outcome.state.doc.ids();
        assert_eq!(ids, vec![Some("a"), Some("id-1")]);
        assert_eq!(outcome.state.version, 1);
        assert_eq!(
            outcome.effects,
            vec![SideEffect::CenterCaret {
                pos: 8,
                block_index: 1
            }]
        );
    }

    #[test]
    fn test_empty_pipeline_declines_input() {
        let state = state("x");
        assert!(PluginPipeline::empty()
            .handle_input(&state, &EditorInput::Text("y".into()))
            .unwrap()
            .is_none());
    }
}
