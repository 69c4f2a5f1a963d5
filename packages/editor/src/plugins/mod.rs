//! # Transaction Plugins
//!
//! Three kinds of hooks, run in a fixed order by
//! [`PluginPipeline`](crate::PluginPipeline) for every dispatched edit:
//!
//! ```text
//! EditorInput ──▶ InputHandler* ──▶ Transaction
//!                  (first match wins)    │
//!                                        ▼
//!                              TransactionFilter*     pure Transaction → Transaction
//!                                        │
//!                                        ▼
//!                              EditorState::apply     doc, selection, decorations
//!                                        │
//!                                        ▼
//!                                ViewObserver*  ──▶  SideEffect (scroll, …)
//! ```
//!
//! Filters and observers must be deterministic: the same transaction against
//! the same state always yields the same output.

pub mod auto_quote;
pub mod highlight;
pub mod identity;
pub mod input_rules;
pub mod keymap;
pub mod scroll_follow;

use crate::state::EditorState;
use crate::transaction::Transaction;
use crate::transform::StepError;
use std::fmt::Debug;

/// User input before it becomes a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorInput {
    /// Typed text replacing the selection.
    Text(String),
    Key(Key),
    /// Plain-text clipboard content.
    Paste(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Backspace,
    Enter,
}

/// Turns input into a transaction, or declines so the next handler runs.
pub trait InputHandler: Debug + Send + Sync {
    fn name(&self) -> &'static str;

    fn handle(
        &self,
        state: &EditorState,
        input: &EditorInput,
    ) -> Result<Option<Transaction>, StepError>;
}

/// Inspects and rewrites a pending transaction before it commits.
pub trait TransactionFilter: Debug + Send + Sync {
    fn name(&self) -> &'static str;

    fn filter(&self, tr: Transaction, state: &EditorState) -> Transaction;
}

/// Effects outside the document, for the host view to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SideEffect {
    /// Scroll so the caret's block sits at the vertical center.
    CenterCaret { pos: usize, block_index: usize },
}

/// Watches committed states and requests view side effects.
pub trait ViewObserver: Debug + Send + Sync {
    fn name(&self) -> &'static str;

    fn observe(
        &self,
        previous: &EditorState,
        next: &EditorState,
        tr: &Transaction,
    ) -> Option<SideEffect>;
}
