//! Typewriter scrolling: keep the caret's block vertically centered.

use super::{SideEffect, ViewObserver};
use crate::state::EditorState;
use crate::transaction::Transaction;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypewriterOptions {
    #[serde(default)]
    pub enabled: bool,
    /// Only follow caret moves caused by typing, not by navigation.
    #[serde(default)]
    pub strict: bool,
}

#[derive(Debug, Default)]
pub struct ScrollFollow {
    options: TypewriterOptions,
}

impl ScrollFollow {
    pub fn new(options: TypewriterOptions) -> Self {
        Self { options }
    }
}

impl ViewObserver for ScrollFollow {
    fn name(&self) -> &'static str {
        "scroll_follow"
    }

    fn observe(
        &self,
        previous: &EditorState,
        next: &EditorState,
        tr: &Transaction,
    ) -> Option<SideEffect> {
        if !self.options.enabled
            || previous.selection == next.selection
            || !next.selection.is_empty()
            || (self.options.strict && !tr.doc_changed())
        {
            return None;
        }

        let pos = next.selection.head;
        let block_index = next.doc.block_index_at(pos)?;
        Some(SideEffect::CenterCaret { pos, block_index })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Selection;
    use quire_model::{BlockNode, BlockType, Document, TextRun};

    fn state() -> EditorState {
        EditorState::new(Document::new(vec![
            BlockNode::textblock(BlockType::Narration, Some("a".into()), vec![TextRun::plain("one")]),
            BlockNode::textblock(BlockType::Narration, Some("b".into()), vec![TextRun::plain("two")]),
        ]))
    }

    fn step(observer: &ScrollFollow, state: &EditorState, tr: &Transaction) -> Option<SideEffect> {
        let next = state.apply(tr);
        observer.observe(state, &next, tr)
    }

    #[test]
    fn test_disabled_does_nothing() {
        let state = state();
        let mut tr = state.tr();
        tr.insert_text(1, "x").unwrap();
        assert_eq!(step(&ScrollFollow::default(), &state, &tr), None);
    }

    #[test]
    fn test_follows_caret_on_typing() {
        let observer = ScrollFollow::new(TypewriterOptions {
            enabled: true,
            strict: false,
        });
        let state = state();
        let mut tr = state.tr();
        tr.insert_text(6, "x").unwrap();
        tr.set_selection(Selection::cursor(7));
        assert_eq!(
            step(&observer, &state, &tr),
            Some(SideEffect::CenterCaret {
                pos: 7,
                block_index: 1
            })
        );
    }

    #[test]
    fn test_strict_ignores_navigation() {
        let state = state();
        let mut tr = state.tr();
        tr.set_selection(Selection::cursor(7));

        let loose = ScrollFollow::new(TypewriterOptions {
            enabled: true,
            strict: false,
        });
        let strict = ScrollFollow::new(TypewriterOptions {
            enabled: true,
            strict: true,
        });
        assert!(step(&loose, &state, &tr).is_some());
        assert_eq!(step(&strict, &state, &tr), None);
    }

    #[test]
    fn test_range_selection_is_ignored() {
        let observer = ScrollFollow::new(TypewriterOptions {
            enabled: true,
            strict: false,
        });
        let state = state();
        let mut tr = state.tr();
        tr.set_selection(Selection::new(1, 3));
        assert_eq!(step(&observer, &state, &tr), None);
    }
}
