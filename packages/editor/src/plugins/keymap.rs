//! Fallback handling for input no other handler claimed.

use super::{EditorInput, InputHandler, Key};
use crate::clipboard;
use crate::state::{EditorState, Selection};
use crate::transaction::Transaction;
use crate::transform::StepError;
use quire_model::ResolvedPos;

#[derive(Debug, Default)]
pub struct BaseKeymap;

impl BaseKeymap {
    fn delete_selection(tr: &mut Transaction, state: &EditorState) -> Result<bool, StepError> {
        let selection = state.selection;
        if selection.is_empty() {
            return Ok(false);
        }
        match (state.doc.resolve(selection.from()), state.doc.resolve(selection.to())) {
            (Some(ResolvedPos::Text { index: a, .. }), Some(ResolvedPos::Text { index: b, .. }))
                if a == b =>
            {
                tr.delete(selection.from(), selection.to())?;
                Ok(true)
            }
            // ranges spanning blocks are left to the host view
            _ => Ok(false),
        }
    }

    fn text(&self, state: &EditorState, text: &str) -> Result<Option<Transaction>, StepError> {
        let mut tr = state.tr();
        let from = state.selection.from();
        if !Self::delete_selection(&mut tr, state)? && !state.selection.is_empty() {
            return Ok(None);
        }
        if !matches!(state.doc.resolve(from), Some(ResolvedPos::Text { .. })) {
            return Ok(None);
        }
        tr.insert_text(from, text)?;
        tr.set_selection(Selection::cursor(from + text.chars().count()))
            .scroll_into_view();
        Ok(Some(tr))
    }

    fn backspace(&self, state: &EditorState) -> Result<Option<Transaction>, StepError> {
        let mut tr = state.tr();
        if Self::delete_selection(&mut tr, state)? {
            tr.set_selection(Selection::cursor(state.selection.from()));
            return Ok(Some(tr));
        }
        if !state.selection.is_empty() {
            return Ok(None);
        }

        let pos = state.selection.head;
        match state.caret() {
            Some((_, offset)) if offset > 0 => {
                tr.delete(pos - 1, pos)?;
                tr.set_selection(Selection::cursor(pos - 1));
            }
            Some((index, 0)) if index > 0 && state.doc.blocks[index - 1].is_textblock() => {
                // pos - 1 is the boundary between the two blocks
                tr.join_blocks(pos - 1)?;
                tr.set_selection(Selection::cursor(pos - 2));
            }
            Some((index, 0)) if index > 0 => {
                // previous block is a leaf: remove it
                let start = state.doc.block_start(index - 1);
                tr.replace_blocks(start, start + 1, Vec::new())?;
                tr.set_selection(Selection::cursor(pos - 1));
            }
            _ => return Ok(None),
        }
        tr.scroll_into_view();
        Ok(Some(tr))
    }

    fn enter(&self, state: &EditorState) -> Result<Option<Transaction>, StepError> {
        let mut tr = state.tr();
        let from = state.selection.from();
        if !Self::delete_selection(&mut tr, state)? && !state.selection.is_empty() {
            return Ok(None);
        }
        if !matches!(state.doc.resolve(from), Some(ResolvedPos::Text { .. })) {
            return Ok(None);
        }
        tr.split_block(from)?;
        tr.set_selection(Selection::cursor(from + 2)).scroll_into_view();
        Ok(Some(tr))
    }
}

impl InputHandler for BaseKeymap {
    fn name(&self) -> &'static str {
        "base_keymap"
    }

    fn handle(
        &self,
        state: &EditorState,
        input: &EditorInput,
    ) -> Result<Option<Transaction>, StepError> {
        match input {
            EditorInput::Text(text) => self.text(state, text),
            EditorInput::Key(Key::Backspace) => self.backspace(state),
            EditorInput::Key(Key::Enter) => self.enter(state),
            EditorInput::Paste(text) => clipboard::paste_text(state, text),
        }
    }
}
