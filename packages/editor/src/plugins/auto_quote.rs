//! Typographic quotes for straight-quote input.
//!
//! - Typing `"` or `'` between whitespace/block edges inserts the open+close
//!   pair with the caret inside; otherwise one quote is inserted, opening
//!   after whitespace or at block start and closing elsewhere.
//! - Backspace between an adjacent open/close pair removes both.
//! - Enter right before a closing quote that ends its block opens a new
//!   empty paragraph after the block instead of splitting inside the quote.
//!
//! Block types are never touched here.

use super::{EditorInput, InputHandler, Key};
use crate::state::{EditorState, Selection};
use crate::transaction::Transaction;
use crate::transform::StepError;
use quire_model::{BlockNode, ResolvedPos};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotePair {
    pub straight: char,
    pub open: char,
    pub close: char,
}

pub const QUOTE_PAIRS: [QuotePair; 2] = [
    QuotePair {
        straight: '\'',
        open: '‘',
        close: '’',
    },
    QuotePair {
        straight: '"',
        open: '“',
        close: '”',
    },
];

fn pair_for(text: &str) -> Option<QuotePair> {
    let mut chars = text.chars();
    let c = chars.next()?;
    if chars.next().is_some() {
        return None;
    }
    QUOTE_PAIRS.into_iter().find(|pair| pair.straight == c)
}

fn is_closing_quote(c: char) -> bool {
    QUOTE_PAIRS.iter().any(|pair| pair.close == c)
}

#[derive(Debug, Default)]
pub struct AutoQuote;

impl AutoQuote {
    fn handle_quote(
        &self,
        state: &EditorState,
        pair: QuotePair,
    ) -> Result<Option<Transaction>, StepError> {
        let (from, to) = (state.selection.from(), state.selection.to());
        let same_block = match (state.doc.resolve(from), state.doc.resolve(to)) {
            (Some(ResolvedPos::Text { index: a, .. }), Some(ResolvedPos::Text { index: b, .. })) => {
                a == b
            }
            _ => false,
        };
        if !same_block {
            return Ok(None);
        }

        let preceded_by_space = state.doc.char_before(from).map_or(true, char::is_whitespace);
        let followed_by_space = state.doc.char_after(to).map_or(true, char::is_whitespace);

        let mut tr = state.tr();
        if preceded_by_space && followed_by_space {
            let text: String = [pair.open, pair.close].iter().collect();
            tr.replace_with_text(from, to, &text)?;
        } else {
            let quote = if preceded_by_space { pair.open } else { pair.close };
            tr.replace_with_text(from, to, &quote.to_string())?;
        }
        tr.set_selection(Selection::cursor(from + 1)).scroll_into_view();
        Ok(Some(tr))
    }

    fn handle_backspace(&self, state: &EditorState) -> Result<Option<Transaction>, StepError> {
        if !state.selection.is_empty() {
            return Ok(None);
        }
        let pos = state.selection.head;
        let (Some(before), Some(after)) = (state.doc.char_before(pos), state.doc.char_after(pos))
        else {
            return Ok(None);
        };
        if !QUOTE_PAIRS
            .iter()
            .any(|pair| pair.open == before && pair.close == after)
        {
            return Ok(None);
        }

        let mut tr = state.tr();
        tr.delete(pos - 1, pos + 1)?;
        tr.set_selection(Selection::cursor(pos - 1)).scroll_into_view();
        Ok(Some(tr))
    }

    fn handle_enter(&self, state: &EditorState) -> Result<Option<Transaction>, StepError> {
        if !state.selection.is_empty() {
            return Ok(None);
        }
        let Some((index, offset)) = state.caret() else {
            return Ok(None);
        };
        let at_trailing_quote = state
            .doc
            .char_after(state.selection.head)
            .is_some_and(is_closing_quote)
            && offset + 1 == state.doc.blocks[index].content_len();
        if !at_trailing_quote {
            return Ok(None);
        }

        let after_block = state.doc.block_start(index + 1);
        let mut tr = state.tr();
        tr.insert_blocks(after_block, vec![BlockNode::empty_narration(None)])?;
        tr.set_selection(Selection::cursor(after_block + 1))
            .scroll_into_view();
        Ok(Some(tr))
    }
}

impl InputHandler for AutoQuote {
    fn name(&self) -> &'static str {
        "auto_quote"
    }

    fn handle(
        &self,
        state: &EditorState,
        input: &EditorInput,
    ) -> Result<Option<Transaction>, StepError> {
        match input {
            EditorInput::Text(text) => match pair_for(text) {
                Some(pair) => self.handle_quote(state, pair),
                None => Ok(None),
            },
            EditorInput::Key(Key::Backspace) => self.handle_backspace(state),
            EditorInput::Key(Key::Enter) => self.handle_enter(state),
            EditorInput::Paste(_) => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quire_model::{BlockType, Document, TextRun};

    fn state_with(text: &str, caret_offset: usize) -> EditorState {
        let mut state = EditorState::new(Document::new(vec![BlockNode::textblock(
            BlockType::Narration,
            Some("a".into()),
            vec![TextRun::plain(text)],
        )]));
        state.selection = Selection::cursor(1 + caret_offset);
        state
    }

    fn type_text(state: &EditorState, text: &str) -> Option<EditorState> {
        AutoQuote
            .handle(state, &EditorInput::Text(text.to_string()))
            .unwrap()
            .map(|tr| state.apply(&tr))
    }

    #[test]
    fn test_pair_in_empty_block() {
        let state = state_with("", 0);
        let next = type_text(&state, "\"").unwrap();
        assert_eq!(next.doc.blocks[0].text_content(), "“”");
        assert_eq!(next.selection, Selection::cursor(2));
    }

    #[test]
    fn test_pair_between_spaces() {
        let state = state_with("he said  loudly", 8);
        let next = type_text(&state, "'").unwrap();
        assert_eq!(next.doc.blocks[0].text_content(), "he said ‘’ loudly");
    }

    #[test]
    fn test_closing_after_word() {
        let state = state_with("Hello", 5);
        let next = type_text(&state, "\"").unwrap();
        assert_eq!(next.doc.blocks[0].text_content(), "Hello”");
        assert_eq!(next.selection, Selection::cursor(7));
    }

    #[test]
    fn test_opening_before_word() {
        let state = state_with("Hello", 0);
        let next = type_text(&state, "\"").unwrap();
        assert_eq!(next.doc.blocks[0].text_content(), "“Hello");
    }

    #[test]
    fn test_other_text_is_declined() {
        let state = state_with("Hello", 5);
        assert!(type_text(&state, "a").is_none());
        assert!(type_text(&state, "\"\"").is_none());
    }

    #[test]
    fn test_backspace_collapses_empty_pair() {
        let state = state_with("“”", 1);
        let tr = AutoQuote
            .handle(&state, &EditorInput::Key(Key::Backspace))
            .unwrap()
            .unwrap();
        let next = state.apply(&tr);
        assert_eq!(next.doc.blocks[0].text_content(), "");
        assert_eq!(next.selection, Selection::cursor(1));
    }

    #[test]
    fn test_backspace_elsewhere_is_declined() {
        let state = state_with("“a”", 2);
        let result = AutoQuote
            .handle(&state, &EditorInput::Key(Key::Backspace))
            .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_enter_before_trailing_quote_opens_paragraph() {
        let state = state_with("“Hi”", 3);
        let tr = AutoQuote
            .handle(&state, &EditorInput::Key(Key::Enter))
            .unwrap()
            .unwrap();
        let next = state.apply(&tr);

        assert_eq!(next.doc.blocks.len(), 2);
        assert_eq!(next.doc.blocks[0].text_content(), "“Hi”");
        assert_eq!(next.doc.blocks[1].kind, BlockType::Narration);
        assert_eq!(next.doc.blocks[1].content_len(), 0);
        assert_eq!(next.caret(), Some((1, 0)));
    }

    #[test]
    fn test_enter_mid_block_is_declined() {
        let state = state_with("“Hi” she said", 3);
        let result = AutoQuote
            .handle(&state, &EditorInput::Key(Key::Enter))
            .unwrap();
        assert!(result.is_none());
    }
}
