//! Typing shortcuts that complete as the last character is entered.

use super::{EditorInput, InputHandler};
use crate::state::{EditorState, Selection};
use crate::transaction::Transaction;
use crate::transform::StepError;
use quire_model::{BlockAttrs, BlockNode, BlockType};

/// `(typed suffix, replacement)`
pub const TEXT_RULES: [(&str, &str); 5] = [
    ("->", "→"),
    ("--", "—"),
    ("<<", "«"),
    (">>", "»"),
    ("=>", "⇒"),
];

fn is_divider_marker(text: &str) -> bool {
    matches!(text, "---" | "—-") || (text.chars().count() >= 3 && text.chars().all(|c| c == '*'))
}

#[derive(Debug, Default)]
pub struct InputRules;

impl InputHandler for InputRules {
    fn name(&self) -> &'static str {
        "input_rules"
    }

    fn handle(
        &self,
        state: &EditorState,
        input: &EditorInput,
    ) -> Result<Option<Transaction>, StepError> {
        let EditorInput::Text(typed) = input else {
            return Ok(None);
        };
        if typed.chars().count() != 1 || !state.selection.is_empty() {
            return Ok(None);
        }
        let Some((index, offset)) = state.caret() else {
            return Ok(None);
        };

        let block = &state.doc.blocks[index];
        let before: String = block.text_content().chars().take(offset).collect();
        let candidate = format!("{before}{typed}");
        let pos = state.selection.head;

        if offset == block.content_len() && is_divider_marker(&candidate) {
            let start = state.doc.block_start(index);
            let end = start + block.node_size();
            let mut tr = state.tr();
            tr.replace_blocks(
                start,
                end,
                vec![
                    BlockNode::leaf(BlockType::Divider, None, BlockAttrs::None),
                    BlockNode::empty_narration(None),
                ],
            )?;
            tr.set_selection(Selection::cursor(start + 2)).scroll_into_view();
            return Ok(Some(tr));
        }

        for (suffix, replacement) in TEXT_RULES {
            if candidate.ends_with(suffix) {
                // the typed char is not in the document yet
                let from = pos - (suffix.chars().count() - 1);
                let mut tr = state.tr();
                tr.replace_with_text(from, pos, replacement)?;
                tr.set_selection(Selection::cursor(from + replacement.chars().count()))
                    .scroll_into_view();
                return Ok(Some(tr));
            }
        }

        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quire_model::{Document, TextRun};

    fn state_with(text: &str) -> EditorState {
        let mut state = EditorState::new(Document::new(vec![BlockNode::textblock(
            BlockType::Narration,
            Some("a".into()),
            vec![TextRun::plain(text)],
        )]));
        state.selection = Selection::cursor(1 + text.chars().count());
        state
    }

    fn type_char(state: &EditorState, c: &str) -> Option<EditorState> {
        InputRules
            .handle(state, &EditorInput::Text(c.to_string()))
            .unwrap()
            .map(|tr| state.apply(&tr))
    }

    #[test]
    fn test_arrow_rule() {
        let next = type_char(&state_with("a -"), ">").unwrap();
        assert_eq!(next.doc.blocks[0].text_content(), "a →");
        assert_eq!(next.selection, Selection::cursor(4));
    }

    #[test]
    fn test_dash_then_divider() {
        let dash = type_char(&state_with("-"), "-").unwrap();
        assert_eq!(dash.doc.blocks[0].text_content(), "—");

        let divider = type_char(&dash, "-").unwrap();
        assert_eq!(divider.doc.blocks.len(), 2);
        assert_eq!(divider.doc.blocks[0].kind, BlockType::Divider);
        assert_eq!(divider.doc.blocks[1].kind, BlockType::Narration);
        assert_eq!(divider.caret(), Some((1, 0)));
    }

    #[test]
    fn test_asterisks_make_divider() {
        let next = type_char(&state_with("**"), "*").unwrap();
        assert_eq!(next.doc.blocks[0].kind, BlockType::Divider);
    }

    #[test]
    fn test_no_rule_declines() {
        assert!(type_char(&state_with("plain"), "x").is_none());
        assert!(type_char(&state_with("a"), "*").is_none());
    }
}
