//! Clipboard transforms.
//!
//! Copied content loses its block ids so pasting it into another chapter
//! (or twice into the same one) never carries identities across. Pasted
//! plain text becomes one Narration block per line; Identity Assignment
//! gives the new blocks their ids when the paste commits.

use crate::state::{EditorState, Selection};
use crate::transaction::Transaction;
use crate::transform::StepError;
use quire_common::VisitorMut;
use quire_model::{BlockNode, BlockType, Document, ResolvedPos, TextRun};

struct StripIds;

impl VisitorMut for StripIds {
    fn visit_block_mut(&mut self, _index: usize, block: &mut BlockNode) {
        block.id = None;
    }
}

/// Copy hook: drop every block id, keeping types, attributes and marks.
pub fn transform_copied(mut doc: Document) -> Document {
    StripIds.visit_document_mut(&mut doc);
    doc
}

/// Blocks covered by `from..to`, partial textblocks cut to the range, ids
/// stripped.
pub fn copy_range(doc: &Document, from: usize, to: usize) -> Document {
    let (from, to) = (from.min(to), from.max(to).min(doc.size()));
    let mut blocks = Vec::new();
    let mut start = 0;
    for block in &doc.blocks {
        let end = start + block.node_size();
        if end > from && start < to {
            if block.is_textblock() {
                let lo = from.saturating_sub(start + 1).min(block.content_len());
                let hi = (to.saturating_sub(start + 1)).min(block.content_len());
                let mut piece = block.clone();
                piece.content = block.slice(lo, hi);
                blocks.push(piece);
            } else {
                blocks.push(block.clone());
            }
        }
        start = end;
    }
    transform_copied(Document::new(blocks))
}

/// One Narration block per line. Accepts `\n` and `\r\n`.
pub fn parse_plain_text(text: &str) -> Vec<BlockNode> {
    text.lines()
        .map(|line| {
            let runs = if line.is_empty() {
                Vec::new()
            } else {
                vec![TextRun::plain(line)]
            };
            BlockNode::textblock(BlockType::Narration, None, runs)
        })
        .collect()
}

/// Paste plain text at the selection.
///
/// A single line is inserted inline. Several lines become new blocks at
/// the nearest block boundary, splitting the current block when the caret
/// sits mid-text. Selections spanning blocks are declined.
pub fn paste_text(state: &EditorState, text: &str) -> Result<Option<Transaction>, StepError> {
    if text.is_empty() {
        return Ok(None);
    }
    let selection = state.selection;
    let from = selection.from();
    let mut tr = state.tr();

    if !selection.is_empty() {
        match (state.doc.resolve(from), state.doc.resolve(selection.to())) {
            (Some(ResolvedPos::Text { index: a, .. }), Some(ResolvedPos::Text { index: b, .. }))
                if a == b =>
            {
                tr.delete(from, selection.to())?;
            }
            _ => return Ok(None),
        }
    }

    let blocks = parse_plain_text(text);
    if blocks.len() == 1 {
        if !matches!(tr.doc().resolve(from), Some(ResolvedPos::Text { .. })) {
            return Ok(None);
        }
        let line = blocks[0].text_content();
        tr.insert_text(from, &line)?;
        tr.set_selection(Selection::cursor(from + line.chars().count()))
            .scroll_into_view();
        return Ok(Some(tr));
    }

    let at = match tr.doc().resolve(from) {
        Some(ResolvedPos::Boundary { .. }) => from,
        Some(ResolvedPos::Text { index, offset }) => {
            let block = &tr.doc().blocks[index];
            let start = tr.doc().block_start(index);
            if offset == 0 {
                start
            } else if offset == block.content_len() {
                start + block.node_size()
            } else {
                tr.split_block(from)?;
                from + 1
            }
        }
        None => return Ok(None),
    };

    let inserted: usize = blocks.iter().map(BlockNode::node_size).sum();
    tr.insert_blocks(at, blocks)?;
    // end of the last inserted block's content
    tr.set_selection(Selection::cursor(at + inserted - 1))
        .scroll_into_view();
    Ok(Some(tr))
}
