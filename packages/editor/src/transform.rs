//! # Document Steps
//!
//! Atomic, position-addressed edits to the Document Tree.
//!
//! Every step applied to a document yields a [`StepMap`] describing how
//! positions moved; a [`Mapping`] chains the maps of a whole transaction so
//! selections and decorations can be carried across it without re-deriving
//! them from content.
//!
//! ## Step Semantics
//!
//! ### ReplaceText
//! - Both ends must fall inside the same textblock
//! - Replacement runs keep their own marks
//!
//! ### ReplaceBlocks
//! - Both ends must be block boundaries
//! - Covers insertion (`from == to`) and deletion (empty `blocks`)
//!
//! ### SplitBlock
//! - The new trailing block copies type, attributes and `id` of the original;
//!   identity assignment repairs the duplicate afterwards
//!
//! ### JoinBlocks
//! - Merges the textblock after a boundary into the one before it

use quire_model::{BlockNode, Document, ResolvedPos, TextRun};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    ReplaceText {
        from: usize,
        to: usize,
        runs: Vec<TextRun>,
    },
    ReplaceBlocks {
        from: usize,
        to: usize,
        blocks: Vec<BlockNode>,
    },
    SplitBlock {
        pos: usize,
    },
    JoinBlocks {
        pos: usize,
    },
    SetBlockId {
        index: usize,
        id: Option<String>,
    },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StepError {
    #[error("Position {pos} is outside the document (size {size})")]
    OutOfRange { pos: usize, size: usize },

    #[error("Position {0} is not inside a textblock")]
    NotInTextblock(usize),

    #[error("Range {from}..{to} spans more than one block")]
    CrossBlockRange { from: usize, to: usize },

    #[error("Position {0} is not a block boundary")]
    NotABoundary(usize),

    #[error("Range {from}..{to} is inverted")]
    InvertedRange { from: usize, to: usize },

    #[error("Block index {0} does not exist")]
    NoSuchBlock(usize),

    #[error("Cannot join blocks at {0}")]
    CannotJoin(usize),
}

impl Step {
    /// Apply the step to `doc`, returning how positions moved.
    pub fn apply(&self, doc: &mut Document) -> Result<StepMap, StepError> {
        match self {
            Step::ReplaceText { from, to, runs } => Self::apply_replace_text(doc, *from, *to, runs),
            Step::ReplaceBlocks { from, to, blocks } => {
                Self::apply_replace_blocks(doc, *from, *to, blocks)
            }
            Step::SplitBlock { pos } => Self::apply_split(doc, *pos),
            Step::JoinBlocks { pos } => Self::apply_join(doc, *pos),
            Step::SetBlockId { index, id } => {
                let block = doc
                    .blocks
                    .get_mut(*index)
                    .ok_or(StepError::NoSuchBlock(*index))?;
                block.id = id.clone();
                Ok(StepMap::identity())
            }
        }
    }

    fn apply_replace_text(
        doc: &mut Document,
        from: usize,
        to: usize,
        runs: &[TextRun],
    ) -> Result<StepMap, StepError> {
        if from > to {
            return Err(StepError::InvertedRange { from, to });
        }
        let (index, start) = text_pos(doc, from)?;
        let (end_index, end) = text_pos(doc, to)?;
        if index != end_index {
            return Err(StepError::CrossBlockRange { from, to });
        }

        let inserted: usize = runs.iter().map(TextRun::len).sum();
        doc.blocks[index].replace(start, end, runs.to_vec());
        Ok(StepMap::new(from, to - from, inserted))
    }

    fn apply_replace_blocks(
        doc: &mut Document,
        from: usize,
        to: usize,
        blocks: &[BlockNode],
    ) -> Result<StepMap, StepError> {
        if from > to {
            return Err(StepError::InvertedRange { from, to });
        }
        let start = boundary(doc, from)?;
        let end = boundary(doc, to)?;

        let inserted: usize = blocks.iter().map(BlockNode::node_size).sum();
        doc.blocks.splice(start..end, blocks.iter().cloned());
        Ok(StepMap::new(from, to - from, inserted))
    }

    fn apply_split(doc: &mut Document, pos: usize) -> Result<StepMap, StepError> {
        let (index, offset) = text_pos(doc, pos)?;
        let block = &mut doc.blocks[index];
        let len = block.content_len();
        let tail = block.slice(offset, len);
        block.replace(offset, len, Vec::new());

        let mut next = BlockNode::textblock(block.kind.clone(), block.id.clone(), tail);
        next.attrs = block.attrs.clone();
        doc.blocks.insert(index + 1, next);
        Ok(StepMap::new(pos, 0, 2))
    }

    fn apply_join(doc: &mut Document, pos: usize) -> Result<StepMap, StepError> {
        let index = boundary(doc, pos)?;
        if index == 0 || index >= doc.blocks.len() {
            return Err(StepError::CannotJoin(pos));
        }
        if !doc.blocks[index - 1].is_textblock() || !doc.blocks[index].is_textblock() {
            return Err(StepError::CannotJoin(pos));
        }

        let removed = doc.blocks.remove(index);
        let previous = &mut doc.blocks[index - 1];
        let len = previous.content_len();
        previous.replace(len, len, removed.content);
        Ok(StepMap::new(pos - 1, 2, 0))
    }
}

fn text_pos(doc: &Document, pos: usize) -> Result<(usize, usize), StepError> {
    match doc.resolve(pos) {
        Some(ResolvedPos::Text { index, offset }) => Ok((index, offset)),
        Some(ResolvedPos::Boundary { .. }) => Err(StepError::NotInTextblock(pos)),
        None => Err(StepError::OutOfRange {
            pos,
            size: doc.size(),
        }),
    }
}

fn boundary(doc: &Document, pos: usize) -> Result<usize, StepError> {
    match doc.resolve(pos) {
        Some(ResolvedPos::Boundary { index }) => Ok(index),
        Some(ResolvedPos::Text { .. }) => Err(StepError::NotABoundary(pos)),
        None => Err(StepError::OutOfRange {
            pos,
            size: doc.size(),
        }),
    }
}

/// Replacement of `old_size` positions at `start` by `new_size` positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepMap {
    pub start: usize,
    pub old_size: usize,
    pub new_size: usize,
}

impl StepMap {
    pub fn new(start: usize, old_size: usize, new_size: usize) -> Self {
        Self {
            start,
            old_size,
            new_size,
        }
    }

    pub fn identity() -> Self {
        Self::new(0, 0, 0)
    }

    pub fn is_identity(&self) -> bool {
        self.old_size == 0 && self.new_size == 0
    }

    /// Map a position. `assoc < 0` sticks to the left of an insertion or a
    /// replaced range, `assoc >= 0` to the right.
    pub fn map(&self, pos: usize, assoc: i8) -> usize {
        if self.is_identity() {
            return pos;
        }
        let end = self.start + self.old_size;
        if pos < self.start {
            return pos;
        }
        if pos > end {
            return pos - self.old_size + self.new_size;
        }

        let stick_left = if self.old_size == 0 {
            assoc < 0
        } else if pos == self.start {
            true
        } else if pos == end {
            false
        } else {
            assoc < 0
        };

        if stick_left {
            self.start
        } else {
            self.start + self.new_size
        }
    }
}

/// The position maps of a sequence of steps, applied in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mapping {
    maps: Vec<StepMap>,
}

impl Mapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, map: StepMap) {
        self.maps.push(map);
    }

    pub fn maps(&self) -> &[StepMap] {
        &self.maps
    }

    pub fn map(&self, pos: usize, assoc: i8) -> usize {
        self.maps.iter().fold(pos, |pos, map| map.map(pos, assoc))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quire_model::{BlockAttrs, BlockType};

    fn doc() -> Document {
        Document::new(vec![
            BlockNode::textblock(
                BlockType::Narration,
                Some("a".into()),
                vec![TextRun::plain("Hello")],
            ),
            BlockNode::textblock(
                BlockType::Narration,
                Some("b".into()),
                vec![TextRun::plain("World")],
            ),
        ])
    }

    #[test]
    fn test_replace_text_inside_block() {
        let mut doc = doc();
        let map = Step::ReplaceText {
            from: 1,
            to: 3,
            runs: vec![TextRun::plain("J")],
        }
        .apply(&mut doc)
        .unwrap();

        assert_eq!(doc.blocks[0].text_content(), "Jllo");
        assert_eq!(map, StepMap::new(1, 2, 1));
    }

    #[test]
    fn test_replace_text_rejects_cross_block_range() {
        let mut doc = doc();
        let result = Step::ReplaceText {
            from: 2,
            to: 9,
            runs: vec![],
        }
        .apply(&mut doc);
        assert_eq!(result, Err(StepError::CrossBlockRange { from: 2, to: 9 }));
    }

    #[test]
    fn test_replace_text_rejects_boundary() {
        let mut doc = doc();
        let result = Step::ReplaceText {
            from: 0,
            to: 0,
            runs: vec![TextRun::plain("x")],
        }
        .apply(&mut doc);
        assert_eq!(result, Err(StepError::NotInTextblock(0)));
    }

    #[test]
    fn test_split_copies_id_and_join_restores() {
        let mut doc = doc();
        Step::SplitBlock { pos: 3 }.apply(&mut doc).unwrap();
        assert_eq!(doc.blocks.len(), 3);
        assert_eq!(doc.blocks[0].text_content(), "He");
        assert_eq!(doc.blocks[1].text_content(), "llo");
        assert_eq!(doc.blocks[1].id.as_deref(), Some("a"));

        // boundary between "He" and "llo" sits at 4
        Step::JoinBlocks { pos: 4 }.apply(&mut doc).unwrap();
        assert_eq!(doc.blocks.len(), 2);
        assert_eq!(doc.blocks[0].text_content(), "Hello");
    }

    #[test]
    fn test_join_refuses_leaf() {
        let mut doc = doc();
        doc.blocks
            .insert(1, BlockNode::leaf(BlockType::Divider, None, BlockAttrs::None));
        assert_eq!(
            Step::JoinBlocks { pos: 7 }.apply(&mut doc),
            Err(StepError::CannotJoin(7))
        );
    }

    #[test]
    fn test_replace_blocks_inserts_and_deletes() {
        let mut doc = doc();
        let map = Step::ReplaceBlocks {
            from: 7,
            to: 7,
            blocks: vec![BlockNode::leaf(BlockType::Divider, None, BlockAttrs::None)],
        }
        .apply(&mut doc)
        .unwrap();
        assert_eq!(doc.blocks[1].kind, BlockType::Divider);
        assert_eq!(map, StepMap::new(7, 0, 1));

        Step::ReplaceBlocks {
            from: 0,
            to: 8,
            blocks: vec![],
        }
        .apply(&mut doc)
        .unwrap();
        assert_eq!(doc.blocks.len(), 1);
        assert_eq!(doc.blocks[0].id.as_deref(), Some("b"));
    }

    #[test]
    fn test_step_map_assoc() {
        let insert = StepMap::new(4, 0, 3);
        assert_eq!(insert.map(2, 1), 2);
        assert_eq!(insert.map(4, -1), 4);
        assert_eq!(insert.map(4, 1), 7);
        assert_eq!(insert.map(6, 1), 9);

        let delete = StepMap::new(4, 4, 0);
        assert_eq!(delete.map(4, 1), 4);
        assert_eq!(delete.map(6, 1), 4);
        assert_eq!(delete.map(8, -1), 4);
        assert_eq!(delete.map(10, 1), 6);
    }

    #[test]
    fn test_mapping_chains_maps() {
        let mut mapping = Mapping::new();
        mapping.push(StepMap::new(1, 0, 3));
        mapping.push(StepMap::identity());
        mapping.push(StepMap::new(0, 2, 0));
        assert_eq!(mapping.map(5, 1), 6);
    }
}
