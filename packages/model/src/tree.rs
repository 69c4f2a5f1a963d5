//! Document Tree: the editable representation of a chapter.
//!
//! Positions follow the usual rich-text addressing scheme, counted in chars:
//! a textblock occupies `content_len + 2` positions (its open and close
//! tokens plus content) and a leaf block occupies one.
//!
//! ```text
//!   0   1 2 3   4   5   6
//!   │<p>│H│i│</p>│<hr>│
//! ```

use crate::block::BlockType;
use crate::error::ModelError;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mark {
    Strong,
    Em,
    Underline,
    Strike,
}

impl Mark {
    pub const ALL: [Mark; 4] = [Mark::Strong, Mark::Em, Mark::Underline, Mark::Strike];

    pub fn name(&self) -> &'static str {
        match self {
            Mark::Strong => "strong",
            Mark::Em => "em",
            Mark::Underline => "underline",
            Mark::Strike => "strike",
        }
    }

    pub fn from_name(name: &str) -> Option<Mark> {
        Mark::ALL.into_iter().find(|mark| mark.name() == name)
    }
}

/// A span of text sharing one set of marks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRun {
    pub text: String,
    /// Sorted, without duplicates.
    pub marks: Vec<Mark>,
}

impl TextRun {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            marks: Vec::new(),
        }
    }

    pub fn with_marks(text: impl Into<String>, mut marks: Vec<Mark>) -> Self {
        marks.sort();
        marks.dedup();
        Self {
            text: text.into(),
            marks,
        }
    }

    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Parse one inline node of the persisted JSON form.
    pub fn from_json(value: &Value) -> Result<Self, ModelError> {
        let node_type = value
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| ModelError::MalformedInline(value.to_string()))?;
        if node_type != "text" {
            return Err(ModelError::MalformedInline(format!(
                "unsupported inline node `{node_type}`"
            )));
        }
        let text = value
            .get("text")
            .and_then(Value::as_str)
            .ok_or_else(|| ModelError::MalformedInline(value.to_string()))?;

        let mut marks = Vec::new();
        if let Some(raw_marks) = value.get("marks") {
            let raw_marks = raw_marks
                .as_array()
                .ok_or_else(|| ModelError::MalformedInline(raw_marks.to_string()))?;
            for raw in raw_marks {
                let name = raw
                    .get("type")
                    .and_then(Value::as_str)
                    .ok_or_else(|| ModelError::MalformedInline(raw.to_string()))?;
                let mark =
                    Mark::from_name(name).ok_or_else(|| ModelError::UnknownMark(name.to_string()))?;
                marks.push(mark);
            }
        }

        Ok(TextRun::with_marks(text, marks))
    }

    pub fn to_json(&self) -> Value {
        if self.marks.is_empty() {
            json!({ "type": "text", "text": self.text })
        } else {
            let marks: Vec<Value> = self
                .marks
                .iter()
                .map(|mark| json!({ "type": mark.name() }))
                .collect();
            json!({ "type": "text", "text": self.text, "marks": marks })
        }
    }
}

/// Legal attribute set per block type.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum BlockAttrs {
    #[default]
    None,
    Image { src: String, alt: String },
}

/// A top-level node of the Document Tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockNode {
    pub id: Option<String>,
    pub kind: BlockType,
    pub attrs: BlockAttrs,
    pub content: Vec<TextRun>,
}

impl BlockNode {
    pub fn textblock(kind: BlockType, id: Option<String>, content: Vec<TextRun>) -> Self {
        let mut node = Self {
            id,
            kind,
            attrs: BlockAttrs::None,
            content,
        };
        node.normalize();
        node
    }

    pub fn leaf(kind: BlockType, id: Option<String>, attrs: BlockAttrs) -> Self {
        Self {
            id,
            kind,
            attrs,
            content: Vec::new(),
        }
    }

    /// Empty Narration node, used wherever a block must be blank.
    pub fn empty_narration(id: Option<String>) -> Self {
        Self::textblock(BlockType::Narration, id, Vec::new())
    }

    pub fn is_textblock(&self) -> bool {
        !self.kind.is_leaf()
    }

    pub fn text_content(&self) -> String {
        self.content.iter().map(|run| run.text.as_str()).collect()
    }

    pub fn content_len(&self) -> usize {
        self.content.iter().map(TextRun::len).sum()
    }

    pub fn node_size(&self) -> usize {
        if self.is_textblock() {
            self.content_len() + 2
        } else {
            1
        }
    }

    /// Runs covering the char range `from..to` of this block's content.
    pub fn slice(&self, from: usize, to: usize) -> Vec<TextRun> {
        let mut out = Vec::new();
        let mut pos = 0;
        for run in &self.content {
            let len = run.len();
            let start = from.max(pos);
            let end = to.min(pos + len);
            if start < end {
                let text: String = run
                    .text
                    .chars()
                    .skip(start - pos)
                    .take(end - start)
                    .collect();
                out.push(TextRun::with_marks(text, run.marks.clone()));
            }
            pos += len;
        }
        out
    }

    /// Replace the char range `from..to` with `runs`.
    pub fn replace(&mut self, from: usize, to: usize, runs: Vec<TextRun>) {
        let len = self.content_len();
        let mut next = self.slice(0, from);
        next.extend(runs);
        next.extend(self.slice(to, len));
        self.content = next;
        self.normalize();
    }

    /// Marks active just before `offset`, or at the start of the block.
    pub fn marks_at(&self, offset: usize) -> Vec<Mark> {
        let mut pos = 0;
        for run in &self.content {
            let end = pos + run.len();
            if offset > pos && offset <= end {
                return run.marks.clone();
            }
            pos = end;
        }
        self.content
            .first()
            .filter(|_| offset == 0)
            .map(|run| run.marks.clone())
            .unwrap_or_default()
    }

    /// Drop empty runs and merge neighbours that share marks.
    pub fn normalize(&mut self) {
        let mut merged: Vec<TextRun> = Vec::with_capacity(self.content.len());
        for run in self.content.drain(..) {
            if run.is_empty() {
                continue;
            }
            match merged.last_mut() {
                Some(last) if last.marks == run.marks => last.text.push_str(&run.text),
                _ => merged.push(run),
            }
        }
        self.content = merged;
    }

    pub fn content_json(&self) -> Vec<Value> {
        self.content.iter().map(TextRun::to_json).collect()
    }
}

/// Where a document position falls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedPos {
    /// Between top-level nodes, directly before block `index`
    /// (`index == blocks.len()` is the document end).
    Boundary { index: usize },
    /// Inside the content of textblock `index`, `offset` chars from its start.
    Text { index: usize, offset: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Document {
    pub blocks: Vec<BlockNode>,
}

impl Document {
    pub fn new(blocks: Vec<BlockNode>) -> Self {
        Self { blocks }
    }

    pub fn size(&self) -> usize {
        self.blocks.iter().map(BlockNode::node_size).sum()
    }

    /// Position directly before block `index`.
    pub fn block_start(&self, index: usize) -> usize {
        self.blocks[..index.min(self.blocks.len())]
            .iter()
            .map(BlockNode::node_size)
            .sum()
    }

    /// Position of the first content char of textblock `index`.
    pub fn content_start(&self, index: usize) -> usize {
        self.block_start(index) + 1
    }

    /// Position right after the last content char of textblock `index`.
    pub fn content_end(&self, index: usize) -> usize {
        self.content_start(index) + self.blocks[index].content_len()
    }

    pub fn resolve(&self, pos: usize) -> Option<ResolvedPos> {
        let mut start = 0;
        for (index, block) in self.blocks.iter().enumerate() {
            if pos == start {
                return Some(ResolvedPos::Boundary { index });
            }
            let end = start + block.node_size();
            if pos < end && block.is_textblock() {
                return Some(ResolvedPos::Text {
                    index,
                    offset: pos - start - 1,
                });
            }
            start = end;
        }
        (pos == start).then_some(ResolvedPos::Boundary {
            index: self.blocks.len(),
        })
    }

    /// Text of all textblock content between two positions.
    pub fn text_between(&self, from: usize, to: usize) -> String {
        let mut out = String::new();
        let mut start = 0;
        for block in &self.blocks {
            let size = block.node_size();
            if block.is_textblock() {
                let content_from = start + 1;
                let content_to = content_from + block.content_len();
                let lo = from.max(content_from);
                let hi = to.min(content_to);
                if lo < hi {
                    out.extend(
                        block
                            .text_content()
                            .chars()
                            .skip(lo - content_from)
                            .take(hi - lo),
                    );
                }
            }
            start += size;
            if start >= to {
                break;
            }
        }
        out
    }

    /// The char directly before `pos` within the same textblock.
    pub fn char_before(&self, pos: usize) -> Option<char> {
        match self.resolve(pos)? {
            ResolvedPos::Text { index, offset } if offset > 0 => {
                self.blocks[index].text_content().chars().nth(offset - 1)
            }
            _ => None,
        }
    }

    /// The char directly after `pos` within the same textblock.
    pub fn char_after(&self, pos: usize) -> Option<char> {
        match self.resolve(pos)? {
            ResolvedPos::Text { index, offset } => {
                self.blocks[index].text_content().chars().nth(offset)
            }
            ResolvedPos::Boundary { .. } => None,
        }
    }

    /// Index of the block containing or following `pos`.
    pub fn block_index_at(&self, pos: usize) -> Option<usize> {
        match self.resolve(pos)? {
            ResolvedPos::Text { index, .. } => Some(index),
            ResolvedPos::Boundary { index } if index < self.blocks.len() => Some(index),
            ResolvedPos::Boundary { index } => index.checked_sub(1),
        }
    }

    pub fn ids(&self) -> Vec<Option<&str>> {
        self.blocks.iter().map(|block| block.id.as_deref()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Document {
        Document::new(vec![
            BlockNode::textblock(
                BlockType::Narration,
                Some("a".into()),
                vec![TextRun::plain("Hi")],
            ),
            BlockNode::leaf(BlockType::Divider, Some("b".into()), BlockAttrs::None),
            BlockNode::textblock(
                BlockType::Dialogue,
                Some("c".into()),
                vec![
                    TextRun::plain("ab"),
                    TextRun::with_marks("cd", vec![Mark::Strong]),
                ],
            ),
        ])
    }

    #[test]
    fn test_sizes_and_starts() {
        let doc = sample();
        assert_eq!(doc.blocks[0].node_size(), 4);
        assert_eq!(doc.blocks[1].node_size(), 1);
        assert_eq!(doc.size(), 11);
        assert_eq!(doc.block_start(2), 5);
        assert_eq!(doc.content_start(2), 6);
        assert_eq!(doc.content_end(2), 10);
    }

    #[test]
    fn test_resolve_positions() {
        let doc = sample();
        assert_eq!(doc.resolve(0), Some(ResolvedPos::Boundary { index: 0 }));
        assert_eq!(doc.resolve(1), Some(ResolvedPos::Text { index: 0, offset: 0 }));
        assert_eq!(doc.resolve(3), Some(ResolvedPos::Text { index: 0, offset: 2 }));
        assert_eq!(doc.resolve(4), Some(ResolvedPos::Boundary { index: 1 }));
        assert_eq!(doc.resolve(5), Some(ResolvedPos::Boundary { index: 2 }));
        assert_eq!(doc.resolve(11), Some(ResolvedPos::Boundary { index: 3 }));
        assert_eq!(doc.resolve(12), None);
    }

    #[test]
    fn test_text_between_spans_blocks() {
        let doc = sample();
        assert_eq!(doc.text_between(0, doc.size()), "Hiabcd");
        assert_eq!(doc.text_between(2, 8), "iab");
    }

    #[test]
    fn test_char_neighbours_stay_inside_block() {
        let doc = sample();
        assert_eq!(doc.char_before(1), None);
        assert_eq!(doc.char_after(1), Some('H'));
        assert_eq!(doc.char_before(3), Some('i'));
        assert_eq!(doc.char_after(3), None);
    }

    #[test]
    fn test_replace_merges_runs() {
        let mut node = BlockNode::textblock(
            BlockType::Narration,
            None,
            vec![TextRun::plain("Hello")],
        );
        node.replace(5, 5, vec![TextRun::plain(" world")]);
        assert_eq!(node.content, vec![TextRun::plain("Hello world")]);

        node.replace(0, 5, vec![TextRun::with_marks("Bye", vec![Mark::Em])]);
        assert_eq!(node.text_content(), "Bye world");
        assert_eq!(node.content.len(), 2);
        assert_eq!(node.marks_at(2), vec![Mark::Em]);
        assert!(node.marks_at(5).is_empty());
    }

    #[test]
    fn test_text_run_json() {
        let run = TextRun::with_marks("x", vec![Mark::Strike, Mark::Strong]);
        let json = run.to_json();
        assert_eq!(json["marks"][0]["type"], "strong");
        assert_eq!(TextRun::from_json(&json).unwrap(), run);

        let bad = json!({ "type": "text", "text": "x", "marks": [{ "type": "glow" }] });
        assert_eq!(
            TextRun::from_json(&bad),
            Err(ModelError::UnknownMark("glow".to_string()))
        );
        assert!(TextRun::from_json(&json!({ "text": 1 })).is_err());
    }
}
