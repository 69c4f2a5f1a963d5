//! A pending edit: steps applied to a working copy of the document plus the
//! metadata plugins read and write before it commits.

use crate::plugins::highlight::Match;
use crate::state::Selection;
use crate::transform::{Mapping, Step, StepError};
use quire_model::{BlockNode, Document, Mark, ResolvedPos, TextRun};
use std::collections::HashMap;

/// Where a transaction came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Local,
    Remote,
}

/// Replace-on-demand payload for the highlight engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightMeta {
    pub matches: Vec<Match>,
    pub current_index: usize,
}

#[derive(Debug, Clone)]
pub struct Transaction {
    doc_before: Document,
    doc: Document,
    steps: Vec<Step>,
    mapping: Mapping,
    selection_before: Selection,
    selection: Option<Selection>,
    highlight: Option<HighlightMeta>,
    origin: Origin,
    scroll_into_view: bool,
    appended_by: Vec<&'static str>,
}

impl Transaction {
    pub fn new(doc: &Document, selection: Selection) -> Self {
        Self {
            doc_before: doc.clone(),
            doc: doc.clone(),
            steps: Vec::new(),
            mapping: Mapping::new(),
            selection_before: selection,
            selection: None,
            highlight: None,
            origin: Origin::Local,
            scroll_into_view: false,
            appended_by: Vec::new(),
        }
    }

    pub fn doc(&self) -> &Document {
        &self.doc
    }

    pub fn doc_before(&self) -> &Document {
        &self.doc_before
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn mapping(&self) -> &Mapping {
        &self.mapping
    }

    pub fn doc_changed(&self) -> bool {
        !self.steps.is_empty()
    }

    /// Apply a step to the working document.
    pub fn step(&mut self, step: Step) -> Result<&mut Self, StepError> {
        let map = step.apply(&mut self.doc)?;
        self.mapping.push(map);
        self.steps.push(step);
        Ok(self)
    }

    /// Insert text at `pos`, inheriting the marks active there.
    pub fn insert_text(&mut self, pos: usize, text: &str) -> Result<&mut Self, StepError> {
        self.replace_with_text(pos, pos, text)
    }

    /// Replace `from..to` inside one textblock with `text`.
    pub fn replace_with_text(
        &mut self,
        from: usize,
        to: usize,
        text: &str,
    ) -> Result<&mut Self, StepError> {
        let marks = match self.doc.resolve(from) {
            Some(ResolvedPos::Text { index, offset }) => self.doc.blocks[index].marks_at(offset),
            _ => Vec::new(),
        };
        let runs = if text.is_empty() {
            Vec::new()
        } else {
            vec![TextRun::with_marks(text, marks)]
        };
        self.step(Step::ReplaceText { from, to, runs })
    }

    pub fn delete(&mut self, from: usize, to: usize) -> Result<&mut Self, StepError> {
        self.step(Step::ReplaceText {
            from,
            to,
            runs: Vec::new(),
        })
    }

    pub fn insert_blocks(
        &mut self,
        at: usize,
        blocks: Vec<BlockNode>,
    ) -> Result<&mut Self, StepError> {
        self.step(Step::ReplaceBlocks {
            from: at,
            to: at,
            blocks,
        })
    }

    pub fn replace_blocks(
        &mut self,
        from: usize,
        to: usize,
        blocks: Vec<BlockNode>,
    ) -> Result<&mut Self, StepError> {
        self.step(Step::ReplaceBlocks { from, to, blocks })
    }

    pub fn split_block(&mut self, pos: usize) -> Result<&mut Self, StepError> {
        self.step(Step::SplitBlock { pos })
    }

    pub fn join_blocks(&mut self, pos: usize) -> Result<&mut Self, StepError> {
        self.step(Step::JoinBlocks { pos })
    }

    pub fn set_block_id(
        &mut self,
        index: usize,
        id: Option<String>,
    ) -> Result<&mut Self, StepError> {
        self.step(Step::SetBlockId { index, id })
    }

    /// Rewrite the working document into `doc`, one block at a time.
    ///
    /// Blocks are matched by id: kept blocks get a text step covering only
    /// the span that differs, unmatched ones are inserted or dropped. The
    /// resulting mapping carries the caret and decorations across the swap
    /// the same way it does for local edits.
    pub fn replace_document(&mut self, doc: Document) -> Result<&mut Self, StepError> {
        let caret_in_text = matches!(
            self.doc.resolve(self.selection().head),
            Some(ResolvedPos::Text { .. })
        );

        let mut pending: HashMap<String, usize> = HashMap::new();
        for id in doc.blocks.iter().filter_map(|node| node.id.clone()) {
            *pending.entry(id).or_default() += 1;
        }

        let mut index = 0;
        for node in doc.blocks {
            let id = node.id.clone();
            loop {
                let align = match self.doc.blocks.get(index) {
                    None => Align::Insert,
                    Some(current) if current.id.is_some() && current.id == node.id => Align::Keep,
                    Some(current) => {
                        let wanted_later = current
                            .id
                            .as_ref()
                            .and_then(|id| pending.get(id))
                            .is_some_and(|count| *count > 0);
                        if wanted_later {
                            Align::Insert
                        } else {
                            Align::Drop
                        }
                    }
                };
                match align {
                    Align::Keep => {
                        self.update_block(index, node)?;
                        break;
                    }
                    Align::Insert => {
                        let at = self.doc.block_start(index);
                        self.insert_blocks(at, vec![node])?;
                        break;
                    }
                    Align::Drop => {
                        let from = self.doc.block_start(index);
                        let to = from + self.doc.blocks[index].node_size();
                        self.replace_blocks(from, to, Vec::new())?;
                    }
                }
            }
            index += 1;
            if let Some(id) = id {
                if let Some(count) = pending.get_mut(&id) {
                    *count = count.saturating_sub(1);
                }
            }
        }

        if index < self.doc.blocks.len() {
            let from = self.doc.block_start(index);
            let to = self.doc.size();
            self.replace_blocks(from, to, Vec::new())?;
        }

        // The caret's own block went away; put it in the nearest textblock
        if caret_in_text && !self.selection_set() {
            let head = self.selection().head;
            if let Some(ResolvedPos::Boundary { index }) = self.doc.resolve(head) {
                if let Some(pos) = text_position_near(&self.doc, index) {
                    self.set_selection(Selection::cursor(pos));
                }
            }
        }
        Ok(self)
    }

    /// Bring block `index` in line with `node`, which carries the same id.
    fn update_block(&mut self, index: usize, node: BlockNode) -> Result<(), StepError> {
        let current = &self.doc.blocks[index];
        if *current == node {
            return Ok(());
        }

        let same_shell = current.is_textblock()
            && node.is_textblock()
            && current.kind == node.kind
            && current.attrs == node.attrs;
        if !same_shell {
            let from = self.doc.block_start(index);
            let to = from + current.node_size();
            self.replace_blocks(from, to, vec![node])?;
            return Ok(());
        }

        let old = marked_chars(current);
        let new = marked_chars(&node);
        let prefix = old.iter().zip(&new).take_while(|(a, b)| a == b).count();
        let room = old.len().min(new.len()) - prefix;
        let suffix = old
            .iter()
            .rev()
            .zip(new.iter().rev())
            .take(room)
            .take_while(|(a, b)| a == b)
            .count();

        let start = self.doc.content_start(index);
        let runs = node.slice(prefix, new.len() - suffix);
        let from = start + prefix;
        let to = start + old.len() - suffix;
        if from == to && runs.is_empty() {
            return Ok(());
        }
        self.step(Step::ReplaceText { from, to, runs })?;
        Ok(())
    }

    /// Selection after this transaction: explicit if set, otherwise the
    /// previous selection mapped through every step.
    pub fn selection(&self) -> Selection {
        self.selection.unwrap_or_else(|| Selection {
            anchor: self.mapping.map(self.selection_before.anchor, 1),
            head: self.mapping.map(self.selection_before.head, 1),
        })
    }

    pub fn selection_before(&self) -> Selection {
        self.selection_before
    }

    pub fn selection_set(&self) -> bool {
        self.selection.is_some()
    }

    pub fn set_selection(&mut self, selection: Selection) -> &mut Self {
        self.selection = Some(selection);
        self
    }

    pub fn highlight(&self) -> Option<&HighlightMeta> {
        self.highlight.as_ref()
    }

    pub fn set_highlight(&mut self, matches: Vec<Match>, current_index: usize) -> &mut Self {
        self.highlight = Some(HighlightMeta {
            matches,
            current_index,
        });
        self
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }

    pub fn set_origin(&mut self, origin: Origin) -> &mut Self {
        self.origin = origin;
        self
    }

    pub fn scroll_into_view(&mut self) -> &mut Self {
        self.scroll_into_view = true;
        self
    }

    pub fn scrolled_into_view(&self) -> bool {
        self.scroll_into_view
    }

    /// Record that a plugin appended steps to this transaction.
    pub fn mark_appended(&mut self, plugin: &'static str) {
        if !self.appended_by.contains(&plugin) {
            self.appended_by.push(plugin);
        }
    }

    pub fn appended_by(&self) -> &[&'static str] {
        &self.appended_by
    }
}

enum Align {
    Keep,
    Insert,
    Drop,
}

fn marked_chars(node: &BlockNode) -> Vec<(char, &[Mark])> {
    node.content
        .iter()
        .flat_map(|run| run.text.chars().map(move |c| (c, run.marks.as_slice())))
        .collect()
}

/// First content position of the textblock at or after `index`, else the
/// end of the closest one before it.
fn text_position_near(doc: &Document, index: usize) -> Option<usize> {
    if let Some(next) = (index..doc.blocks.len()).find(|&i| doc.blocks[i].is_textblock()) {
        return Some(doc.content_start(next));
    }
    (0..index.min(doc.blocks.len()))
        .rev()
        .find(|&i| doc.blocks[i].is_textblock())
        .map(|i| doc.content_end(i))
}
