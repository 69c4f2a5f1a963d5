use crate::plugins::highlight::{DecorationSet, HighlightEngine};
use crate::transaction::Transaction;
use quire_model::{Document, ResolvedPos};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub anchor: usize,
    pub head: usize,
}

impl Selection {
    pub fn new(anchor: usize, head: usize) -> Self {
        Self { anchor, head }
    }

    pub fn cursor(pos: usize) -> Self {
        Self {
            anchor: pos,
            head: pos,
        }
    }

    pub fn from(&self) -> usize {
        self.anchor.min(self.head)
    }

    pub fn to(&self) -> usize {
        self.anchor.max(self.head)
    }

    pub fn is_empty(&self) -> bool {
        self.anchor == self.head
    }

    fn clamp(self, size: usize) -> Self {
        Self {
            anchor: self.anchor.min(size),
            head: self.head.min(size),
        }
    }
}

/// Immutable snapshot of an editor: document, selection and plugin state.
#[derive(Debug, Clone)]
pub struct EditorState {
    pub doc: Document,
    pub selection: Selection,
    pub decorations: DecorationSet,
    /// Incremented on every document-changing transaction.
    pub version: u64,
}

impl EditorState {
    pub fn new(doc: Document) -> Self {
        let selection = Selection::cursor(first_text_position(&doc));
        Self {
            doc,
            selection,
            decorations: DecorationSet::default(),
            version: 0,
        }
    }

    /// Start a transaction against this state.
    pub fn tr(&self) -> Transaction {
        Transaction::new(&self.doc, self.selection)
    }

    /// Produce the state after `tr`. Pure; `self` is unchanged.
    pub fn apply(&self, tr: &Transaction) -> EditorState {
        let doc = tr.doc().clone();
        let selection = tr.selection().clamp(doc.size());
        let decorations = HighlightEngine::apply(tr, &self.decorations);
        let version = if tr.doc_changed() {
            self.version + 1
        } else {
            self.version
        };

        EditorState {
            doc,
            selection,
            decorations,
            version,
        }
    }

    /// Block index and offset of the caret when it sits inside a textblock.
    pub fn caret(&self) -> Option<(usize, usize)> {
        match self.doc.resolve(self.selection.head)? {
            ResolvedPos::Text { index, offset } => Some((index, offset)),
            ResolvedPos::Boundary { .. } => None,
        }
    }
}

fn first_text_position(doc: &Document) -> usize {
    doc.blocks
        .iter()
        .position(|block| block.is_textblock())
        .map(|index| doc.content_start(index))
        .unwrap_or(0)
}
