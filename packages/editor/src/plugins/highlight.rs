//! # Search Highlights
//!
//! Decoration state for search matches, driven by a replace-on-demand
//! payload on the transaction:
//!
//! ```text
//! idle ──meta{matches}──▶ matches-present ──edit──▶ remapped
//!   ▲                          │   ▲                   │
//!   └──── meta{[]} ◀───────────┘   └──── meta{…} ◀─────┘
//! ```
//!
//! Ordinary edits map existing decorations through the transaction's
//! position mapping instead of searching again.

use crate::transaction::Transaction;
use crate::transform::Mapping;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A search result span in document positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    pub from: usize,
    pub to: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decoration {
    pub from: usize,
    pub to: usize,
    pub current: bool,
}

impl Decoration {
    pub fn class(&self) -> &'static str {
        if self.current {
            "search-highlight-current"
        } else {
            "search-highlight"
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecorationSet {
    decorations: Vec<Decoration>,
}

impl DecorationSet {
    /// Build from raw matches, clamped to `0..=doc_size`. Empty or inverted
    /// ranges are dropped; the `current_index`-th match is tagged current.
    pub fn from_matches(matches: &[Match], current_index: usize, doc_size: usize) -> Self {
        let decorations = matches
            .iter()
            .enumerate()
            .filter_map(|(index, m)| {
                let from = m.from.min(doc_size);
                let to = m.to.min(doc_size).max(from);
                (from < to).then_some(Decoration {
                    from,
                    to,
                    current: index == current_index,
                })
            })
            .collect();
        Self { decorations }
    }

    /// Carry decorations across an edit. Ranges that collapse are dropped.
    pub fn map(&self, mapping: &Mapping) -> Self {
        let decorations = self
            .decorations
            .iter()
            .filter_map(|decoration| {
                let from = mapping.map(decoration.from, 1);
                let to = mapping.map(decoration.to, -1);
                (from < to).then_some(Decoration {
                    from,
                    to,
                    current: decoration.current,
                })
            })
            .collect();
        Self { decorations }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Decoration> {
        self.decorations.iter()
    }

    pub fn len(&self) -> usize {
        self.decorations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decorations.is_empty()
    }

    pub fn current(&self) -> Option<&Decoration> {
        self.decorations.iter().find(|decoration| decoration.current)
    }
}

/// Reducer for the decoration state.
#[derive(Debug, Default)]
pub struct HighlightEngine;

impl HighlightEngine {
    pub fn apply(tr: &Transaction, previous: &DecorationSet) -> DecorationSet {
        if let Some(meta) = tr.highlight() {
            let set = DecorationSet::from_matches(&meta.matches, meta.current_index, tr.doc().size());
            debug!(
                requested = meta.matches.len(),
                kept = set.len(),
                current = meta.current_index,
                "rebuilt search highlights"
            );
            return set;
        }

        if tr.doc_changed() && !previous.is_empty() {
            return previous.map(tr.mapping());
        }

        previous.clone()
    }
}
