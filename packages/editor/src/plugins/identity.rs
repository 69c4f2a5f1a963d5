//! Identity assignment: every top-level node ends a transaction with a
//! unique, non-null `id`.
//!
//! Single left-to-right pass. The first node carrying an id keeps it; later
//! duplicates and missing ids get fresh ones.

use super::TransactionFilter;
use crate::state::EditorState;
use crate::transaction::Transaction;
use quire_common::Visitor;
use quire_model::{BlockNode, Document, IdGenerator};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

/// Indices of blocks whose id is missing or repeats an earlier one.
#[derive(Debug, Default)]
struct DuplicateScan {
    seen: HashSet<String>,
    repairs: Vec<usize>,
}

impl Visitor for DuplicateScan {
    fn visit_block(&mut self, index: usize, block: &BlockNode) {
        match &block.id {
            Some(id) if self.seen.insert(id.clone()) => {}
            _ => self.repairs.push(index),
        }
    }
}

pub fn blocks_needing_ids(doc: &Document) -> Vec<usize> {
    let mut scan = DuplicateScan::default();
    scan.visit_document(doc);
    scan.repairs
}

/// Repair ids in place, returning how many were rewritten.
pub fn assign_ids(doc: &mut Document, ids: &dyn IdGenerator) -> usize {
    let repairs = blocks_needing_ids(doc);
    for &index in &repairs {
        doc.blocks[index].id = Some(ids.new_id());
    }
    repairs.len()
}

#[derive(Debug)]
pub struct IdentityAssignment {
    ids: Arc<dyn IdGenerator>,
}

impl IdentityAssignment {
    pub fn new(ids: Arc<dyn IdGenerator>) -> Self {
        Self { ids }
    }
}

impl TransactionFilter for IdentityAssignment {
    fn name(&self) -> &'static str {
        "identity"
    }

    fn filter(&self, mut tr: Transaction, _state: &EditorState) -> Transaction {
        if !tr.doc_changed() {
            return tr;
        }

        let repairs = blocks_needing_ids(tr.doc());
        for index in repairs {
            let previous = tr.doc().blocks[index].id.clone();
            let id = self.ids.new_id();
            debug!(index, previous = ?previous, id = %id, "assigning block id");
            if let Err(err) = tr.set_block_id(index, Some(id)) {
                warn!(index, error = %err, "failed to assign block id");
                continue;
            }
            tr.mark_appended(self.name());
        }
        tr
    }
}
