//! # Chapter Replica
//!
//! yrs-backed mirror of the Document Tree for collaborative editing.
//!
//! ## Layout
//!
//! ```text
//! Y.Doc
//!  ├─ "order"        Y.Array<String>   block ids in document order
//!  ├─ "meta"         Y.Map<String>     id → {"type", "attrs", "marks"} JSON
//!  └─ "block:<id>"   Y.Text            inline text of each textblock
//! ```
//!
//! Each textblock owns its own Y.Text, so concurrent typing in the same
//! block merges character by character and typing in different blocks
//! never conflicts. Marks ride along in the meta entry as char spans and
//! are clamped when read back.
//!
//! Local edits are pushed with [`ReplicaDocument::sync_from`], which diffs
//! the tree against the replica and returns the encoded update to ship to
//! peers. Remote updates come in through [`ReplicaDocument::apply_update`];
//! [`ReplicaDocument::to_document`] rebuilds the tree afterwards.

use quire_model::{BlockAttrs, BlockNode, BlockType, Document, Mark, Schema, TextRun};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::fmt;
use tracing::{debug, warn};
use yrs::updates::decoder::Decode;
use yrs::updates::encoder::Encode;
use yrs::{
    Any, Array, ArrayRef, Doc, GetString, Map, MapRef, OffsetKind, Options, Out, ReadTxn,
    StateVector, Text, TextRef, Transact, TransactionMut, Update,
};

/// Client id used to encode seed state. Peers seeding the same Block list
/// produce byte-identical seed updates, which merge as one.
pub const SEED_CLIENT_ID: u64 = 0x5EED;

const ORDER: &str = "order";
const META: &str = "meta";

fn text_name(id: &str) -> String {
    format!("block:{id}")
}

#[derive(Debug, thiserror::Error)]
pub enum ReplicaError {
    #[error("Failed to decode: {0}")]
    Decode(String),

    #[error("Failed to apply update: {0}")]
    Apply(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct MarkSpan {
    from: usize,
    to: usize,
    marks: Vec<Mark>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct BlockMeta {
    #[serde(rename = "type")]
    block_type: BlockType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    attrs: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    marks: Vec<MarkSpan>,
}

impl BlockMeta {
    fn of(node: &BlockNode) -> Self {
        let mut marks = Vec::new();
        let mut pos = 0;
        for run in &node.content {
            let len = run.len();
            if !run.marks.is_empty() {
                marks.push(MarkSpan {
                    from: pos,
                    to: pos + len,
                    marks: run.marks.clone(),
                });
            }
            pos += len;
        }
        Self {
            block_type: node.kind.clone(),
            attrs: Schema::attrs_to_json(&node.attrs),
            marks,
        }
    }

    /// Runs for `text`, applying mark spans clamped to its length.
    fn runs(&self, text: &str) -> Vec<TextRun> {
        let chars: Vec<char> = text.chars().collect();
        let len = chars.len();
        let mut runs = Vec::new();
        let mut pos = 0;
        let mut spans: Vec<&MarkSpan> = self.marks.iter().collect();
        spans.sort_by_key(|span| span.from);

        for span in spans {
            let from = span.from.clamp(pos, len);
            let to = span.to.clamp(from, len);
            if from > pos {
                runs.push(TextRun::plain(chars[pos..from].iter().collect::<String>()));
            }
            if to > from {
                runs.push(TextRun::with_marks(
                    chars[from..to].iter().collect::<String>(),
                    span.marks.clone(),
                ));
            }
            pos = to;
        }
        if pos < len {
            runs.push(TextRun::plain(chars[pos..].iter().collect::<String>()));
        }
        runs
    }
}

/// Byte offset of char index `chars` in `s`.
fn byte_index(s: &str, chars: usize) -> u32 {
    s.char_indices()
        .nth(chars)
        .map(|(i, _)| i)
        .unwrap_or(s.len()) as u32
}

/// Rewrite `text` from `old` to `new` by replacing only the span between
/// their common prefix and suffix.
fn splice_text(text: &TextRef, txn: &mut TransactionMut, old: &str, new: &str) -> bool {
    if old == new {
        return false;
    }
    let old_chars: Vec<char> = old.chars().collect();
    let new_chars: Vec<char> = new.chars().collect();
    let prefix = old_chars
        .iter()
        .zip(&new_chars)
        .take_while(|(a, b)| a == b)
        .count();
    let room = old_chars.len().min(new_chars.len()) - prefix;
    let suffix = old_chars
        .iter()
        .rev()
        .zip(new_chars.iter().rev())
        .take(room)
        .take_while(|(a, b)| a == b)
        .count();

    let start = byte_index(old, prefix);
    let end = byte_index(old, old_chars.len() - suffix);
    if end > start {
        text.remove_range(txn, start, end - start);
    }
    let inserted: String = new_chars[prefix..new_chars.len() - suffix].iter().collect();
    if !inserted.is_empty() {
        text.insert(txn, start, &inserted);
    }
    true
}

fn read_string(out: Out) -> Option<String> {
    match out {
        Out::Any(Any::String(s)) => Some(s.to_string()),
        _ => None,
    }
}

/// CRDT replica of one chapter.
pub struct ReplicaDocument {
    doc: Doc,
    order: ArrayRef,
    meta: MapRef,
    schema: Schema,
}

impl fmt::Debug for ReplicaDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReplicaDocument")
            .field("client_id", &self.doc.client_id())
            .finish_non_exhaustive()
    }
}

impl ReplicaDocument {
    /// Create an empty replica.
    pub fn new(client_id: u64) -> Self {
        let doc = Doc::with_options(Options {
            client_id,
            offset_kind: OffsetKind::Bytes,
            ..Options::default()
        });
        let order = doc.get_or_insert_array(ORDER);
        let meta = doc.get_or_insert_map(META);
        Self {
            doc,
            order,
            meta,
            schema: Schema::novel(),
        }
    }

    /// Create a replica holding `doc`, encoded under [`SEED_CLIENT_ID`].
    pub fn seeded(client_id: u64, doc: &Document) -> Result<Self, ReplicaError> {
        let mut seed = Self::new(SEED_CLIENT_ID);
        seed.sync_from(doc);

        let mut replica = Self::new(client_id);
        replica.apply_update(&seed.encode_state())?;
        Ok(replica)
    }

    pub fn client_id(&self) -> u64 {
        self.doc.client_id()
    }

    /// True when no block has ever been written.
    pub fn is_empty(&self) -> bool {
        let txn = self.doc.transact();
        self.order.len(&txn) == 0
    }

    fn order_ids<T: ReadTxn>(&self, txn: &T) -> Vec<Option<String>> {
        self.order.iter(txn).map(read_string).collect()
    }

    /// Bring the replica in line with `doc`. Returns the encoded update when
    /// anything changed.
    ///
    /// Nodes without an id cannot be keyed and are skipped; later duplicates
    /// of an id are skipped too.
    pub fn sync_from(&mut self, doc: &Document) -> Option<Vec<u8>> {
        let mut seen = HashSet::new();
        let mut desired: Vec<(&str, &BlockNode)> = Vec::with_capacity(doc.blocks.len());
        for (index, node) in doc.blocks.iter().enumerate() {
            match node.id.as_deref() {
                Some(id) if seen.insert(id) => desired.push((id, node)),
                Some(id) => warn!(index, id, "duplicate block id, not replicated"),
                None => warn!(index, "block without id, not replicated"),
            }
        }

        // root refs must be obtained before a transaction is open
        let texts: HashMap<&str, TextRef> = desired
            .iter()
            .filter(|(_, node)| node.is_textblock())
            .map(|(id, _)| (*id, self.doc.get_or_insert_text(text_name(id).as_str())))
            .collect();

        let mut txn = self.doc.transact_mut();
        let mut changed = self.reconcile_order(&mut txn, &desired);

        let stale: Vec<String> = {
            let mut keys: Vec<String> = self
                .meta
                .keys(&txn)
                .filter(|key| !seen.contains(key))
                .map(str::to_string)
                .collect();
            keys.sort();
            keys
        };
        for key in stale {
            self.meta.remove(&mut txn, &key);
            changed = true;
        }

        for (id, node) in &desired {
            let meta = match serde_json::to_string(&BlockMeta::of(node)) {
                Ok(meta) => meta,
                Err(err) => {
                    warn!(id, error = %err, "could not encode block meta");
                    continue;
                }
            };
            let current = self.meta.get(&txn, id).and_then(read_string);
            if current.as_deref() != Some(meta.as_str()) {
                self.meta.insert(&mut txn, id.to_string(), meta);
                changed = true;
            }

            if let Some(text) = texts.get(id) {
                let old = text.get_string(&txn);
                changed |= splice_text(text, &mut txn, &old, &node.text_content());
            }
        }

        changed.then(|| txn.encode_update_v1())
    }

    /// Rewrite the order array into `desired` with as few moves as possible.
    fn reconcile_order(&self, txn: &mut TransactionMut, desired: &[(&str, &BlockNode)]) -> bool {
        let wanted: HashSet<&str> = desired.iter().map(|(id, _)| *id).collect();
        let mut current = self.order_ids(&*txn);
        let mut changed = false;

        let mut first: HashMap<String, usize> = HashMap::new();
        for (index, id) in current.iter().enumerate() {
            if let Some(id) = id {
                first.entry(id.clone()).or_insert(index);
            }
        }
        for index in (0..current.len()).rev() {
            let keep = match &current[index] {
                Some(id) => wanted.contains(id.as_str()) && first.get(id) == Some(&index),
                None => false,
            };
            if !keep {
                self.order.remove(txn, index as u32);
                current.remove(index);
                changed = true;
            }
        }

        for (target, (id, _)) in desired.iter().enumerate() {
            if current.get(target).and_then(Option::as_deref) == Some(*id) {
                continue;
            }
            if let Some(found) = current.iter().position(|c| c.as_deref() == Some(*id)) {
                self.order.remove(txn, found as u32);
                current.remove(found);
            }
            self.order.insert(txn, target as u32, id.to_string());
            current.insert(target, Some(id.to_string()));
            changed = true;
        }
        changed
    }

    /// Rebuild the Document Tree from replica state.
    ///
    /// Ids repeated in the order array (concurrent inserts of the same
    /// block) are read once, first occurrence wins.
    pub fn to_document(&self) -> Document {
        let entries: Vec<(String, Option<BlockMeta>)> = {
            let txn = self.doc.transact();
            let mut seen = HashSet::new();
            self.order_ids(&txn)
                .into_iter()
                .flatten()
                .filter(|id| seen.insert(id.clone()))
                .map(|id| {
                    let meta = self
                        .meta
                        .get(&txn, &id)
                        .and_then(read_string)
                        .and_then(|raw| match serde_json::from_str::<BlockMeta>(&raw) {
                            Ok(meta) => Some(meta),
                            Err(err) => {
                                warn!(id = %id, error = %err, "unreadable block meta");
                                None
                            }
                        });
                    (id, meta)
                })
                .collect()
        };

        let texts: Vec<Option<TextRef>> = entries
            .iter()
            .map(|(id, meta)| {
                let leaf = meta.as_ref().is_some_and(|m| m.block_type.is_leaf());
                (!leaf).then(|| self.doc.get_or_insert_text(text_name(id).as_str()))
            })
            .collect();

        let txn = self.doc.transact();
        let blocks = entries
            .into_iter()
            .zip(texts)
            .map(|((id, meta), text)| {
                let text = text.map(|t| t.get_string(&txn)).unwrap_or_default();
                match meta {
                    Some(meta) if meta.block_type.is_leaf() => {
                        let attrs = self
                            .schema
                            .attrs_from_json(&meta.block_type, meta.attrs.as_ref())
                            .unwrap_or_default();
                        BlockNode::leaf(meta.block_type, Some(id), attrs)
                    }
                    Some(meta) => {
                        let mut node =
                            BlockNode::textblock(meta.block_type.clone(), Some(id), meta.runs(&text));
                        node.attrs = self
                            .schema
                            .attrs_from_json(&meta.block_type, meta.attrs.as_ref())
                            .unwrap_or(BlockAttrs::None);
                        node
                    }
                    None => {
                        debug!(id = %id, "block meta missing, reading as narration");
                        BlockNode::textblock(BlockType::Narration, Some(id), vec![TextRun::plain(text)])
                    }
                }
            })
            .collect();
        Document::new(blocks)
    }

    /// Encode the full replica state.
    pub fn encode_state(&self) -> Vec<u8> {
        let txn = self.doc.transact();
        txn.encode_state_as_update_v1(&StateVector::default())
    }

    pub fn state_vector(&self) -> Vec<u8> {
        let txn = self.doc.transact();
        txn.state_vector().encode_v1()
    }

    /// Encode everything the holder of `state_vector` is missing.
    pub fn encode_delta(&self, state_vector: &[u8]) -> Result<Vec<u8>, ReplicaError> {
        let sv = StateVector::decode_v1(state_vector)
            .map_err(|e| ReplicaError::Decode(e.to_string()))?;
        let txn = self.doc.transact();
        Ok(txn.encode_state_as_update_v1(&sv))
    }

    /// Merge an update produced by a peer (or read back from the offline
    /// store).
    pub fn apply_update(&mut self, update: &[u8]) -> Result<(), ReplicaError> {
        let update = Update::decode_v1(update).map_err(|e| ReplicaError::Decode(e.to_string()))?;
        let mut txn = self.doc.transact_mut();
        txn.apply_update(update)
            .map_err(|e| ReplicaError::Apply(e.to_string()))?;
        Ok(())
    }
}
