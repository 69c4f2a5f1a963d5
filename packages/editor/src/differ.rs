//! # Change-Set Differ
//!
//! Minimal diff between two Block snapshots, the sole input to incremental
//! persistence.
//!
//! A block counts as changed when its text, type, content or attributes
//! differ from the previous block with the same id, or when it moved: the
//! block at the same index in `previous` carries a different id. Comparing
//! positions structurally catches pure reorders, which leave every block's
//! content untouched.
//!
//! Diffing a snapshot against itself always yields an empty change set.

use chrono::{DateTime, Utc};
use quire_model::{Block, ChangeSetEntry, DeltaAction, DeltaBlock, Tombstone};
use std::collections::{HashMap, HashSet};

enum Comparison<'a> {
    Created,
    Same,
    Changed {
        previous: &'a Block,
        moved: bool,
    },
}

struct Snapshot<'a> {
    blocks: &'a [Block],
    by_id: HashMap<&'a str, &'a Block>,
}

impl<'a> Snapshot<'a> {
    fn new(blocks: &'a [Block]) -> Self {
        let mut by_id = HashMap::with_capacity(blocks.len());
        for block in blocks {
            // first occurrence wins
            by_id.entry(block.id.as_str()).or_insert(block);
        }
        Self { blocks, by_id }
    }

    fn compare(&self, index: usize, block: &Block) -> Comparison<'a> {
        let in_place = self.blocks.get(index).filter(|prev| prev.id == block.id);
        let (previous, moved) = match in_place {
            Some(previous) => (previous, false),
            None => match self.by_id.get(block.id.as_str()) {
                Some(previous) => (*previous, true),
                None => return Comparison::Created,
            },
        };

        if !moved && !content_differs(previous, block) {
            Comparison::Same
        } else {
            Comparison::Changed { previous, moved }
        }
    }
}

fn content_differs(previous: &Block, current: &Block) -> bool {
    previous.text != current.text
        || previous.block_type != current.block_type
        || previous.content != current.content
        || previous.normalized_attr() != current.normalized_attr()
}

/// Blocks created or updated in `current` (with their fresh `order`), then
/// a tombstone for every id of `previous` that no longer exists.
pub fn get_blocks_change(previous: &[Block], current: &[Block]) -> Vec<ChangeSetEntry> {
    let snapshot = Snapshot::new(previous);
    let mut entries = Vec::new();

    for (index, block) in current.iter().enumerate() {
        if matches!(snapshot.compare(index, block), Comparison::Same) {
            continue;
        }
        let mut block = block.clone();
        block.order = index;
        entries.push(ChangeSetEntry::Upsert(block));
    }

    entries.extend(tombstones(previous, current).map(ChangeSetEntry::Deleted));
    entries
}

fn tombstones<'a>(
    previous: &'a [Block],
    current: &[Block],
) -> impl Iterator<Item = Tombstone> + 'a {
    let live: HashSet<String> = current.iter().map(|block| block.id.clone()).collect();
    let mut seen = HashSet::new();
    previous
        .iter()
        .filter(move |block| !live.contains(&block.id) && seen.insert(block.id.clone()))
        .map(|block| Tombstone::new(block.id.clone()))
}

/// Field-level variant of [`get_blocks_change`]: `Update` records carry only
/// the fields that changed.
pub fn get_delta_blocks(
    previous: &[Block],
    current: &[Block],
    now: DateTime<Utc>,
) -> Vec<DeltaBlock> {
    let snapshot = Snapshot::new(previous);
    let mut deltas = Vec::new();

    for (index, block) in current.iter().enumerate() {
        match snapshot.compare(index, block) {
            Comparison::Same => {}
            Comparison::Created => deltas.push(DeltaBlock {
                id: block.id.clone(),
                action: DeltaAction::Create,
                date: now,
                content: Some(block.content.clone()),
                block_type: Some(block.block_type.clone()),
                attr: block.attr.clone(),
                order: Some(index),
            }),
            Comparison::Changed { previous, moved } => {
                let content_changed =
                    previous.content != block.content || previous.text != block.text;
                deltas.push(DeltaBlock {
                    id: block.id.clone(),
                    action: DeltaAction::Update,
                    date: now,
                    content: content_changed.then(|| block.content.clone()),
                    block_type: (previous.block_type != block.block_type)
                        .then(|| block.block_type.clone()),
                    attr: (previous.normalized_attr() != block.normalized_attr())
                        .then(|| block.normalized_attr()),
                    order: moved.then_some(index),
                });
            }
        }
    }

    deltas.extend(tombstones(previous, current).map(|tombstone| DeltaBlock {
        id: tombstone.id,
        action: DeltaAction::Delete,
        date: now,
        content: None,
        block_type: None,
        attr: None,
        order: None,
    }));
    deltas
}
