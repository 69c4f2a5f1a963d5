//! Integration tests for editor crate

use quire_editor::caret::move_focus;
use quire_editor::{
    blocks_to_doc, doc_to_blocks, get_blocks_change, Direction, Editor, EditorInput,
    EditorOptions, Key, Match, MonospaceMeasure, Selection,
};
use quire_model::{Block, BlockType, Schema, SequentialIds};
use std::collections::HashSet;
use std::sync::Arc;

fn open(blocks: &[Block]) -> Editor {
    Editor::from_blocks(
        blocks,
        &Schema::novel(),
        EditorOptions::default(),
        Arc::new(SequentialIds::new("it")),
    )
    .unwrap()
}

#[test]
fn test_open_chapter_round_trip() {
    let blocks = vec![Block::text_block("a", BlockType::Narration, "Hello")];

    let doc = blocks_to_doc(&blocks, &Schema::novel()).unwrap();
    let back = doc_to_blocks(&doc);

    assert_eq!(back, blocks);
    assert_eq!(back[0].id, "a");
}

#[test]
fn test_typing_session_diff() {
    let blocks = vec![
        Block::text_block("a", BlockType::Narration, "She waited."),
        Block::text_block("b", BlockType::Narration, "Nothing came."),
    ];
    let mut editor = open(&blocks);
    assert!(get_blocks_change(&blocks, &editor.to_blocks()).is_empty());

    // caret at the end of the first block, then Enter and a quote
    editor.set_selection(Selection::cursor(12)).unwrap();
    editor.handle_input(&EditorInput::Key(Key::Enter)).unwrap();
    editor.handle_input(&EditorInput::Text("\"".into())).unwrap();
    editor.handle_input(&EditorInput::Text("H".into())).unwrap();
    editor.handle_input(&EditorInput::Text("i".into())).unwrap();

    let current = editor.to_blocks();
    assert_eq!(current[1].text, "“Hi”");
    assert_eq!(current[1].id, "it-1");

    let change = get_blocks_change(&blocks, &current);
    let ids: Vec<&str> = change.iter().map(|entry| entry.id()).collect();
    // new block, plus "b" which moved down one place
    assert_eq!(ids, vec!["it-1", "b"]);
    assert!(get_blocks_change(&current, &current).is_empty());
}

#[test]
fn test_ids_unique_after_every_edit() {
    let blocks = vec![Block::text_block("a", BlockType::Narration, "one two three")];
    let mut editor = open(&blocks);

    for pos in [4, 6, 8] {
        editor.set_selection(Selection::cursor(pos)).unwrap();
        editor.handle_input(&EditorInput::Key(Key::Enter)).unwrap();
    }
    editor.handle_input(&EditorInput::Paste("x\ny\nz".into())).unwrap();

    let ids: Vec<String> = editor.to_blocks().into_iter().map(|b| b.id).collect();
    let unique: HashSet<&String> = ids.iter().collect();
    assert_eq!(unique.len(), ids.len());
    assert_eq!(ids[0], "a");
}

#[test]
fn test_quote_pair_and_backspace_collapse() {
    let blocks = vec![Block::text_block("a", BlockType::Narration, "")];
    let mut editor = open(&blocks);

    editor.handle_input(&EditorInput::Text("\"".into())).unwrap();
    assert_eq!(editor.doc().blocks[0].text_content(), "“”");
    assert_eq!(editor.state().caret(), Some((0, 1)));

    editor.handle_input(&EditorInput::Key(Key::Backspace)).unwrap();
    assert_eq!(editor.doc().blocks[0].text_content(), "");
}

#[test]
fn test_highlight_tracks_edits() {
    let blocks = vec![Block::text_block("a", BlockType::Narration, "abcdefgh")];
    let mut editor = open(&blocks);
    editor
        .set_highlights(vec![Match { from: 2, to: 5 }], 0)
        .unwrap();

    editor.set_selection(Selection::cursor(1)).unwrap();
    editor.handle_input(&EditorInput::Text("x".into())).unwrap();
    editor.handle_input(&EditorInput::Text("y".into())).unwrap();
    editor.handle_input(&EditorInput::Text("z".into())).unwrap();

    let decoration = editor.state().decorations.iter().next().copied().unwrap();
    assert_eq!((decoration.from, decoration.to), (5, 8));
}

#[test]
fn test_caret_stays_in_bounds() {
    let blocks = vec![
        Block::text_block("a", BlockType::Narration, "A much longer opening line"),
        Block::text_block("b", BlockType::Narration, "Tiny"),
    ];
    let doc = blocks_to_doc(&blocks, &Schema::novel()).unwrap();
    let target = move_focus(
        &doc,
        0,
        20,
        Direction::Forward,
        true,
        &MonospaceMeasure::default(),
    )
    .unwrap();
    assert_eq!(target.block_index, 1);
    assert_eq!(target.offset, 4);
}

#[cfg(feature = "collaboration")]
#[test]
fn test_two_peers_converge() {
    use quire_editor::ReplicaDocument;

    let blocks = vec![Block::text_block("a", BlockType::Narration, "base")];
    let mut peer_one = open(&blocks);
    let mut peer_two = open(&blocks);
    let mut replica_one = ReplicaDocument::seeded(1, peer_one.doc()).unwrap();
    let mut replica_two = ReplicaDocument::seeded(2, peer_two.doc()).unwrap();

    peer_one.set_selection(Selection::cursor(1)).unwrap();
    peer_one.handle_input(&EditorInput::Text("X".into())).unwrap();
    peer_two.set_selection(Selection::cursor(1)).unwrap();
    peer_two.handle_input(&EditorInput::Text("Y".into())).unwrap();

    let update_one = replica_one.sync_from(peer_one.doc()).unwrap();
    let update_two = replica_two.sync_from(peer_two.doc()).unwrap();
    replica_one.apply_update(&update_two).unwrap();
    replica_two.apply_update(&update_one).unwrap();

    peer_one.replace_document(replica_one.to_document()).unwrap();
    peer_two.replace_document(replica_two.to_document()).unwrap();

    assert_eq!(peer_one.doc(), peer_two.doc());
    let text = peer_one.doc().blocks[0].text_content();
    assert!(text.contains('X') && text.contains('Y') && text.ends_with("base"));
}
