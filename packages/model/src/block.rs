//! Block Model: the persisted, flat representation of a chapter.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Semantic type tag of a block.
///
/// Serialized as the node-type name used by the editable tree. Names that no
/// variant knows about are kept verbatim in `Unknown` so that a corrupt block
/// still deserializes and can be repaired by the converter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BlockType {
    Narration,
    Dialogue,
    Monologue,
    Comment,
    Divider,
    Image,
    TermA,
    TermB,
    Unknown(String),
}

impl BlockType {
    pub const KNOWN: [BlockType; 8] = [
        BlockType::Narration,
        BlockType::Dialogue,
        BlockType::Monologue,
        BlockType::Comment,
        BlockType::Divider,
        BlockType::Image,
        BlockType::TermA,
        BlockType::TermB,
    ];

    pub fn name(&self) -> &str {
        match self {
            BlockType::Narration => "describe",
            BlockType::Dialogue => "double_quote",
            BlockType::Monologue => "single_quote",
            BlockType::Comment => "comment",
            BlockType::Divider => "divider",
            BlockType::Image => "image",
            BlockType::TermA => "double_scythe",
            BlockType::TermB => "single_scythe",
            BlockType::Unknown(name) => name,
        }
    }

    pub fn from_name(name: &str) -> Self {
        match name {
            "describe" => BlockType::Narration,
            "double_quote" => BlockType::Dialogue,
            "single_quote" => BlockType::Monologue,
            "comment" => BlockType::Comment,
            "divider" => BlockType::Divider,
            "image" => BlockType::Image,
            "double_scythe" => BlockType::TermA,
            "single_scythe" => BlockType::TermB,
            other => BlockType::Unknown(other.to_string()),
        }
    }

    /// Leaf types carry no inline content and occupy a single position.
    pub fn is_leaf(&self) -> bool {
        matches!(self, BlockType::Divider | BlockType::Image)
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, BlockType::Unknown(_))
    }

    /// Read-only classification of a paragraph from its leading delimiter.
    ///
    /// Plugins never rewrite block types; the UI calls this to label blocks.
    pub fn infer_from_text(text: &str) -> Self {
        const DIALOGUE_PREFIXES: [char; 7] = ['"', '“', '”', '‘', '’', '-', '—'];
        match text.trim().chars().next() {
            Some(c) if DIALOGUE_PREFIXES.contains(&c) => BlockType::Dialogue,
            _ => BlockType::Narration,
        }
    }
}

impl From<String> for BlockType {
    fn from(value: String) -> Self {
        BlockType::from_name(&value)
    }
}

impl From<BlockType> for String {
    fn from(value: BlockType) -> Self {
        value.name().to_string()
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Inline content of a block.
///
/// Current data stores an array of inline node JSON objects
/// (`{"type":"text","text":"…","marks":[{"type":"strong"}]}`); older chapters
/// store a plain string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BlockContent {
    Nodes(Vec<Value>),
    Legacy(String),
}

impl Default for BlockContent {
    fn default() -> Self {
        BlockContent::Nodes(Vec::new())
    }
}

/// The unit of persistence and diffing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub content: BlockContent,
    pub block_type: BlockType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attr: Option<Value>,
    #[serde(default)]
    pub order: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Block {
    /// A plain-text block with a single unmarked run.
    pub fn text_block(id: impl Into<String>, block_type: BlockType, text: &str) -> Self {
        let content = if text.is_empty() {
            Vec::new()
        } else {
            vec![serde_json::json!({ "type": "text", "text": text })]
        };
        Self {
            id: id.into(),
            text: text.to_string(),
            content: BlockContent::Nodes(content),
            block_type,
            attr: None,
            order: 0,
            updated_at: None,
        }
    }

    /// Attributes normalized for comparison: `null` and `{}` are equal.
    pub fn normalized_attr(&self) -> Value {
        match &self.attr {
            None | Some(Value::Null) => Value::Object(Default::default()),
            Some(value) => value.clone(),
        }
    }
}

/// Marks a block id as removed in a change set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tombstone {
    pub id: String,
    pub is_deleted: bool,
}

impl Tombstone {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            is_deleted: true,
        }
    }
}

/// One entry of a change set: a created/updated block or a tombstone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChangeSetEntry {
    Deleted(Tombstone),
    Upsert(Block),
}

impl ChangeSetEntry {
    pub fn id(&self) -> &str {
        match self {
            ChangeSetEntry::Deleted(tombstone) => &tombstone.id,
            ChangeSetEntry::Upsert(block) => &block.id,
        }
    }

    pub fn is_deleted(&self) -> bool {
        matches!(self, ChangeSetEntry::Deleted(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeltaAction {
    Create,
    Update,
    Delete,
}

/// Field-level patch record for one block.
///
/// Only the fields that changed are populated on `Update`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeltaBlock {
    pub id: String,
    pub action: DeltaAction,
    pub date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<BlockContent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_type: Option<BlockType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attr: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_type_names_round_trip() {
        for block_type in BlockType::KNOWN {
            assert_eq!(BlockType::from_name(block_type.name()), block_type);
        }
        assert_eq!(
            BlockType::from_name("mystery"),
            BlockType::Unknown("mystery".to_string())
        );
    }

    #[test]
    fn test_parse_block_json() {
        let json = r#"{
            "id": "a",
            "text": "Hello",
            "content": [{ "type": "text", "text": "Hello" }],
            "blockType": "describe",
            "order": 0
        }"#;

        let block: Block = serde_json::from_str(json).unwrap();
        assert_eq!(block.id, "a");
        assert_eq!(block.block_type, BlockType::Narration);
        assert!(matches!(block.content, BlockContent::Nodes(ref nodes) if nodes.len() == 1));
        assert_eq!(block.attr, None);
    }

    #[test]
    fn test_parse_legacy_string_content() {
        let json = r#"{ "id": "a", "content": "plain", "blockType": "comment" }"#;
        let block: Block = serde_json::from_str(json).unwrap();
        assert_eq!(block.content, BlockContent::Legacy("plain".to_string()));
        assert_eq!(block.block_type, BlockType::Comment);
    }

    #[test]
    fn test_serialize_uses_camel_case() {
        let block = Block::text_block("a", BlockType::Dialogue, "“Hi”");
        let value = serde_json::to_value(&block).unwrap();
        assert_eq!(value["blockType"], "double_quote");
        assert!(value.get("attr").is_none());
        assert!(value.get("updatedAt").is_none());
    }

    #[test]
    fn test_infer_dialogue_from_quote_prefix() {
        assert_eq!(BlockType::infer_from_text("  “Hello”"), BlockType::Dialogue);
        assert_eq!(BlockType::infer_from_text("— Wait."), BlockType::Dialogue);
        assert_eq!(BlockType::infer_from_text("The rain."), BlockType::Narration);
        assert_eq!(BlockType::infer_from_text(""), BlockType::Narration);
    }

    #[test]
    fn test_change_set_entry_untagged() {
        let entries: Vec<ChangeSetEntry> = serde_json::from_str(
            r#"[{ "id": "x", "isDeleted": true }, { "id": "y", "blockType": "divider" }]"#,
        )
        .unwrap();
        assert!(entries[0].is_deleted());
        assert_eq!(entries[1].id(), "y");
        assert!(!entries[1].is_deleted());
    }

    #[test]
    fn test_normalized_attr_treats_null_as_empty() {
        let mut block = Block::text_block("a", BlockType::Narration, "");
        let empty = block.normalized_attr();
        block.attr = Some(serde_json::json!({}));
        assert_eq!(block.normalized_attr(), empty);
    }
}
