//! # Block ↔ Document Conversion
//!
//! Pure mapping between the persisted Block list and the Document Tree.
//!
//! Corrupt blocks never stop a chapter from opening: an unknown block type
//! or unreadable inline content becomes an empty Narration node (logged).
//! The one fatal case is a schema without a node type for a known block
//! type, which means the chapter cannot be rendered at all.

use quire_model::{
    Block, BlockAttrs, BlockContent, BlockNode, Document, IdGenerator, ModelError, NodeKind,
    RandomIds, Schema, TextRun,
};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConvertError {
    #[error("Schema has no node type for block type `{0}`")]
    MissingNodeType(String),
}

/// Build the Document Tree for a chapter.
pub fn blocks_to_doc(blocks: &[Block], schema: &Schema) -> Result<Document, ConvertError> {
    let nodes = blocks
        .iter()
        .map(|block| block_to_node(block, schema))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Document::new(nodes))
}

fn block_to_node(block: &Block, schema: &Schema) -> Result<BlockNode, ConvertError> {
    let id = (!block.id.is_empty()).then(|| block.id.clone());

    if !block.block_type.is_known() {
        warn!(
            block_id = %block.id,
            block_type = %block.block_type,
            "unknown block type, substituting empty narration"
        );
        return Ok(BlockNode::empty_narration(id));
    }

    let spec = schema
        .node(&block.block_type)
        .ok_or_else(|| ConvertError::MissingNodeType(block.block_type.to_string()))?;

    let attrs = match schema.attrs_from_json(&block.block_type, block.attr.as_ref()) {
        Ok(attrs) => attrs,
        Err(err) => {
            warn!(block_id = %block.id, error = %err, "dropping invalid block attributes");
            schema
                .attrs_from_json(&block.block_type, None)
                .unwrap_or_default()
        }
    };

    if spec.kind == NodeKind::Leaf {
        if !matches!(&block.content, BlockContent::Nodes(nodes) if nodes.is_empty()) {
            debug!(block_id = %block.id, "ignoring inline content on leaf block");
        }
        return Ok(BlockNode::leaf(block.block_type.clone(), id, attrs));
    }

    match parse_content(&block.content) {
        Ok(runs) => {
            let mut node = BlockNode::textblock(block.block_type.clone(), id, runs);
            node.attrs = attrs;
            Ok(node)
        }
        Err(err) => {
            warn!(
                block_id = %block.id,
                error = %err,
                "malformed inline content, substituting empty narration"
            );
            Ok(BlockNode::empty_narration(id))
        }
    }
}

fn parse_content(content: &BlockContent) -> Result<Vec<TextRun>, ModelError> {
    match content {
        BlockContent::Nodes(nodes) => nodes.iter().map(TextRun::from_json).collect(),
        BlockContent::Legacy(text) => Ok(vec![TextRun::plain(text.clone())]),
    }
}

/// Read the Block list back out of a document, generating random ids for
/// nodes that lack one.
pub fn doc_to_blocks(doc: &Document) -> Vec<Block> {
    doc_to_blocks_with(doc, &RandomIds)
}

pub fn doc_to_blocks_with(doc: &Document, ids: &dyn IdGenerator) -> Vec<Block> {
    doc.blocks
        .iter()
        .enumerate()
        .map(|(order, node)| {
            let id = match &node.id {
                Some(id) => id.clone(),
                None => {
                    let id = ids.new_id();
                    warn!(order, id = %id, "block node without id, generated a new one");
                    id
                }
            };
            Block {
                id,
                text: node.text_content(),
                content: BlockContent::Nodes(node.content_json()),
                block_type: node.kind.clone(),
                attr: match &node.attrs {
                    BlockAttrs::None => None,
                    attrs => Schema::attrs_to_json(attrs),
                },
                order,
                updated_at: None,
            }
        })
        .collect()
}
