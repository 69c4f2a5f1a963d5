//! Node and mark shapes of the Document Tree, with the rules binding each
//! node type to its on-screen element.

use crate::block::BlockType;
use crate::error::ModelError;
use crate::tree::{BlockAttrs, BlockNode, Document, Mark};
use serde_json::{json, Value};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Holds inline text content.
    TextBlock,
    /// Atomic, not focusable for caret placement.
    Leaf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeSpec {
    pub block_type: BlockType,
    pub kind: NodeKind,
    pub tag: &'static str,
    pub class: Option<&'static str>,
    pub attrs: &'static [&'static str],
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkSpec {
    pub mark: Mark,
    pub tag: &'static str,
}

#[derive(Debug, Clone)]
pub struct Schema {
    nodes: HashMap<BlockType, NodeSpec>,
    marks: Vec<MarkSpec>,
}

impl Schema {
    /// The chapter schema with every known block type.
    pub fn novel() -> Self {
        BlockType::KNOWN
            .into_iter()
            .fold(Schema::builder(), |builder, block_type| {
                builder.node(block_type)
            })
            .build()
    }

    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    pub fn node(&self, block_type: &BlockType) -> Option<&NodeSpec> {
        self.nodes.get(block_type)
    }

    pub fn marks(&self) -> &[MarkSpec] {
        &self.marks
    }

    /// Node type an element parses back into.
    pub fn parse_rule(&self, tag: &str, class: Option<&str>) -> Option<&NodeSpec> {
        self.nodes
            .values()
            .find(|spec| spec.tag == tag && spec.class == class)
    }

    pub fn mark_for_tag(&self, tag: &str) -> Option<Mark> {
        self.marks
            .iter()
            .find(|spec| spec.tag == tag)
            .map(|spec| spec.mark)
    }

    /// Validate a free-form attribute bag against the block type.
    pub fn attrs_from_json(
        &self,
        block_type: &BlockType,
        value: Option<&Value>,
    ) -> Result<BlockAttrs, ModelError> {
        let invalid = |reason: String| ModelError::InvalidAttrs {
            block_type: block_type.to_string(),
            reason,
        };

        let object = match value {
            None | Some(Value::Null) => None,
            Some(Value::Object(map)) => Some(map),
            Some(other) => return Err(invalid(format!("expected object, got {other}"))),
        };

        if *block_type == BlockType::Image {
            let field = |name: &str| -> Result<String, ModelError> {
                match object.and_then(|map| map.get(name)) {
                    None | Some(Value::Null) => Ok(String::new()),
                    Some(Value::String(s)) => Ok(s.clone()),
                    Some(other) => Err(invalid(format!("`{name}` must be a string, got {other}"))),
                }
            };
            return Ok(BlockAttrs::Image {
                src: field("src")?,
                alt: field("alt")?,
            });
        }

        match object {
            Some(map) if !map.is_empty() => {
                let keys: Vec<&str> = map.keys().map(String::as_str).collect();
                Err(invalid(format!("unexpected keys {keys:?}")))
            }
            _ => Ok(BlockAttrs::None),
        }
    }

    pub fn attrs_to_json(attrs: &BlockAttrs) -> Option<Value> {
        match attrs {
            BlockAttrs::None => None,
            BlockAttrs::Image { src, alt } => Some(json!({ "src": src, "alt": alt })),
        }
    }

    /// Render the document as HTML using each node's render rule.
    pub fn render_html(&self, doc: &Document) -> String {
        let mut out = String::new();
        for block in &doc.blocks {
            self.render_block(block, &mut out);
            out.push('\n');
        }
        out
    }

    fn render_block(&self, block: &BlockNode, out: &mut String) {
        let Some(spec) = self.node(&block.kind) else {
            return;
        };

        out.push('<');
        out.push_str(spec.tag);
        if let Some(id) = &block.id {
            out.push_str(&format!(" data-id=\"{}\"", escape(id)));
        }
        if let Some(class) = spec.class {
            out.push_str(&format!(" class=\"{class}\""));
        }
        if let BlockAttrs::Image { src, alt } = &block.attrs {
            out.push_str(&format!(" src=\"{}\" alt=\"{}\"", escape(src), escape(alt)));
        }

        if spec.kind == NodeKind::Leaf {
            out.push_str(" />");
            return;
        }
        out.push('>');

        for run in &block.content {
            let tags: Vec<&str> = run
                .marks
                .iter()
                .filter_map(|mark| self.marks.iter().find(|spec| spec.mark == *mark))
                .map(|spec| spec.tag)
                .collect();
            for tag in &tags {
                out.push_str(&format!("<{tag}>"));
            }
            out.push_str(&escape(&run.text));
            for tag in tags.iter().rev() {
                out.push_str(&format!("</{tag}>"));
            }
        }

        out.push_str(&format!("</{}>", spec.tag));
    }
}

impl Default for Schema {
    fn default() -> Self {
        Self::novel()
    }
}

#[derive(Debug, Default)]
pub struct SchemaBuilder {
    nodes: HashMap<BlockType, NodeSpec>,
}

impl SchemaBuilder {
    /// Register a node type with its standard render rule.
    pub fn node(mut self, block_type: BlockType) -> Self {
        let (kind, tag, class, attrs): (NodeKind, &'static str, Option<&'static str>, &'static [&'static str]) =
            match block_type {
                BlockType::Narration => (NodeKind::TextBlock, "p", None, &[]),
                BlockType::Dialogue => (NodeKind::TextBlock, "p", Some("dialogue"), &[]),
                BlockType::Monologue => (NodeKind::TextBlock, "p", Some("monologue"), &[]),
                BlockType::TermA => (NodeKind::TextBlock, "p", Some("term-a"), &[]),
                BlockType::TermB => (NodeKind::TextBlock, "p", Some("term-b"), &[]),
                BlockType::Comment => (NodeKind::TextBlock, "aside", None, &[]),
                BlockType::Divider => (NodeKind::Leaf, "hr", None, &[]),
                BlockType::Image => (NodeKind::Leaf, "img", None, &["src", "alt"]),
                BlockType::Unknown(_) => return self,
            };
        self.nodes.insert(
            block_type.clone(),
            NodeSpec {
                block_type,
                kind,
                tag,
                class,
                attrs,
            },
        );
        self
    }

    pub fn build(self) -> Schema {
        Schema {
            nodes: self.nodes,
            marks: vec![
                MarkSpec { mark: Mark::Strong, tag: "strong" },
                MarkSpec { mark: Mark::Em, tag: "em" },
                MarkSpec { mark: Mark::Underline, tag: "u" },
                MarkSpec { mark: Mark::Strike, tag: "s" },
            ],
        }
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
