//! # Quire Model
//!
//! Data types shared by every layer of the chapter editor.
//!
//! ```text
//! ┌──────────────────────────────┐      ┌──────────────────────────────┐
//! │ Block Model (block.rs)       │      │ Document Tree (tree.rs)      │
//! │  flat, persisted, diffed     │ ───▶ │  editable, position-indexed  │
//! │  Vec<Block>                  │ ◀─── │  Document { blocks }         │
//! └──────────────────────────────┘      └──────────────────────────────┘
//!                                              ▲
//!                                              │ node/mark shapes,
//!                                              │ parse/render rules
//!                                       ┌──────┴───────────────────────┐
//!                                       │ Schema (schema.rs)           │
//!                                       └──────────────────────────────┘
//! ```
//!
//! Conversion between the two representations lives in `quire-editor`.

pub mod block;
pub mod error;
pub mod id_generator;
pub mod schema;
pub mod tree;

pub use block::{
    Block, BlockContent, BlockType, ChangeSetEntry, DeltaAction, DeltaBlock, Tombstone,
};
pub use error::ModelError;
pub use id_generator::{IdGenerator, RandomIds, SequentialIds};
pub use schema::{MarkSpec, NodeKind, NodeSpec, Schema, SchemaBuilder};
pub use tree::{BlockAttrs, BlockNode, Document, Mark, ResolvedPos, TextRun};
