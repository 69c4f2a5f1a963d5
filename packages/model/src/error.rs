use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("Malformed inline node: {0}")]
    MalformedInline(String),

    #[error("Unknown mark type: {0}")]
    UnknownMark(String),

    #[error("Invalid attributes for {block_type}: {reason}")]
    InvalidAttrs { block_type: String, reason: String },
}
