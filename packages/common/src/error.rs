use thiserror::Error;

/// Errors reading or writing stored chapters
#[derive(Error, Debug)]
pub enum CommonError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Expected a block array or an object with `blocks`, found {0}")]
    NotABlockList(&'static str),
}
