//! Error types for the editor

use crate::converter::ConvertError;
use crate::transform::StepError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Conversion error: {0}")]
    Convert(#[from] ConvertError),

    #[error("Step error: {0}")]
    Step(#[from] StepError),

    #[error("Editor has been destroyed")]
    Destroyed,

    #[cfg(feature = "collaboration")]
    #[error("Replica error: {0}")]
    Replica(#[from] crate::crdt::ReplicaError),
}
