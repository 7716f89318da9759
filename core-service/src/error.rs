use core_codec::{CodecError, InvocationOutcome};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("Runtime error: {0}")]
    Runtime(#[from] core_runtime::Error),

    #[error("Background task failed: {0}")]
    Task(String),
}

impl ServiceError {
    /// The codec error behind this failure, if there is one.
    pub fn as_codec(&self) -> Option<&CodecError> {
        match self {
            ServiceError::Codec(err) => Some(err),
            _ => None,
        }
    }

    /// Invocation outcome for codec failures.
    pub fn outcome(&self) -> Option<InvocationOutcome> {
        self.as_codec().map(CodecError::outcome)
    }
}

pub type Result<T> = std::result::Result<T, ServiceError>;
