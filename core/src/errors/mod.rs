//! Domain-specific error types and error handling.

mod types;

// Re-export collaborator error types
pub use types::{ChannelError, CheckpointError, DispatchError};

use thiserror::Error;

/// Core domain errors
///
/// An exhausted run is not an error: it is the `Ok(false)` outcome of the
/// orchestrator. These variants cover caller mistakes and infrastructure faults.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Resource not found: {resource}")]
    NotFound { resource: String },

    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },

    // Bridge to collaborator error types
    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error(transparent)]
    Channel(#[from] ChannelError),

    #[error(transparent)]
    Checkpoint(#[from] CheckpointError),
}

pub type DomainResult<T> = Result<T, DomainError>;
