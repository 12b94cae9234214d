//! Error types raised by the collaborators the orchestrator drives

use thiserror::Error;

/// Failures while generating, recording or delivering a challenge code
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("Voice delivery failed: {0}")]
    Delivery(String),

    #[error("Issued code storage failed: {0}")]
    Storage(String),
}

/// Failures of the external event channel
#[derive(Error, Debug)]
pub enum ChannelError {
    #[error("Malformed payload for event '{event}': {message}")]
    Payload { event: String, message: String },

    #[error("No open event channel for instance {instance_id}")]
    Closed { instance_id: String },

    #[error("Event channel failure: {0}")]
    Backend(String),
}

/// Failures while persisting or loading run cursors
#[derive(Error, Debug)]
pub enum CheckpointError {
    #[error("Cursor serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Checkpoint backend failure: {0}")]
    Backend(String),
}
