//! # Infrastructure Layer
//!
//! This crate implements the infrastructure layer of the voice verification
//! service. It provides the concrete collaborators the orchestrator drives
//! and the wiring that assembles them.
//!
//! ## Architecture
//!
//! The infrastructure layer contains:
//! - **Events**: in-process keyed mailbox for `Approval` verdicts
//! - **Timer**: tokio-backed timers and the clock they share
//! - **Checkpoint**: in-memory and Redis run cursor stores
//! - **Voice**: mock voice gateway, code generator and issued code store
//! - **Telemetry**: tracing subscriber setup
//! - **Runtime**: assembly of the host and verifier from configuration
//!
//! ## Features
//!
//! - `redis-store`: Enable the Redis checkpoint store (default)

// Re-export core types for convenience
pub use vv_core::errors::*;

use vv_shared::ConfigError;

/// Event channel module - keyed mailbox implementation
pub mod events;

/// Timer module - tokio timers and the anchored clock
pub mod timer;

/// Checkpoint module - run cursor persistence
pub mod checkpoint;

/// Voice module - challenge delivery collaborators
pub mod voice;

/// Telemetry module - tracing setup
pub mod telemetry;

/// Runtime module - service assembly
pub mod runtime;

pub use runtime::{initialize, VoiceVerifyRuntime};

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Redis checkpoint backend error
    #[cfg(feature = "redis-store")]
    #[error("Checkpoint backend error: {0}")]
    Redis(#[from] redis::RedisError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration loading or validation error
    #[error(transparent)]
    ConfigLoad(#[from] ConfigError),

    /// Domain error raised while assembling services
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Tracing subscriber error
    #[error("Telemetry error: {0}")]
    Telemetry(String),
}
