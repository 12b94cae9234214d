//! # Voice Verify Core
//!
//! Domain layer and business logic of the voice verification service.
//! This crate contains the run cursor and challenge event types, the
//! collaborator contracts the orchestrator drives, the durable verification
//! orchestrator itself, the orchestration host, and the challenge glue that
//! issues and checks spoken codes.

pub mod domain;
pub mod errors;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::*;
pub use errors::*;
pub use services::*;
