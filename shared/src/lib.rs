//! Shared utilities and common types for the Voice Verify workspace
//!
//! This crate provides functionality used across the workspace:
//! - Configuration types and loading
//! - Configuration error types
//! - Phone number utilities

pub mod config;
pub mod errors;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, CheckpointBackend, CheckpointConfig, Environment, LogFormat, LoggingConfig,
    OrchestratorSettings, TelephonyConfig,
};
pub use errors::{ConfigError, ConfigResult};
pub use utils::phone;
