//! Durable verification orchestrator
//!
//! This module provides the control loop that:
//! - Dispatches a fresh challenge code once per outer attempt
//! - Races the next verdict against the window deadline
//! - Re-waits on rejections without extending the window
//! - Checkpoints its cursor before every suspension point so a restarted
//!   process resumes without re-dispatching

mod config;
mod service;
mod timer;
mod traits;
mod types;


pub use config::OrchestratorConfig;
pub use service::VerificationOrchestrator;
pub use timer::{TimerHandle, TimerId};
pub use traits::{CheckpointStore, Clock, DispatchActivity, EventChannel, TimerService};
pub use types::{Collaborators, DispatchRequest, WaitOutcome};
