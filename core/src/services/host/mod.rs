//! Orchestration host
//!
//! Spawns one task per run, routes verdicts into the event channel, reports
//! run status and re-spawns checkpointed runs after a restart.

mod service;

#[cfg(test)]
mod tests;

pub use service::OrchestrationHost;
