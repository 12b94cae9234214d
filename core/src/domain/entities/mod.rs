//! Domain entities describing verification runs.

pub mod challenge_event;
pub mod run_cursor;
pub mod run_status;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use challenge_event::{ChallengeEvent, APPROVAL_EVENT};
pub use run_cursor::{RunCursor, RunPhase};
pub use run_status::RunStatus;
