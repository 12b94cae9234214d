//! Externally visible status of a run

use serde::{Deserialize, Serialize};

/// Status reported to callers polling a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunStatus {
    /// Checkpointed but not executing in this process
    Pending,
    /// Executing in this process
    Running,
    Completed { authorized: bool },
    /// Stopped by an infrastructure fault
    Failed { reason: String },
}

impl RunStatus {
    pub fn is_finished(&self) -> bool {
        matches!(self, RunStatus::Completed { .. } | RunStatus::Failed { .. })
    }
}
