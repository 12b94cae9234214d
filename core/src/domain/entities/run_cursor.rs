//! Serializable checkpoint of a verification run
//!
//! The cursor is everything needed to resume a suspended run: which outer and
//! inner attempt it is in, whether the dispatch for the current outer attempt
//! was already issued, and the absolute deadline of the open window.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::InstanceId;

/// Position of a run in the `Dispatching -> Racing -> {Authorized, OuterExhausted}` machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RunPhase {
    /// About to issue the dispatch for the current outer attempt
    Dispatching,
    /// Waiting for a verdict or the window deadline
    Racing { deadline: DateTime<Utc> },
    /// Terminal: a verdict approved the challenge
    Authorized,
    /// Terminal: every outer attempt ended without approval
    OuterExhausted,
}

impl RunPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunPhase::Authorized | RunPhase::OuterExhausted)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunCursor {
    pub instance_id: InstanceId,
    pub outer_attempt: u32,
    /// Verdicts already consumed in the current window
    pub inner_attempt: u32,
    pub phase: RunPhase,
    /// Outer attempt whose dispatch has been issued, if any
    pub dispatched_for: Option<u32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RunCursor {
    /// Cursor of a run that has not dispatched anything yet
    pub fn new(instance_id: InstanceId, now: DateTime<Utc>) -> Self {
        Self {
            instance_id,
            outer_attempt: 0,
            inner_attempt: 0,
            phase: RunPhase::Dispatching,
            dispatched_for: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.phase.is_terminal()
    }

    pub fn authorized(&self) -> bool {
        matches!(self.phase, RunPhase::Authorized)
    }

    /// Final result of a finished run
    pub fn outcome(&self) -> Option<bool> {
        match self.phase {
            RunPhase::Authorized => Some(true),
            RunPhase::OuterExhausted => Some(false),
            _ => None,
        }
    }

    /// Whether the dispatch for the current outer attempt already went out
    pub fn dispatch_issued(&self) -> bool {
        self.dispatched_for == Some(self.outer_attempt)
    }

    /// Deadline of the open window
    pub fn pending_deadline(&self) -> Option<DateTime<Utc>> {
        match self.phase {
            RunPhase::Racing { deadline } => Some(deadline),
            _ => None,
        }
    }

    /// Move to a fresh outer attempt; the next step is a new dispatch
    pub fn begin_outer(&mut self, outer_attempt: u32, now: DateTime<Utc>) {
        self.outer_attempt = outer_attempt;
        self.inner_attempt = 0;
        self.phase = RunPhase::Dispatching;
        self.updated_at = now;
    }

    /// Record that the dispatch went out and the window closes at `deadline`
    pub fn mark_dispatched(&mut self, deadline: DateTime<Utc>, now: DateTime<Utc>) {
        self.dispatched_for = Some(self.outer_attempt);
        self.phase = RunPhase::Racing { deadline };
        self.updated_at = now;
    }

    /// Record a consumed rejection within the open window
    pub fn record_rejection(&mut self, now: DateTime<Utc>) {
        self.inner_attempt += 1;
        self.updated_at = now;
    }

    pub fn authorize(&mut self, now: DateTime<Utc>) {
        self.phase = RunPhase::Authorized;
        self.updated_at = now;
    }

    pub fn exhaust(&mut self, now: DateTime<Utc>) {
        self.phase = RunPhase::OuterExhausted;
        self.updated_at = now;
    }
}
