//! Types exchanged between the orchestrator and its collaborators

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use crate::domain::value_objects::InstanceId;

use super::traits::{CheckpointStore, Clock, DispatchActivity, EventChannel, TimerService};

/// One dispatch, tagged with the outer attempt it belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchRequest {
    pub instance_id: InstanceId,
    pub outer_attempt: u32,
}

/// Winner of one race between the event channel and the window timer
#[derive(Debug, Clone, PartialEq)]
pub enum WaitOutcome {
    Event(Value),
    TimedOut,
}

/// Everything the orchestrator drives
#[derive(Clone)]
pub struct Collaborators {
    pub dispatcher: Arc<dyn DispatchActivity>,
    pub events: Arc<dyn EventChannel>,
    pub timers: Arc<dyn TimerService>,
    pub checkpoints: Arc<dyn CheckpointStore>,
    pub clock: Arc<dyn Clock>,
}
