//! Out-of-band verdicts posted for a run

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::value_objects::InstanceId;
use crate::errors::ChannelError;

/// Event name under which verdicts are posted and awaited
pub const APPROVAL_EVENT: &str = "Approval";

/// A verdict from the external verification handler.
///
/// On the wire the payload is a bare JSON boolean.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeEvent {
    pub instance_id: InstanceId,
    pub approved: bool,
}

impl ChallengeEvent {
    pub fn new(instance_id: InstanceId, approved: bool) -> Self {
        Self {
            instance_id,
            approved,
        }
    }

    /// Payload posted to the event channel
    pub fn payload(&self) -> Value {
        Value::Bool(self.approved)
    }

    /// Decode a payload received from the event channel
    pub fn from_payload(instance_id: InstanceId, payload: &Value) -> Result<Self, ChannelError> {
        match payload {
            Value::Bool(approved) => Ok(Self::new(instance_id, *approved)),
            other => Err(ChannelError::Payload {
                event: APPROVAL_EVENT.to_string(),
                message: format!("expected a boolean, got {}", other),
            }),
        }
    }
}
