//! Collaborator contracts driven by the orchestrator

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::domain::entities::RunCursor;
use crate::domain::value_objects::InstanceId;
use crate::errors::{ChannelError, CheckpointError, DispatchError};

use super::timer::TimerHandle;
use super::types::DispatchRequest;

/// Triggers delivery of a fresh challenge code.
///
/// Every call is a new side effect. The request carries the outer attempt it
/// belongs to so an implementation can recognise a repeated call.
#[async_trait]
pub trait DispatchActivity: Send + Sync {
    async fn dispatch(&self, request: &DispatchRequest) -> Result<(), DispatchError>;

    /// Drop whatever was kept for a finished run
    async fn release(&self, _instance_id: &InstanceId) -> Result<(), DispatchError> {
        Ok(())
    }
}

/// Durable mailbox keyed by instance id and event name.
///
/// Only runs between [`open`](EventChannel::open) and
/// [`close`](EventChannel::close) accept events.
#[async_trait]
pub trait EventChannel: Send + Sync {
    /// Start accepting events for a run; opening an open run is a no-op
    async fn open(&self, instance_id: &InstanceId) -> Result<(), ChannelError>;

    /// Post a value; it is delivered to the next waiter on the key, in posting order.
    ///
    /// Refused with [`ChannelError::Closed`] when the run is not open.
    async fn post(
        &self,
        instance_id: &InstanceId,
        event_name: &str,
        payload: Value,
    ) -> Result<(), ChannelError>;

    /// Wait for the next value posted on the key.
    ///
    /// Must be cancel-safe: dropping the returned future loses no posted value.
    async fn next(&self, instance_id: &InstanceId, event_name: &str) -> Result<Value, ChannelError>;

    /// Stop accepting events for a finished run and discard undelivered values
    async fn close(&self, instance_id: &InstanceId) -> Result<(), ChannelError>;
}

/// Produces cancelable timers for absolute deadlines
pub trait TimerService: Send + Sync {
    /// Arm a timer; a deadline in the past fires immediately
    fn schedule(&self, deadline: DateTime<Utc>) -> TimerHandle;
}

/// Source of the current time, consistent with the timer service
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Persists run cursors across suspension and restarts
#[async_trait]
pub trait CheckpointStore: Send + Sync {
    async fn load(&self, instance_id: &InstanceId) -> Result<Option<RunCursor>, CheckpointError>;

    async fn save(&self, cursor: &RunCursor) -> Result<(), CheckpointError>;

    /// Cursors of runs that have not reached a terminal phase
    async fn list_pending(&self) -> Result<Vec<RunCursor>, CheckpointError>;
}
