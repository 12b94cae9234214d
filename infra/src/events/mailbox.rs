//! Keyed mailbox backed by one unbounded tokio queue per `(instance, event)` pair

use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::{mpsc, Mutex as AsyncMutex};
use tracing::debug;

use vv_core::domain::value_objects::InstanceId;
use vv_core::errors::ChannelError;
use vv_core::services::orchestrator::EventChannel;

type Key = (InstanceId, String);

struct Mailbox {
    sender: mpsc::UnboundedSender<Value>,
    receiver: Arc<AsyncMutex<mpsc::UnboundedReceiver<Value>>>,
}

impl Mailbox {
    fn new() -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            sender,
            receiver: Arc::new(AsyncMutex::new(receiver)),
        }
    }
}

#[derive(Default)]
struct Registry {
    mailboxes: HashMap<Key, Mailbox>,
    /// Runs currently accepting events
    open: HashSet<InstanceId>,
}

/// In-process event channel.
///
/// The registry lock is held only to look up or create a queue. Waiting
/// happens on the per-key queue, so waiters of different runs never contend.
/// Nothing is kept for a run once it is closed, so the registry holds only
/// runs in progress.
#[derive(Default)]
pub struct InMemoryEventChannel {
    registry: Mutex<Registry>,
}

impl InMemoryEventChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of mailboxes currently allocated
    pub fn mailbox_count(&self) -> usize {
        self.registry
            .lock()
            .map(|registry| registry.mailboxes.len())
            .unwrap_or(0)
    }

    /// Number of runs currently accepting events
    pub fn open_count(&self) -> usize {
        self.registry
            .lock()
            .map(|registry| registry.open.len())
            .unwrap_or(0)
    }

    fn registry(&self) -> Result<MutexGuard<'_, Registry>, ChannelError> {
        self.registry
            .lock()
            .map_err(|_| ChannelError::Backend("mailbox registry lock poisoned".to_string()))
    }

    fn closed_error(instance_id: &InstanceId) -> ChannelError {
        ChannelError::Closed {
            instance_id: instance_id.to_string(),
        }
    }
}

impl Registry {
    fn mailbox(&mut self, instance_id: &InstanceId, event_name: &str) -> Result<&Mailbox, ChannelError> {
        if !self.open.contains(instance_id) {
            return Err(InMemoryEventChannel::closed_error(instance_id));
        }
        Ok(self
            .mailboxes
            .entry((instance_id.clone(), event_name.to_string()))
            .or_insert_with(Mailbox::new))
    }
}

#[async_trait]
impl EventChannel for InMemoryEventChannel {
    async fn open(&self, instance_id: &InstanceId) -> Result<(), ChannelError> {
        if self.registry()?.open.insert(instance_id.clone()) {
            debug!(instance_id = %instance_id, "Mailboxes opened");
        }
        Ok(())
    }

    async fn post(
        &self,
        instance_id: &InstanceId,
        event_name: &str,
        payload: Value,
    ) -> Result<(), ChannelError> {
        let mut registry = self.registry()?;
        registry
            .mailbox(instance_id, event_name)?
            .sender
            .send(payload)
            .map_err(|_| Self::closed_error(instance_id))?;

        debug!(instance_id = %instance_id, event_name, "Event posted");
        Ok(())
    }

    async fn next(&self, instance_id: &InstanceId, event_name: &str) -> Result<Value, ChannelError> {
        let receiver = self
            .registry()?
            .mailbox(instance_id, event_name)?
            .receiver
            .clone();

        // Both the lock and recv are cancel-safe: a dropped waiter loses nothing
        let mut receiver = receiver.lock().await;
        receiver
            .recv()
            .await
            .ok_or_else(|| Self::closed_error(instance_id))
    }

    async fn close(&self, instance_id: &InstanceId) -> Result<(), ChannelError> {
        let mut registry = self.registry()?;
        registry.mailboxes.retain(|(id, _), _| id != instance_id);
        registry.open.remove(instance_id);
        debug!(instance_id = %instance_id, "Mailboxes closed");
        Ok(())
    }
}
