//! In-memory checkpoint store

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

use vv_core::domain::entities::RunCursor;
use vv_core::domain::value_objects::InstanceId;
use vv_core::errors::CheckpointError;
use vv_core::services::orchestrator::CheckpointStore;

/// Process-local cursor map; runs do not survive a restart
#[derive(Default)]
pub struct InMemoryCheckpointStore {
    cursors: RwLock<HashMap<InstanceId, RunCursor>>,
}

impl InMemoryCheckpointStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.cursors.read().map(|cursors| cursors.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned() -> CheckpointError {
    CheckpointError::Backend("checkpoint map lock poisoned".to_string())
}

#[async_trait]
impl CheckpointStore for InMemoryCheckpointStore {
    async fn load(&self, instance_id: &InstanceId) -> Result<Option<RunCursor>, CheckpointError> {
        let cursors = self.cursors.read().map_err(|_| poisoned())?;
        Ok(cursors.get(instance_id).cloned())
    }

    async fn save(&self, cursor: &RunCursor) -> Result<(), CheckpointError> {
        let mut cursors = self.cursors.write().map_err(|_| poisoned())?;
        cursors.insert(cursor.instance_id.clone(), cursor.clone());
        Ok(())
    }

    async fn list_pending(&self) -> Result<Vec<RunCursor>, CheckpointError> {
        let cursors = self.cursors.read().map_err(|_| poisoned())?;
        let mut pending: Vec<RunCursor> = cursors
            .values()
            .filter(|cursor| !cursor.is_terminal())
            .cloned()
            .collect();
        pending.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(pending)
    }
}
