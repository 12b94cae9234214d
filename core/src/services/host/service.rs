//! Host that owns the run tasks of one process

use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::watch;
use tracing;

use crate::domain::entities::{ChallengeEvent, RunStatus, APPROVAL_EVENT};
use crate::domain::value_objects::InstanceId;
use crate::errors::{DomainError, DomainResult};
use crate::services::orchestrator::{
    CheckpointStore, Collaborators, EventChannel, OrchestratorConfig, VerificationOrchestrator,
};

type RunRegistry = Arc<Mutex<HashMap<InstanceId, watch::Receiver<RunStatus>>>>;

/// Starts runs and exposes their status
pub struct OrchestrationHost {
    orchestrator: Arc<VerificationOrchestrator>,
    events: Arc<dyn EventChannel>,
    checkpoints: Arc<dyn CheckpointStore>,
    /// Runs of this process that have not finished; finished runs are
    /// answered from their checkpoint
    runs: RunRegistry,
}

impl OrchestrationHost {
    pub fn new(config: OrchestratorConfig, deps: Collaborators) -> Self {
        let events = deps.events.clone();
        let checkpoints = deps.checkpoints.clone();
        Self {
            orchestrator: Arc::new(VerificationOrchestrator::new(config, deps)),
            events,
            checkpoints,
            runs: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn orchestrator(&self) -> &VerificationOrchestrator {
        &self.orchestrator
    }

    /// Start a run on its own task.
    ///
    /// # Arguments
    ///
    /// * `instance_id` - Caller-chosen id, generated when absent
    ///
    /// # Returns
    ///
    /// * `Ok(InstanceId)` - Id of the started run
    /// * `Err(DomainError::Conflict)` - A run with this id is still live
    pub fn start_run(&self, instance_id: Option<InstanceId>) -> DomainResult<InstanceId> {
        let instance_id = instance_id.unwrap_or_else(InstanceId::generate);

        let mut runs = self.lock_runs()?;
        if runs.contains_key(&instance_id) {
            return Err(DomainError::Conflict {
                message: format!("Run {} is already in progress", instance_id),
            });
        }

        self.spawn_run(&mut runs, instance_id.clone());
        Ok(instance_id)
    }

    /// Post an event for a run
    pub async fn raise_event(
        &self,
        instance_id: &InstanceId,
        event_name: &str,
        payload: Value,
    ) -> DomainResult<()> {
        self.events.post(instance_id, event_name, payload).await?;
        tracing::debug!(instance_id = %instance_id, event_name, "Event raised");
        Ok(())
    }

    /// Post an `Approval` verdict for a run
    pub async fn approve(&self, instance_id: &InstanceId, approved: bool) -> DomainResult<()> {
        let verdict = ChallengeEvent::new(instance_id.clone(), approved);
        self.raise_event(instance_id, APPROVAL_EVENT, verdict.payload())
            .await
    }

    /// Current status of a run, falling back to its checkpoint
    pub async fn status(&self, instance_id: &InstanceId) -> DomainResult<RunStatus> {
        if let Some(status) = self.live_status(instance_id)? {
            return Ok(status.borrow().clone());
        }

        match self.checkpoints.load(instance_id).await? {
            Some(cursor) => Ok(match cursor.outcome() {
                Some(authorized) => RunStatus::Completed { authorized },
                None => RunStatus::Pending,
            }),
            None => Err(DomainError::NotFound {
                resource: format!("run {}", instance_id),
            }),
        }
    }

    /// Wait until a run started by this host finishes.
    ///
    /// A run that already finished is answered from its checkpoint.
    pub async fn wait_for_completion(&self, instance_id: &InstanceId) -> DomainResult<RunStatus> {
        let mut status = match self.live_status(instance_id)? {
            Some(status) => status,
            None => return self.status(instance_id).await,
        };

        let finished = match status.wait_for(RunStatus::is_finished).await {
            Ok(finished) => finished.clone(),
            // The task went away without reporting
            Err(_) => RunStatus::Failed {
                reason: "run task ended unexpectedly".to_string(),
            },
        };
        Ok(finished)
    }

    /// Re-spawn every checkpointed run that has not finished and is not
    /// already running here. Returns the resumed ids.
    pub async fn resume_pending(&self) -> DomainResult<Vec<InstanceId>> {
        let pending = self.checkpoints.list_pending().await?;

        let mut runs = self.lock_runs()?;
        let mut resumed = Vec::new();
        for cursor in pending {
            if runs.contains_key(&cursor.instance_id) {
                continue;
            }
            self.spawn_run(&mut runs, cursor.instance_id.clone());
            resumed.push(cursor.instance_id);
        }

        tracing::info!(
            resumed = resumed.len(),
            event = "runs_resumed",
            "Resumed pending verification runs"
        );
        Ok(resumed)
    }

    fn spawn_run(
        &self,
        runs: &mut HashMap<InstanceId, watch::Receiver<RunStatus>>,
        instance_id: InstanceId,
    ) {
        let (tx, rx) = watch::channel(RunStatus::Running);
        runs.insert(instance_id.clone(), rx);

        let orchestrator = self.orchestrator.clone();
        let registry = self.runs.clone();
        tokio::spawn(async move {
            let status = match orchestrator.run(&instance_id).await {
                Ok(authorized) => RunStatus::Completed { authorized },
                Err(e) => {
                    tracing::error!(
                        instance_id = %instance_id,
                        error = %e,
                        event = "run_failed",
                        "Verification run failed"
                    );
                    RunStatus::Failed {
                        reason: e.to_string(),
                    }
                }
            };

            // Publish and unregister together so a restart never sees a stale entry
            match registry.lock() {
                Ok(mut runs) => {
                    let _ = tx.send(status);
                    runs.remove(&instance_id);
                }
                Err(_) => {
                    let _ = tx.send(status);
                }
            }
        });
    }

    /// Number of runs this host is still driving
    pub fn active_runs(&self) -> usize {
        self.runs.lock().map(|runs| runs.len()).unwrap_or(0)
    }

    fn live_status(
        &self,
        instance_id: &InstanceId,
    ) -> DomainResult<Option<watch::Receiver<RunStatus>>> {
        Ok(self.lock_runs()?.get(instance_id).cloned())
    }

    fn lock_runs(
        &self,
    ) -> DomainResult<MutexGuard<'_, HashMap<InstanceId, watch::Receiver<RunStatus>>>> {
        self.runs.lock().map_err(|_| DomainError::Internal {
            message: "run registry lock poisoned".to_string(),
        })
    }
}
