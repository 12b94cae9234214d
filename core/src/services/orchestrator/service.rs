//! Main verification orchestrator implementation

use chrono::{DateTime, Utc};
use tracing;

use crate::domain::entities::{ChallengeEvent, RunCursor, APPROVAL_EVENT};
use crate::domain::value_objects::InstanceId;
use crate::errors::DomainResult;

use super::config::OrchestratorConfig;
use super::timer::TimerHandle;
use super::types::{Collaborators, DispatchRequest, WaitOutcome};

/// Durable control loop of one verification protocol.
///
/// One orchestrator serves any number of runs; each call to [`run`](Self::run)
/// drives a single instance on the caller's task.
pub struct VerificationOrchestrator {
    config: OrchestratorConfig,
    deps: Collaborators,
}

impl VerificationOrchestrator {
    /// Create a new orchestrator
    ///
    /// # Arguments
    ///
    /// * `config` - Validated loop limits
    /// * `deps` - Dispatch activity, event channel, timers, checkpoints and clock
    pub fn new(config: OrchestratorConfig, deps: Collaborators) -> Self {
        Self { config, deps }
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Drive a run to a terminal state and return whether it was authorized.
    ///
    /// Resumes from the stored cursor when one exists. A run already in a
    /// terminal state returns its stored result without side effects.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - A verdict approved the challenge
    /// * `Ok(false)` - Every outer attempt ended without approval
    /// * `Err(DomainError)` - The event channel or checkpoint store failed
    pub async fn run(&self, instance_id: &InstanceId) -> DomainResult<bool> {
        let mut cursor = match self.deps.checkpoints.load(instance_id).await? {
            Some(cursor) => {
                if let Some(outcome) = cursor.outcome() {
                    tracing::info!(
                        instance_id = %instance_id,
                        authorized = outcome,
                        event = "run_already_complete",
                        "Run already reached a terminal state"
                    );
                    return Ok(outcome);
                }
                tracing::info!(
                    instance_id = %instance_id,
                    outer_attempt = cursor.outer_attempt,
                    inner_attempt = cursor.inner_attempt,
                    dispatch_issued = cursor.dispatch_issued(),
                    event = "run_resumed",
                    "Resuming verification run from checkpoint"
                );
                cursor
            }
            None => {
                tracing::info!(
                    instance_id = %instance_id,
                    max_outer_attempts = self.config.max_outer_attempts,
                    event = "run_started",
                    "Starting verification run"
                );
                RunCursor::new(instance_id.clone(), self.now())
            }
        };

        self.deps.events.open(instance_id).await?;

        while cursor.outer_attempt < self.config.max_outer_attempts {
            let deadline = self.open_window(&mut cursor).await?;

            if self.race_window(&mut cursor, deadline).await? {
                cursor.authorize(self.now());
                return self.finish(cursor).await;
            }

            let next = cursor.outer_attempt + 1;
            if next >= self.config.max_outer_attempts {
                break;
            }
            cursor.begin_outer(next, self.now());
            self.deps.checkpoints.save(&cursor).await?;
        }

        cursor.exhaust(self.now());
        self.finish(cursor).await
    }

    /// Issue the dispatch for the current outer attempt and compute its
    /// deadline, or recover both from the cursor when already issued.
    async fn open_window(&self, cursor: &mut RunCursor) -> DomainResult<DateTime<Utc>> {
        if cursor.dispatch_issued() {
            if let Some(deadline) = cursor.pending_deadline() {
                tracing::debug!(
                    instance_id = %cursor.instance_id,
                    outer_attempt = cursor.outer_attempt,
                    deadline = %deadline,
                    "Dispatch already issued, re-arming window"
                );
                return Ok(deadline);
            }
        }

        // Checkpoint the intent before the side effect
        self.deps.checkpoints.save(cursor).await?;

        let request = DispatchRequest {
            instance_id: cursor.instance_id.clone(),
            outer_attempt: cursor.outer_attempt,
        };
        match self.deps.dispatcher.dispatch(&request).await {
            Ok(()) => tracing::info!(
                instance_id = %cursor.instance_id,
                outer_attempt = cursor.outer_attempt,
                event = "challenge_dispatched",
                "Challenge code dispatched"
            ),
            // Not retried here: the window still opens and simply times out
            Err(e) => tracing::warn!(
                instance_id = %cursor.instance_id,
                outer_attempt = cursor.outer_attempt,
                error = %e,
                event = "challenge_dispatch_failed",
                "Challenge dispatch failed"
            ),
        }

        let now = self.now();
        let deadline = now + self.config.window();
        cursor.mark_dispatched(deadline, now);
        self.deps.checkpoints.save(cursor).await?;
        Ok(deadline)
    }

    /// Race verdicts against one window timer.
    ///
    /// The timer is released on every exit path, including errors.
    async fn race_window(
        &self,
        cursor: &mut RunCursor,
        deadline: DateTime<Utc>,
    ) -> DomainResult<bool> {
        let mut timer = self.deps.timers.schedule(deadline);
        let result = self.await_verdicts(cursor, &mut timer).await;

        let timer_id = timer.id();
        if timer.has_fired() {
            tracing::debug!(instance_id = %cursor.instance_id, timer_id, "Window timer fired");
        } else {
            timer.cancel();
            tracing::debug!(instance_id = %cursor.instance_id, timer_id, "Window timer canceled");
        }

        result
    }

    async fn await_verdicts(
        &self,
        cursor: &mut RunCursor,
        timer: &mut TimerHandle,
    ) -> DomainResult<bool> {
        while cursor.inner_attempt <= self.config.max_inner_attempts {
            let outcome = tokio::select! {
                // On a tie the verdict wins
                biased;
                payload = self.deps.events.next(&cursor.instance_id, APPROVAL_EVENT) => {
                    WaitOutcome::Event(payload?)
                }
                _ = timer.fired() => WaitOutcome::TimedOut,
            };

            let payload = match outcome {
                WaitOutcome::TimedOut => {
                    tracing::info!(
                        instance_id = %cursor.instance_id,
                        outer_attempt = cursor.outer_attempt,
                        inner_attempt = cursor.inner_attempt,
                        event = "challenge_window_expired",
                        "Challenge window expired without approval"
                    );
                    return Ok(false);
                }
                WaitOutcome::Event(payload) => payload,
            };

            let approved = match ChallengeEvent::from_payload(cursor.instance_id.clone(), &payload) {
                Ok(event) => event.approved,
                Err(e) => {
                    tracing::warn!(
                        instance_id = %cursor.instance_id,
                        error = %e,
                        "Treating malformed verdict as a rejection"
                    );
                    false
                }
            };

            if approved {
                tracing::info!(
                    instance_id = %cursor.instance_id,
                    outer_attempt = cursor.outer_attempt,
                    inner_attempt = cursor.inner_attempt,
                    event = "challenge_approved",
                    "Challenge approved"
                );
                return Ok(true);
            }

            tracing::info!(
                instance_id = %cursor.instance_id,
                outer_attempt = cursor.outer_attempt,
                inner_attempt = cursor.inner_attempt,
                event = "challenge_rejected",
                "Challenge rejected, waiting within the same window"
            );
            cursor.record_rejection(self.now());
            self.deps.checkpoints.save(cursor).await?;
        }

        tracing::warn!(
            instance_id = %cursor.instance_id,
            outer_attempt = cursor.outer_attempt,
            max_inner_attempts = self.config.max_inner_attempts,
            event = "inner_attempts_exhausted",
            "Too many rejections, abandoning challenge window"
        );
        Ok(false)
    }

    /// Persist the terminal cursor, then release the run's mailboxes and
    /// its issued code
    async fn finish(&self, cursor: RunCursor) -> DomainResult<bool> {
        self.deps.checkpoints.save(&cursor).await?;

        if let Err(e) = self.deps.events.close(&cursor.instance_id).await {
            tracing::warn!(
                instance_id = %cursor.instance_id,
                error = %e,
                "Failed to close event mailboxes"
            );
        }
        if let Err(e) = self.deps.dispatcher.release(&cursor.instance_id).await {
            tracing::warn!(
                instance_id = %cursor.instance_id,
                error = %e,
                "Failed to release challenge state"
            );
        }

        let authorized = cursor.authorized();
        tracing::info!(
            instance_id = %cursor.instance_id,
            authorized,
            outer_attempts_used = cursor.outer_attempt + 1,
            event = "run_finished",
            "Verification run finished"
        );
        Ok(authorized)
    }

    fn now(&self) -> DateTime<Utc> {
        self.deps.clock.now()
    }
}
