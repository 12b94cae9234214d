//! Unit tests for the orchestration host

use chrono::Duration as ChronoDuration;
use serde_json::json;
use std::time::Duration;

use crate::domain::entities::{RunCursor, RunStatus, APPROVAL_EVENT};
use crate::domain::value_objects::InstanceId;
use crate::errors::DomainError;
use crate::services::host::OrchestrationHost;
use crate::services::orchestrator::tests::mocks::*;
use crate::services::orchestrator::Clock;

fn host(harness: &Harness, max_outer_attempts: u32) -> OrchestrationHost {
    OrchestrationHost::new(config(max_outer_attempts), harness.collaborators())
}

#[tokio::test(start_paused = true)]
async fn test_start_run_and_approve() {
    let harness = Harness::new();
    let host = host(&harness, 3);

    let id = host.start_run(None).unwrap();
    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(host.status(&id).await.unwrap(), RunStatus::Running);

    host.approve(&id, true).await.unwrap();

    let status = host.wait_for_completion(&id).await.unwrap();
    assert_eq!(status, RunStatus::Completed { authorized: true });
    assert_eq!(harness.dispatcher.count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_generated_ids_are_unique() {
    let harness = Harness::new();
    let host = host(&harness, 1);

    let first = host.start_run(None).unwrap();
    let second = host.start_run(None).unwrap();

    assert_ne!(first, second);
}

#[tokio::test(start_paused = true)]
async fn test_duplicate_live_run_is_rejected() {
    let harness = Harness::new();
    let host = host(&harness, 2);
    let id = InstanceId::new("duplicate");

    host.start_run(Some(id.clone())).unwrap();
    let result = host.start_run(Some(id.clone()));

    assert!(matches!(result, Err(DomainError::Conflict { .. })));
}

#[tokio::test(start_paused = true)]
async fn test_restarting_finished_run_returns_stored_result() {
    let harness = Harness::new();
    let host = host(&harness, 1);
    let id = InstanceId::new("finished");

    host.start_run(Some(id.clone())).unwrap();
    assert_eq!(
        host.wait_for_completion(&id).await.unwrap(),
        RunStatus::Completed { authorized: false }
    );

    host.start_run(Some(id.clone())).unwrap();
    assert_eq!(
        host.wait_for_completion(&id).await.unwrap(),
        RunStatus::Completed { authorized: false }
    );
    assert_eq!(harness.dispatcher.count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_raise_event_reaches_run() {
    let harness = Harness::new();
    let host = host(&harness, 1);
    let id = host.start_run(Some(InstanceId::new("raised"))).unwrap();

    host.raise_event(&id, APPROVAL_EVENT, json!(false)).await.unwrap();
    host.raise_event(&id, APPROVAL_EVENT, json!(true)).await.unwrap();

    assert_eq!(
        host.wait_for_completion(&id).await.unwrap(),
        RunStatus::Completed { authorized: true }
    );
}

#[tokio::test(start_paused = true)]
async fn test_status_of_unknown_run() {
    let harness = Harness::new();
    let host = host(&harness, 1);

    let result = host.status(&InstanceId::new("nobody")).await;

    assert!(matches!(result, Err(DomainError::NotFound { .. })));
}

#[tokio::test(start_paused = true)]
async fn test_status_from_checkpoint() {
    let harness = Harness::new();
    let host = host(&harness, 1);
    let now = harness.clock.now();

    let pending = RunCursor::new(InstanceId::new("pending"), now);
    let mut done = RunCursor::new(InstanceId::new("done"), now);
    done.authorize(now);
    harness.checkpoints.insert(pending);
    harness.checkpoints.insert(done);

    assert_eq!(
        host.status(&InstanceId::new("pending")).await.unwrap(),
        RunStatus::Pending
    );
    assert_eq!(
        host.status(&InstanceId::new("done")).await.unwrap(),
        RunStatus::Completed { authorized: true }
    );
}

#[tokio::test(start_paused = true)]
async fn test_resume_pending_runs() {
    let harness = Harness::new();
    let now = harness.clock.now();

    let mut racing = RunCursor::new(InstanceId::new("racing"), now);
    racing.mark_dispatched(now + ChronoDuration::seconds(40), now);
    let mut done = RunCursor::new(InstanceId::new("done"), now);
    done.exhaust(now);
    harness.checkpoints.insert(racing);
    harness.checkpoints.insert(done);

    let host = host(&harness, 1);
    let resumed = host.resume_pending().await.unwrap();

    assert_eq!(resumed, vec![InstanceId::new("racing")]);
    host.approve(&InstanceId::new("racing"), true).await.unwrap();
    assert_eq!(
        host.wait_for_completion(&InstanceId::new("racing")).await.unwrap(),
        RunStatus::Completed { authorized: true }
    );
    // The window was already dispatched before the restart
    assert_eq!(harness.dispatcher.count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_resume_skips_live_runs() {
    let harness = Harness::new();
    let host = host(&harness, 1);
    let id = host.start_run(Some(InstanceId::new("live"))).unwrap();
    tokio::time::sleep(Duration::from_secs(1)).await;

    let resumed = host.resume_pending().await.unwrap();

    assert!(resumed.is_empty());
    assert_eq!(host.status(&id).await.unwrap(), RunStatus::Running);
}

#[tokio::test(start_paused = true)]
async fn test_infrastructure_fault_is_reported_as_failed() {
    let harness = Harness::with_parts(
        MockDispatcher::new(false),
        MockEventChannel::new(true),
        MockCheckpointStore::new(),
    );
    let host = host(&harness, 1);
    let id = host.start_run(None).unwrap();

    let status = host.wait_for_completion(&id).await.unwrap();

    assert!(matches!(status, RunStatus::Failed { .. }));
}

#[tokio::test(start_paused = true)]
async fn test_finished_runs_are_unregistered() {
    let harness = Harness::new();
    let host = host(&harness, 2);
    let approved = host.start_run(Some(InstanceId::new("approved"))).unwrap();
    let exhausted = host.start_run(Some(InstanceId::new("exhausted"))).unwrap();
    assert_eq!(host.active_runs(), 2);

    host.approve(&approved, true).await.unwrap();
    host.wait_for_completion(&approved).await.unwrap();
    assert_eq!(host.active_runs(), 1);

    host.wait_for_completion(&exhausted).await.unwrap();
    assert_eq!(host.active_runs(), 0);

    // Finished runs are still reported from their checkpoints
    assert_eq!(
        host.status(&approved).await.unwrap(),
        RunStatus::Completed { authorized: true }
    );
    assert_eq!(
        host.wait_for_completion(&exhausted).await.unwrap(),
        RunStatus::Completed { authorized: false }
    );
}

#[tokio::test(start_paused = true)]
async fn test_failed_run_is_unregistered_after_reporting() {
    let harness = Harness::with_parts(
        MockDispatcher::new(false),
        MockEventChannel::new(true),
        MockCheckpointStore::new(),
    );
    let host = host(&harness, 1);
    let id = host.start_run(None).unwrap();

    let status = host.wait_for_completion(&id).await.unwrap();

    assert!(matches!(status, RunStatus::Failed { .. }));
    assert_eq!(host.active_runs(), 0);
    // The unfinished cursor stays resumable
    assert_eq!(host.status(&id).await.unwrap(), RunStatus::Pending);
}
