//! End-to-end verification runs through the wired runtime
//!
//! Every test runs on a paused tokio clock, so 90-second windows pass
//! instantly while keeping their exact ordering.

use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

use vv_core::domain::entities::RunStatus;
use vv_core::domain::value_objects::InstanceId;
use vv_core::errors::{ChannelError, DomainError};
use vv_infra::runtime::{initialize_with_gateway, VoiceVerifyRuntime};
use vv_infra::voice::MockVoiceGateway;
use vv_shared::config::{AppConfig, OrchestratorSettings};

const CALLEE: &str = "+819012345678";

struct Fixture {
    runtime: VoiceVerifyRuntime,
    gateway: Arc<MockVoiceGateway>,
    start: Instant,
}

impl Fixture {
    async fn new(max_outer_attempts: u32) -> Self {
        let mut config = AppConfig::default();
        config.orchestrator = OrchestratorSettings::with_outer_attempts(max_outer_attempts);
        config.telephony.to_number = Some(CALLEE.to_string());

        let gateway = Arc::new(MockVoiceGateway::with_options(false, false));
        let runtime = initialize_with_gateway(config, gateway.clone())
            .await
            .unwrap();

        Self {
            runtime,
            gateway,
            start: Instant::now(),
        }
    }

    fn start_run(&self, name: &str) -> InstanceId {
        self.runtime
            .host
            .start_run(Some(InstanceId::new(name)))
            .unwrap()
    }

    async fn at(&self, secs: u64) {
        tokio::time::sleep_until(self.start + Duration::from_secs(secs)).await;
    }

    async fn answer(&self, id: &InstanceId, digits: &str) -> bool {
        self.runtime.verifier.submit_response(id, digits).await.unwrap()
    }

    async fn answer_correctly(&self, id: &InstanceId) -> bool {
        let code = self.gateway.last_code().unwrap();
        self.answer(id, &code).await
    }

    async fn finish(&self, id: &InstanceId) -> RunStatus {
        self.runtime.host.wait_for_completion(id).await.unwrap()
    }
}

fn wrong_code(code: &str) -> String {
    code.chars()
        .map(|c| if c == '0' { '1' } else { '0' })
        .collect()
}

#[tokio::test(start_paused = true)]
async fn test_every_window_times_out() {
    let fixture = Fixture::new(4).await;
    let id = fixture.start_run("timeouts");

    let status = fixture.finish(&id).await;

    assert_eq!(status, RunStatus::Completed { authorized: false });
    assert_eq!(fixture.gateway.get_call_count(), 4);
    assert_eq!(fixture.start.elapsed().as_secs(), 4 * 90);
    assert_eq!(fixture.runtime.timers.active_timers(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_correct_code_on_second_call() {
    let fixture = Fixture::new(3).await;
    let id = fixture.start_run("second-call");

    fixture.at(90 + 15).await;
    assert!(fixture.answer_correctly(&id).await);

    assert_eq!(
        fixture.finish(&id).await,
        RunStatus::Completed { authorized: true }
    );
    assert_eq!(fixture.gateway.get_call_count(), 2);
    assert_eq!(fixture.runtime.timers.active_timers(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_wrong_then_right_code_in_one_window() {
    let fixture = Fixture::new(3).await;
    let id = fixture.start_run("retry-same-code");

    fixture.at(10).await;
    let code = fixture.gateway.last_code().unwrap();
    assert!(!fixture.answer(&id, &wrong_code(&code)).await);

    fixture.at(20).await;
    assert!(fixture.answer(&id, &code).await);

    assert_eq!(
        fixture.finish(&id).await,
        RunStatus::Completed { authorized: true }
    );
    assert_eq!(fixture.gateway.get_call_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_too_many_wrong_codes_trigger_new_call() {
    let fixture = Fixture::new(2).await;
    let id = fixture.start_run("guessing");

    fixture.at(5).await;
    let first = fixture.gateway.last_code().unwrap();
    for _ in 0..4 {
        assert!(!fixture.answer(&id, &wrong_code(&first)).await);
    }

    fixture.at(6).await;
    assert_eq!(fixture.gateway.get_call_count(), 2);

    // The first code is no longer accepted
    let second = fixture.gateway.last_code().unwrap();
    if second != first {
        assert!(!fixture.answer(&id, &first).await);
    }
    assert!(fixture.answer(&id, &second).await);

    assert_eq!(
        fixture.finish(&id).await,
        RunStatus::Completed { authorized: true }
    );
}

#[tokio::test(start_paused = true)]
async fn test_timeout_then_wrong_then_right() {
    // outer=3, window=90s, four verdicts per window: first window expires, then a wrong code
    // 30s and the right one 40s into the second window
    let fixture = Fixture::new(3).await;
    let id = fixture.start_run("mixed");

    fixture.at(90 + 30).await;
    let code = fixture.gateway.last_code().unwrap();
    assert!(!fixture.answer(&id, &wrong_code(&code)).await);

    fixture.at(90 + 40).await;
    assert!(fixture.answer(&id, &code).await);

    assert_eq!(
        fixture.finish(&id).await,
        RunStatus::Completed { authorized: true }
    );
    assert_eq!(fixture.gateway.get_call_count(), 2);
    assert_eq!(fixture.start.elapsed().as_secs(), 130);
    assert_eq!(fixture.runtime.timers.active_timers(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_silent_callee_three_attempts() {
    let fixture = Fixture::new(3).await;
    let id = fixture.start_run("silent");

    assert_eq!(
        fixture.finish(&id).await,
        RunStatus::Completed { authorized: false }
    );
    assert_eq!(fixture.gateway.get_call_count(), 3);
    assert_eq!(fixture.runtime.timers.active_timers(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_answer_after_completion_is_refused() {
    let fixture = Fixture::new(1).await;
    let id = fixture.start_run("late");

    fixture.at(5).await;
    let code = fixture.gateway.last_code().unwrap();
    assert!(fixture.answer(&id, &code).await);
    fixture.finish(&id).await;

    let late = fixture.runtime.verifier.submit_response(&id, &code).await;
    assert!(matches!(
        late,
        Err(DomainError::Channel(ChannelError::Closed { .. }))
    ));
}

#[tokio::test(start_paused = true)]
async fn test_runs_do_not_share_codes() {
    let fixture = Fixture::new(1).await;
    let alice = fixture.start_run("alice");

    fixture.at(1).await;
    let alice_code = fixture.gateway.last_code().unwrap();
    let bob = fixture.start_run("bob");
    fixture.at(2).await;
    let bob_code = fixture.gateway.last_code().unwrap();

    if alice_code != bob_code {
        assert!(!fixture.answer(&bob, &alice_code).await);
    }
    assert!(fixture.answer(&alice, &alice_code).await);
    assert!(fixture.answer(&bob, &bob_code).await);

    assert_eq!(
        fixture.finish(&alice).await,
        RunStatus::Completed { authorized: true }
    );
    assert_eq!(
        fixture.finish(&bob).await,
        RunStatus::Completed { authorized: true }
    );
}

#[tokio::test(start_paused = true)]
async fn test_finished_runs_leave_nothing_behind() {
    let fixture = Fixture::new(1).await;
    let approved = fixture.start_run("approved");
    fixture.at(1).await;
    let code = fixture.gateway.last_code().unwrap();
    let silent = fixture.start_run("silent");

    fixture.at(5).await;
    assert_eq!(fixture.runtime.events.open_count(), 2);
    assert_eq!(fixture.runtime.codes.len(), 2);
    assert!(fixture.answer(&approved, &code).await);

    fixture.finish(&approved).await;
    fixture.finish(&silent).await;

    assert_eq!(fixture.runtime.events.open_count(), 0);
    assert_eq!(fixture.runtime.events.mailbox_count(), 0);
    assert!(fixture.runtime.codes.is_empty());
    assert_eq!(fixture.runtime.host.active_runs(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_answer_for_unknown_run_is_refused() {
    let fixture = Fixture::new(1).await;

    for n in 0..100 {
        let stray = InstanceId::new(format!("stray-{}", n));
        let result = fixture.runtime.verifier.submit_response(&stray, "123456").await;
        assert!(matches!(
            result,
            Err(DomainError::Channel(ChannelError::Closed { .. }))
        ));
    }

    assert_eq!(fixture.runtime.events.mailbox_count(), 0);
    assert_eq!(fixture.runtime.events.open_count(), 0);
}
