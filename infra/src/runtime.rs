//! Assembly of the verification services from configuration

use std::sync::Arc;
use tracing::info;

use vv_core::services::challenge::{ChallengeDispatcher, ChallengeVerifier, VoiceGateway};
use vv_core::services::host::OrchestrationHost;
use vv_core::services::orchestrator::{Collaborators, OrchestratorConfig};
use vv_shared::config::AppConfig;

use crate::checkpoint::create_checkpoint_store;
use crate::events::InMemoryEventChannel;
use crate::timer::{AnchoredClock, TokioTimerService};
use crate::voice::{create_voice_gateway, DigitCodeGenerator, InMemoryIssuedCodeStore};
use crate::InfrastructureError;

/// Wired services of one process
pub struct VoiceVerifyRuntime {
    /// Starts runs and reports their status
    pub host: Arc<OrchestrationHost>,
    /// Checks entered digits and posts verdicts
    pub verifier: Arc<ChallengeVerifier>,
    pub events: Arc<InMemoryEventChannel>,
    pub codes: Arc<InMemoryIssuedCodeStore>,
    pub timers: Arc<TokioTimerService>,
    pub config: AppConfig,
}

/// Initialize the verification services
///
/// This function sets up:
/// - The orchestrator limits from the validated configuration
/// - The event mailbox, timers and clock
/// - The configured checkpoint store
/// - The challenge dispatcher and verifier around the configured voice gateway
pub async fn initialize(config: AppConfig) -> Result<VoiceVerifyRuntime, InfrastructureError> {
    let gateway = create_voice_gateway(&config.telephony);
    initialize_with_gateway(config, gateway).await
}

/// Initialize the verification services around the given voice gateway
pub async fn initialize_with_gateway(
    config: AppConfig,
    gateway: Arc<dyn VoiceGateway>,
) -> Result<VoiceVerifyRuntime, InfrastructureError> {
    info!("Initializing verification services...");

    let orchestrator_config = OrchestratorConfig::try_from(&config.orchestrator)?;

    let clock = AnchoredClock::new();
    let events = Arc::new(InMemoryEventChannel::new());
    let timers = Arc::new(TokioTimerService::new(clock));
    let checkpoints = create_checkpoint_store(&config.checkpoint).await?;
    let codes = Arc::new(InMemoryIssuedCodeStore::new());

    let provider = gateway.provider_name().to_string();
    let dispatcher = ChallengeDispatcher::from_config(
        gateway,
        Arc::new(DigitCodeGenerator::new(config.telephony.code_digits())),
        codes.clone(),
        &config.telephony,
    )?;

    let host = OrchestrationHost::new(
        orchestrator_config.clone(),
        Collaborators {
            dispatcher: Arc::new(dispatcher),
            events: events.clone(),
            timers: timers.clone(),
            checkpoints,
            clock: Arc::new(clock),
        },
    );
    let verifier = ChallengeVerifier::new(codes.clone(), events.clone());

    info!(
        max_outer_attempts = orchestrator_config.max_outer_attempts,
        max_inner_attempts = orchestrator_config.max_inner_attempts,
        challenge_window_secs = orchestrator_config.challenge_window.as_secs(),
        provider = %provider,
        "Verification services initialized successfully"
    );

    Ok(VoiceVerifyRuntime {
        host: Arc::new(host),
        verifier: Arc::new(verifier),
        events,
        codes,
        timers,
        config,
    })
}
