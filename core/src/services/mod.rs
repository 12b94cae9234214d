//! Business services: the verification orchestrator, the host that runs it,
//! and the challenge glue around it.

pub mod challenge;
pub mod host;
pub mod orchestrator;

// Re-export commonly used types
pub use challenge::{
    ChallengeCall, ChallengeDispatcher, ChallengeVerifier, CodeGenerator, IssuedCode,
    IssuedCodeStore, VoiceGateway,
};
pub use host::OrchestrationHost;
pub use orchestrator::{
    CheckpointStore, Clock, Collaborators, DispatchActivity, DispatchRequest, EventChannel,
    OrchestratorConfig, TimerHandle, TimerId, TimerService, VerificationOrchestrator,
};
