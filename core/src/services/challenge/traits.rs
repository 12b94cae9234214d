//! Traits for voice delivery, code generation and issued code storage

use async_trait::async_trait;

use crate::domain::value_objects::InstanceId;
use crate::errors::DispatchError;

use super::types::{ChallengeCall, IssuedCode};

/// Trait for outbound voice call integration
#[async_trait]
pub trait VoiceGateway: Send + Sync {
    /// Place a call that speaks the challenge code; returns the provider call id
    async fn place_call(&self, call: &ChallengeCall) -> Result<String, DispatchError>;
    /// Provider name for logging
    fn provider_name(&self) -> &str;
}

/// Trait for challenge code generation
pub trait CodeGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// Trait for the per-run record of the last issued code
#[async_trait]
pub trait IssuedCodeStore: Send + Sync {
    /// Store the code for a run, replacing any previous one
    async fn remember(&self, instance_id: &InstanceId, code: &IssuedCode) -> Result<(), DispatchError>;
    async fn lookup(&self, instance_id: &InstanceId) -> Result<Option<IssuedCode>, DispatchError>;
    async fn forget(&self, instance_id: &InstanceId) -> Result<(), DispatchError>;
}
