//! Dispatch activity that delivers a fresh spoken code per outer attempt

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tracing;

use vv_shared::config::TelephonyConfig;
use vv_shared::utils::phone::mask_phone_number;

use crate::domain::value_objects::InstanceId;
use crate::errors::{DispatchError, DomainError, DomainResult};
use crate::services::orchestrator::{DispatchActivity, DispatchRequest};

use super::traits::{CodeGenerator, IssuedCodeStore, VoiceGateway};
use super::types::{ChallengeCall, IssuedCode};

/// Generates a code, records it for the verifier and places the call
pub struct ChallengeDispatcher {
    gateway: Arc<dyn VoiceGateway>,
    generator: Arc<dyn CodeGenerator>,
    codes: Arc<dyn IssuedCodeStore>,
    /// Callee in E.164 format
    to_number: String,
    from_number: Option<String>,
}

impl ChallengeDispatcher {
    /// Create a new challenge dispatcher
    ///
    /// # Arguments
    ///
    /// * `gateway` - Voice gateway that places the call
    /// * `generator` - Source of fresh codes
    /// * `codes` - Store the verifier reads issued codes from
    /// * `to_number` - Callee in E.164 format
    /// * `from_number` - Optional caller id
    pub fn new(
        gateway: Arc<dyn VoiceGateway>,
        generator: Arc<dyn CodeGenerator>,
        codes: Arc<dyn IssuedCodeStore>,
        to_number: impl Into<String>,
        from_number: Option<String>,
    ) -> Self {
        Self {
            gateway,
            generator,
            codes,
            to_number: to_number.into(),
            from_number,
        }
    }

    /// Create a dispatcher that calls the numbers of a telephony configuration
    pub fn from_config(
        gateway: Arc<dyn VoiceGateway>,
        generator: Arc<dyn CodeGenerator>,
        codes: Arc<dyn IssuedCodeStore>,
        config: &TelephonyConfig,
    ) -> DomainResult<Self> {
        let to_number = config.to_number.clone().ok_or_else(|| DomainError::Validation {
            message: "telephony.to_number is required to place challenge calls".to_string(),
        })?;
        Ok(Self::new(
            gateway,
            generator,
            codes,
            to_number,
            config.from_number.clone(),
        ))
    }
}

#[async_trait]
impl DispatchActivity for ChallengeDispatcher {
    async fn dispatch(&self, request: &DispatchRequest) -> Result<(), DispatchError> {
        // A replayed request for an attempt that already reached the callee is a no-op
        if let Some(existing) = self.codes.lookup(&request.instance_id).await? {
            if existing.delivered && existing.outer_attempt == request.outer_attempt {
                tracing::info!(
                    instance_id = %request.instance_id,
                    outer_attempt = request.outer_attempt,
                    "Challenge already delivered for this attempt, skipping"
                );
                return Ok(());
            }
        }

        // Remember the new code before the call so an immediate answer can match
        let mut issued = IssuedCode::new(self.generator.generate(), request.outer_attempt, Utc::now());
        self.codes.remember(&request.instance_id, &issued).await?;

        let call = ChallengeCall {
            instance_id: request.instance_id.clone(),
            to: self.to_number.clone(),
            from: self.from_number.clone(),
            code: issued.code.clone(),
        };

        let call_id = match self.gateway.place_call(&call).await {
            Ok(call_id) => call_id,
            Err(e) => {
                tracing::error!(
                    instance_id = %request.instance_id,
                    outer_attempt = request.outer_attempt,
                    provider = self.gateway.provider_name(),
                    to = %mask_phone_number(&self.to_number),
                    error = %e,
                    event = "challenge_call_failed",
                    "Failed to place challenge call"
                );
                return Err(e);
            }
        };

        issued.delivered = true;
        self.codes.remember(&request.instance_id, &issued).await?;

        tracing::info!(
            instance_id = %request.instance_id,
            outer_attempt = request.outer_attempt,
            provider = self.gateway.provider_name(),
            to = %mask_phone_number(&self.to_number),
            call_id = %call_id,
            event = "challenge_call_placed",
            "Challenge call placed"
        );

        Ok(())
    }

    /// Forget the run's code so it cannot be answered after the run ends
    async fn release(&self, instance_id: &InstanceId) -> Result<(), DispatchError> {
        self.codes.forget(instance_id).await?;
        tracing::debug!(instance_id = %instance_id, "Issued challenge code discarded");
        Ok(())
    }
}
