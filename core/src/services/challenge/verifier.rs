//! Checks entered digits and posts the verdict for the orchestrator

use constant_time_eq::constant_time_eq;
use std::sync::Arc;
use tracing;

use crate::domain::entities::{ChallengeEvent, APPROVAL_EVENT};
use crate::domain::value_objects::InstanceId;
use crate::errors::DomainResult;
use crate::services::orchestrator::EventChannel;

use super::traits::IssuedCodeStore;

/// Inbound side of the challenge: compares the caller's digits with the
/// issued code and raises `Approval` with the result.
pub struct ChallengeVerifier {
    codes: Arc<dyn IssuedCodeStore>,
    events: Arc<dyn EventChannel>,
}

impl ChallengeVerifier {
    pub fn new(codes: Arc<dyn IssuedCodeStore>, events: Arc<dyn EventChannel>) -> Self {
        Self { codes, events }
    }

    /// Verify the digits entered for a run and post the verdict.
    ///
    /// A run with no issued code gets a `false` verdict. A matching code is
    /// consumed so it cannot approve twice.
    ///
    /// # Returns
    ///
    /// * `Ok(bool)` - Whether the digits matched
    /// * `Err(DomainError)` - If the code store or the event channel failed
    pub async fn submit_response(&self, instance_id: &InstanceId, digits: &str) -> DomainResult<bool> {
        let entered = digits.trim();

        let matched = match self.codes.lookup(instance_id).await? {
            Some(issued) => constant_time_eq(issued.code.as_bytes(), entered.as_bytes()),
            None => {
                tracing::warn!(
                    instance_id = %instance_id,
                    event = "unknown_challenge",
                    "Response received for a run with no issued code"
                );
                false
            }
        };

        let verdict = ChallengeEvent::new(instance_id.clone(), matched);
        self.events
            .post(instance_id, APPROVAL_EVENT, verdict.payload())
            .await?;

        if matched {
            if let Err(e) = self.codes.forget(instance_id).await {
                tracing::warn!(
                    instance_id = %instance_id,
                    error = %e,
                    "Failed to discard consumed challenge code"
                );
            }
        }

        tracing::info!(
            instance_id = %instance_id,
            approved = matched,
            event = "challenge_response_verified",
            "Challenge response verified"
        );

        Ok(matched)
    }
}
