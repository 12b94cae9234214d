//! Configuration for the verification orchestrator

use std::time::Duration;

use vv_shared::config::orchestrator::{DEFAULT_CHALLENGE_WINDOW_SECS, DEFAULT_MAX_INNER_ATTEMPTS};
use vv_shared::config::OrchestratorSettings;

use crate::errors::{DomainError, DomainResult};

/// Longest accepted challenge window
const MAX_CHALLENGE_WINDOW: Duration = Duration::from_secs(24 * 60 * 60);

/// Validated limits of the verification loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrchestratorConfig {
    /// Number of codes dispatched before giving up (at least one)
    pub max_outer_attempts: u32,
    /// Inclusive bound of the inner wait index: each window considers up to
    /// `max_inner_attempts + 1` verdicts
    pub max_inner_attempts: u32,
    /// Time a dispatched code stays answerable
    pub challenge_window: Duration,
}

impl OrchestratorConfig {
    /// Create a configuration with the default window and inner bound
    pub fn new(max_outer_attempts: u32) -> DomainResult<Self> {
        Self {
            max_outer_attempts,
            max_inner_attempts: DEFAULT_MAX_INNER_ATTEMPTS,
            challenge_window: Duration::from_secs(DEFAULT_CHALLENGE_WINDOW_SECS),
        }
        .validated()
    }

    pub fn with_max_inner_attempts(mut self, max_inner_attempts: u32) -> Self {
        self.max_inner_attempts = max_inner_attempts;
        self
    }

    pub fn with_challenge_window(mut self, challenge_window: Duration) -> Self {
        self.challenge_window = challenge_window;
        self
    }

    /// Check the invariants the control loop relies on
    pub fn validated(self) -> DomainResult<Self> {
        if self.max_outer_attempts == 0 {
            return Err(DomainError::Validation {
                message: "max_outer_attempts must be a positive integer".to_string(),
            });
        }
        if self.challenge_window.is_zero() {
            return Err(DomainError::Validation {
                message: "challenge_window must be at least one second".to_string(),
            });
        }
        if self.challenge_window > MAX_CHALLENGE_WINDOW {
            return Err(DomainError::Validation {
                message: "challenge_window must not exceed one day".to_string(),
            });
        }
        Ok(self)
    }

    /// Window length as a chrono duration for deadline arithmetic
    pub(crate) fn window(&self) -> chrono::Duration {
        chrono::Duration::from_std(self.challenge_window).unwrap_or_else(|_| chrono::Duration::days(1))
    }
}

impl TryFrom<&OrchestratorSettings> for OrchestratorConfig {
    type Error = DomainError;

    fn try_from(settings: &OrchestratorSettings) -> Result<Self, Self::Error> {
        let max_outer_attempts = settings.validate().map_err(|e| DomainError::Validation {
            message: e.to_string(),
        })?;

        Self {
            max_outer_attempts,
            max_inner_attempts: settings.max_inner_attempts,
            challenge_window: Duration::from_secs(settings.challenge_window_secs),
        }
        .validated()
    }
}
