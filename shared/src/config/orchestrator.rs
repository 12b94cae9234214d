//! Orchestrator retry and timeout settings

use serde::{Deserialize, Serialize};

use crate::errors::{ConfigError, ConfigResult};

/// Default length of one challenge window in seconds
pub const DEFAULT_CHALLENGE_WINDOW_SECS: u64 = 90;

/// Default inclusive bound of the inner wait index: four verdicts per window
pub const DEFAULT_MAX_INNER_ATTEMPTS: u32 = 3;

/// Raw orchestrator settings as read from files and environment.
///
/// `max_outer_attempts` has no default: a deployment must choose how many
/// codes a user may be sent.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct OrchestratorSettings {
    /// Number of codes dispatched before giving up
    #[serde(default)]
    pub max_outer_attempts: Option<u32>,

    /// Inclusive bound of the inner wait index within one window
    #[serde(default = "default_max_inner_attempts")]
    pub max_inner_attempts: u32,

    /// Seconds a dispatched code stays answerable
    #[serde(default = "default_challenge_window_secs")]
    pub challenge_window_secs: u64,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            max_outer_attempts: None,
            max_inner_attempts: default_max_inner_attempts(),
            challenge_window_secs: default_challenge_window_secs(),
        }
    }
}

impl OrchestratorSettings {
    /// Settings with the given outer attempt count and default window values
    pub fn with_outer_attempts(max_outer_attempts: u32) -> Self {
        Self {
            max_outer_attempts: Some(max_outer_attempts),
            ..Self::default()
        }
    }

    /// Validate the settings and return the required outer attempt count
    pub fn validate(&self) -> ConfigResult<u32> {
        let outer = self
            .max_outer_attempts
            .ok_or_else(|| ConfigError::missing("orchestrator.max_outer_attempts"))?;

        if outer == 0 {
            return Err(ConfigError::invalid(
                "orchestrator.max_outer_attempts",
                "must be a positive integer",
            ));
        }

        if self.challenge_window_secs == 0 {
            return Err(ConfigError::invalid(
                "orchestrator.challenge_window_secs",
                "must be at least one second",
            ));
        }

        Ok(outer)
    }
}

fn default_max_inner_attempts() -> u32 {
    DEFAULT_MAX_INNER_ATTEMPTS
}

fn default_challenge_window_secs() -> u64 {
    DEFAULT_CHALLENGE_WINDOW_SECS
}
