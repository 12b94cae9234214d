//! Configuration module
//!
//! Sub-modules:
//! - `checkpoint` - Run cursor persistence backend
//! - `environment` - Environment detection and logging configuration
//! - `orchestrator` - Retry and timeout limits of the verification loop
//! - `telephony` - Challenge delivery settings
//!
//! Settings are layered: defaults, then an optional `config.<environment>.toml`,
//! then `VOICE_VERIFY__SECTION__KEY` environment variables. The flat variables
//! of older deployments (`TWILIO_RETRY_COUNT` and friends) fill gaps last.

pub mod checkpoint;
pub mod environment;
pub mod orchestrator;
pub mod telephony;

use ::config::{Config, File, FileFormat};
use serde::{Deserialize, Serialize};

use crate::errors::{ConfigError, ConfigResult};

// Re-export commonly used types
pub use checkpoint::{CheckpointBackend, CheckpointConfig};
pub use environment::{Environment, LogFormat, LoggingConfig};
pub use orchestrator::OrchestratorSettings;
pub use telephony::TelephonyConfig;

/// Prefix of structured environment variables
pub const ENV_PREFIX: &str = "VOICE_VERIFY";

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, Default)]
pub struct AppConfig {
    /// Environment configuration
    #[serde(default)]
    pub environment: Environment,

    /// Verification loop limits
    #[serde(default)]
    pub orchestrator: OrchestratorSettings,

    /// Challenge delivery configuration
    #[serde(default)]
    pub telephony: TelephonyConfig,

    /// Checkpoint persistence configuration
    #[serde(default)]
    pub checkpoint: CheckpointConfig,

    /// Logging configuration; derived from the environment when absent
    #[serde(default)]
    pub logging: Option<LoggingConfig>,
}

impl AppConfig {
    /// Load configuration from `.env`, the environment file and environment variables.
    ///
    /// The result is validated; any error here is fatal at startup.
    pub fn load() -> ConfigResult<Self> {
        dotenvy::dotenv().ok();

        let environment = Environment::from_env();
        let settings = Config::builder()
            .set_default("environment", environment.to_string())?
            .add_source(File::with_name(environment.config_file()).required(false))
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut app: AppConfig = settings.try_deserialize()?;
        app.apply_legacy_env(|key| std::env::var(key).ok())?;
        app.validate()?;
        Ok(app)
    }

    /// Parse and validate configuration from a TOML document
    pub fn from_toml_str(toml: &str) -> ConfigResult<Self> {
        let settings = Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?;

        let app: AppConfig = settings.try_deserialize()?;
        app.validate()?;
        Ok(app)
    }

    /// Fill settings left unset from the flat variables of older deployments
    pub fn apply_legacy_env<F>(&mut self, lookup: F) -> ConfigResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if self.orchestrator.max_outer_attempts.is_none() {
            if let Some(raw) = lookup("TWILIO_RETRY_COUNT") {
                let parsed = raw.trim().parse::<u32>().map_err(|_| {
                    ConfigError::invalid("TWILIO_RETRY_COUNT", format!("'{}' is not a number", raw))
                })?;
                self.orchestrator.max_outer_attempts = Some(parsed);
            }
        }

        if self.telephony.code_digits.is_none() {
            if let Some(raw) = lookup("TWILIO_MAX_CODE_DIGIT") {
                let parsed = raw.trim().parse::<usize>().map_err(|_| {
                    ConfigError::invalid("TWILIO_MAX_CODE_DIGIT", format!("'{}' is not a number", raw))
                })?;
                self.telephony.code_digits = Some(parsed);
            }
        }

        if self.telephony.to_number.is_none() {
            self.telephony.to_number = lookup("TWILIO_TO_PHONE_NUMBER");
        }
        if self.telephony.from_number.is_none() {
            self.telephony.from_number = lookup("TWILIO_FROM_PHONE_NUMBER");
        }

        Ok(())
    }

    /// Validate every section
    pub fn validate(&self) -> ConfigResult<()> {
        self.orchestrator.validate()?;
        self.telephony.validate()?;
        Ok(())
    }

    /// Effective logging configuration
    pub fn logging(&self) -> LoggingConfig {
        self.logging
            .clone()
            .unwrap_or_else(|| LoggingConfig::for_environment(self.environment))
    }
}
