//! Tracing subscriber setup

use tracing_subscriber::EnvFilter;

use vv_shared::config::{LogFormat, LoggingConfig};

use crate::InfrastructureError;

/// Install the global tracing subscriber.
///
/// `RUST_LOG`, when set, takes precedence over the configured level.
/// Fails if a global subscriber is already installed.
pub fn init_tracing(config: &LoggingConfig) -> Result<(), InfrastructureError> {
    let directives = filter_directives(config, std::env::var(EnvFilter::DEFAULT_ENV).ok());
    let filter = EnvFilter::try_new(&directives)
        .map_err(|e| InfrastructureError::Telemetry(format!("invalid filter '{}': {}", directives, e)))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(config.colored)
        .with_file(config.source_location)
        .with_line_number(config.source_location)
        .with_target(true);

    let installed = match config.format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Compact => builder.compact().try_init(),
    };
    installed.map_err(|e| InfrastructureError::Telemetry(e.to_string()))
}

fn filter_directives(config: &LoggingConfig, rust_log: Option<String>) -> String {
    match rust_log {
        Some(directives) if !directives.trim().is_empty() => directives,
        _ => config.level.clone(),
    }
}
