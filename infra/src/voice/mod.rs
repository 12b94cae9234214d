//! Voice Module
//!
//! Collaborators of the challenge glue: the voice gateway that speaks the
//! code, the generator that produces it and the store the verifier reads it
//! back from.
//!
//! ## Features
//!
//! - **Mock Gateway**: Console output for development
//! - **Digit Codes**: Fixed-length numeric codes from the OS CSPRNG
//! - **Security**: Phone number masking in logs

use std::sync::Arc;

use vv_core::services::challenge::VoiceGateway;
use vv_shared::config::TelephonyConfig;

pub mod code_generator;
pub mod issued_codes;
pub mod mock_voice;

pub use code_generator::DigitCodeGenerator;
pub use issued_codes::InMemoryIssuedCodeStore;
pub use mock_voice::MockVoiceGateway;


/// Create a voice gateway based on configuration
///
/// Unknown providers fall back to the mock gateway.
///
/// # Arguments
///
/// * `config` - Telephony configuration naming the provider
pub fn create_voice_gateway(config: &TelephonyConfig) -> Arc<dyn VoiceGateway> {
    match config.provider.as_str() {
        "mock" => Arc::new(MockVoiceGateway::new()),
        other => {
            tracing::warn!(
                "Unknown voice provider '{}', using mock implementation",
                other
            );
            Arc::new(MockVoiceGateway::new())
        }
    }
}
