//! Challenge glue around the orchestrator
//!
//! This module provides:
//! - A dispatch activity that generates a code, records it and places the call
//! - A verifier that checks entered digits and posts the `Approval` verdict
//! - The narrow contracts of the voice gateway, code generator and code store

mod dispatcher;
mod traits;
mod types;
mod verifier;

#[cfg(test)]
mod tests;

pub use dispatcher::ChallengeDispatcher;
pub use traits::{CodeGenerator, IssuedCodeStore, VoiceGateway};
pub use types::{ChallengeCall, IssuedCode};
pub use verifier::ChallengeVerifier;
