//! Mock Voice Gateway Implementation
//!
//! A mock implementation of the voice gateway for development and testing.
//! This implementation logs the spoken code to the console instead of
//! placing a call.

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{info, warn};
use uuid::Uuid;

use vv_core::errors::DispatchError;
use vv_core::services::challenge::{ChallengeCall, VoiceGateway};
use vv_shared::utils::phone::{is_valid_international_phone, mask_phone_number};

/// Mock voice gateway for development and testing
///
/// This implementation:
/// - Prints the code to the console
/// - Validates the callee number
/// - Generates mock call ids
/// - Tracks placed calls for testing
#[derive(Clone)]
pub struct MockVoiceGateway {
    /// Counter for tracking number of calls placed
    call_count: Arc<AtomicU64>,
    /// Calls placed, most recent last
    calls: Arc<Mutex<Vec<ChallengeCall>>>,
    /// Whether to simulate failures (for testing)
    simulate_failure: bool,
    /// Whether to print calls to console
    console_output: bool,
}

impl MockVoiceGateway {
    /// Create a new mock voice gateway
    pub fn new() -> Self {
        Self::with_options(true, false)
    }

    /// Create a mock gateway with configurable options
    pub fn with_options(console_output: bool, simulate_failure: bool) -> Self {
        Self {
            call_count: Arc::new(AtomicU64::new(0)),
            calls: Arc::new(Mutex::new(Vec::new())),
            simulate_failure,
            console_output,
        }
    }

    /// Get the total number of calls placed
    pub fn get_call_count(&self) -> u64 {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Code spoken in the most recent call
    pub fn last_code(&self) -> Option<String> {
        self.calls
            .lock()
            .ok()
            .and_then(|calls| calls.last().map(|call| call.code.clone()))
    }

    /// Enable or disable failure simulation
    pub fn set_simulate_failure(&mut self, simulate: bool) {
        self.simulate_failure = simulate;
    }
}

impl Default for MockVoiceGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VoiceGateway for MockVoiceGateway {
    async fn place_call(&self, call: &ChallengeCall) -> Result<String, DispatchError> {
        if !is_valid_international_phone(&call.to) {
            return Err(DispatchError::Delivery(format!(
                "Invalid phone number format: {}",
                mask_phone_number(&call.to)
            )));
        }

        if self.simulate_failure {
            warn!(
                "Mock voice gateway simulating failure for phone: {}",
                mask_phone_number(&call.to)
            );
            return Err(DispatchError::Delivery(
                "Simulated call failure".to_string(),
            ));
        }

        let call_id = format!("mock_{}", Uuid::new_v4());
        let count = self.call_count.fetch_add(1, Ordering::SeqCst) + 1;
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call.clone());
        }

        let masked_phone = mask_phone_number(&call.to);
        if self.console_output {
            println!("\n{}", "=".repeat(60));
            println!("MOCK VOICE GATEWAY - CALL #{}", count);
            println!("{}", "=".repeat(60));
            println!("Run: {}", call.instance_id);
            println!("To: {} (masked: {})", call.to, masked_phone);
            println!("Call ID: {}", call_id);
            println!("Spoken code: {}", spoken(&call.code));
            println!("{}\n", "=".repeat(60));
        }

        info!(
            target: "voice_gateway",
            provider = "mock",
            phone = %masked_phone,
            call_id = %call_id,
            code_length = call.code.len(),
            "Challenge call placed (mock)"
        );

        Ok(call_id)
    }

    fn provider_name(&self) -> &str {
        "Mock"
    }
}

/// Digits separated the way a voice prompt reads them
fn spoken(code: &str) -> String {
    code.chars()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
