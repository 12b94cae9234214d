//! Numeric challenge codes from the OS CSPRNG

use rand::{rngs::OsRng, Rng};

use vv_core::services::challenge::CodeGenerator;
use vv_shared::config::telephony::DEFAULT_CODE_DIGITS;

/// Generates fixed-length decimal codes
#[derive(Debug, Clone, Copy)]
pub struct DigitCodeGenerator {
    digits: usize,
}

impl DigitCodeGenerator {
    pub fn new(digits: usize) -> Self {
        Self { digits }
    }

    pub fn digits(&self) -> usize {
        self.digits
    }
}

impl Default for DigitCodeGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_CODE_DIGITS)
    }
}

impl CodeGenerator for DigitCodeGenerator {
    fn generate(&self) -> String {
        let mut rng = OsRng;
        (0..self.digits)
            .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
            .collect()
    }
}
