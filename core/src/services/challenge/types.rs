//! Types for challenge delivery

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::InstanceId;

/// One outbound challenge call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChallengeCall {
    pub instance_id: InstanceId,
    /// Callee in E.164 format
    pub to: String,
    /// Caller id, provider default when absent
    pub from: Option<String>,
    /// Digits to speak
    pub code: String,
}

/// The code most recently issued for a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuedCode {
    pub code: String,
    /// Outer attempt the code was generated for
    pub outer_attempt: u32,
    pub issued_at: DateTime<Utc>,
    /// Whether the gateway accepted the call
    pub delivered: bool,
}

impl IssuedCode {
    pub fn new(code: String, outer_attempt: u32, issued_at: DateTime<Utc>) -> Self {
        Self {
            code,
            outer_attempt,
            issued_at,
            delivered: false,
        }
    }
}
