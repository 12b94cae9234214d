//! Mock implementations for testing the challenge glue

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use crate::domain::value_objects::InstanceId;
use crate::errors::DispatchError;
use crate::services::challenge::{ChallengeCall, CodeGenerator, IssuedCode, IssuedCodeStore, VoiceGateway};

pub const CALLEE: &str = "+819012345678";

// Mock voice gateway for testing
pub struct MockVoiceGateway {
    pub calls: Arc<Mutex<Vec<ChallengeCall>>>,
    pub should_fail: bool,
}

impl MockVoiceGateway {
    pub fn new(should_fail: bool) -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            should_fail,
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn last_code(&self) -> Option<String> {
        self.calls.lock().unwrap().last().map(|call| call.code.clone())
    }
}

#[async_trait]
impl VoiceGateway for MockVoiceGateway {
    async fn place_call(&self, call: &ChallengeCall) -> Result<String, DispatchError> {
        if self.should_fail {
            return Err(DispatchError::Delivery("Voice service error".to_string()));
        }
        self.calls.lock().unwrap().push(call.clone());
        Ok(format!("mock-call-{}", uuid::Uuid::new_v4()))
    }

    fn provider_name(&self) -> &str {
        "mock"
    }
}

// Yields 100001, 100002, ...
pub struct SequenceCodeGenerator {
    next: AtomicU32,
}

impl SequenceCodeGenerator {
    pub fn new() -> Self {
        Self {
            next: AtomicU32::new(100_001),
        }
    }
}

impl CodeGenerator for SequenceCodeGenerator {
    fn generate(&self) -> String {
        self.next.fetch_add(1, Ordering::SeqCst).to_string()
    }
}

// Mock issued code store for testing
pub struct MockIssuedCodeStore {
    pub codes: Mutex<HashMap<String, IssuedCode>>,
    pub should_fail: bool,
}

impl MockIssuedCodeStore {
    pub fn new(should_fail: bool) -> Self {
        Self {
            codes: Mutex::new(HashMap::new()),
            should_fail,
        }
    }

    pub fn get(&self, instance_id: &InstanceId) -> Option<IssuedCode> {
        self.codes.lock().unwrap().get(instance_id.as_str()).cloned()
    }
}

#[async_trait]
impl IssuedCodeStore for MockIssuedCodeStore {
    async fn remember(&self, instance_id: &InstanceId, code: &IssuedCode) -> Result<(), DispatchError> {
        if self.should_fail {
            return Err(DispatchError::Storage("Code store error".to_string()));
        }
        self.codes
            .lock()
            .unwrap()
            .insert(instance_id.to_string(), code.clone());
        Ok(())
    }

    async fn lookup(&self, instance_id: &InstanceId) -> Result<Option<IssuedCode>, DispatchError> {
        if self.should_fail {
            return Err(DispatchError::Storage("Code store error".to_string()));
        }
        Ok(self.get(instance_id))
    }

    async fn forget(&self, instance_id: &InstanceId) -> Result<(), DispatchError> {
        self.codes.lock().unwrap().remove(instance_id.as_str());
        Ok(())
    }
}
