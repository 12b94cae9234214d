//! In-memory record of the last code issued per run

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

use vv_core::domain::value_objects::InstanceId;
use vv_core::errors::DispatchError;
use vv_core::services::challenge::{IssuedCode, IssuedCodeStore};

#[derive(Default)]
pub struct InMemoryIssuedCodeStore {
    codes: RwLock<HashMap<InstanceId, IssuedCode>>,
}

impl InMemoryIssuedCodeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of runs holding an issued code
    pub fn len(&self) -> usize {
        self.codes.read().map(|codes| codes.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned() -> DispatchError {
    DispatchError::Storage("issued code map lock poisoned".to_string())
}

#[async_trait]
impl IssuedCodeStore for InMemoryIssuedCodeStore {
    async fn remember(&self, instance_id: &InstanceId, code: &IssuedCode) -> Result<(), DispatchError> {
        let mut codes = self.codes.write().map_err(|_| poisoned())?;
        codes.insert(instance_id.clone(), code.clone());
        Ok(())
    }

    async fn lookup(&self, instance_id: &InstanceId) -> Result<Option<IssuedCode>, DispatchError> {
        let codes = self.codes.read().map_err(|_| poisoned())?;
        Ok(codes.get(instance_id).cloned())
    }

    async fn forget(&self, instance_id: &InstanceId) -> Result<(), DispatchError> {
        let mut codes = self.codes.write().map_err(|_| poisoned())?;
        codes.remove(instance_id);
        Ok(())
    }
}
