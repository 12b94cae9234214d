//! Checkpoint module
//!
//! Stores of run cursors. The in-memory store serves tests and single-process
//! development; the Redis store lets a restarted process resume its runs.

use std::sync::Arc;

use vv_core::services::orchestrator::CheckpointStore;
use vv_shared::config::{CheckpointBackend, CheckpointConfig};

use crate::InfrastructureError;

pub mod memory;
#[cfg(feature = "redis-store")]
pub mod redis_store;

pub use memory::InMemoryCheckpointStore;
#[cfg(feature = "redis-store")]
pub use redis_store::RedisCheckpointStore;

/// Create a checkpoint store based on configuration
///
/// # Arguments
///
/// * `config` - Checkpoint configuration selecting the backend
///
/// # Returns
///
/// The store, or an error when the Redis backend is selected but unavailable
pub async fn create_checkpoint_store(
    config: &CheckpointConfig,
) -> Result<Arc<dyn CheckpointStore>, InfrastructureError> {
    match config.backend {
        CheckpointBackend::Memory => {
            tracing::info!(backend = "memory", "Using in-memory checkpoint store");
            Ok(Arc::new(InMemoryCheckpointStore::new()))
        }
        #[cfg(feature = "redis-store")]
        CheckpointBackend::Redis => {
            let store = RedisCheckpointStore::connect(config).await?;
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "redis-store"))]
        CheckpointBackend::Redis => Err(InfrastructureError::Config(
            "checkpoint backend 'redis' requires the redis-store feature".to_string(),
        )),
    }
}
