//! Checkpoint persistence configuration

use serde::{Deserialize, Serialize};

/// Where run cursors are persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CheckpointBackend {
    /// Process-local map; runs do not survive a restart
    #[default]
    Memory,
    /// Redis keys, shared across restarts
    Redis,
}

/// Checkpoint store configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CheckpointConfig {
    #[serde(default)]
    pub backend: CheckpointBackend,

    /// Redis connection URL (used by the redis backend)
    #[serde(default = "default_redis_url")]
    pub redis_url: String,

    /// Key prefix for every checkpoint key
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,

    /// Seconds a finished cursor is retained
    #[serde(default = "default_retention_secs")]
    pub retention_secs: u64,
}

impl Default for CheckpointConfig {
    fn default() -> Self {
        Self {
            backend: CheckpointBackend::default(),
            redis_url: default_redis_url(),
            key_prefix: default_key_prefix(),
            retention_secs: default_retention_secs(),
        }
    }
}

fn default_redis_url() -> String {
    String::from("redis://127.0.0.1:6379")
}

fn default_key_prefix() -> String {
    String::from("checkpoint")
}

fn default_retention_secs() -> u64 {
    86_400
}
