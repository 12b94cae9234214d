//! Redis checkpoint store
//!
//! Layout, with `{prefix}` from configuration:
//! - `{prefix}:run:{instance_id}`: cursor JSON; expires `retention_secs`
//!   after the run reaches a terminal phase
//! - `{prefix}:runs`: set of instance ids whose runs have not finished

use async_trait::async_trait;
use redis::{aio::MultiplexedConnection, AsyncCommands, Client, RedisError};
use tracing::{debug, error, info, warn};

use vv_core::domain::entities::RunCursor;
use vv_core::domain::value_objects::InstanceId;
use vv_core::errors::CheckpointError;
use vv_core::services::orchestrator::CheckpointStore;
use vv_shared::config::CheckpointConfig;

use crate::InfrastructureError;

/// Cursor store shared across process restarts
#[derive(Clone)]
pub struct RedisCheckpointStore {
    /// Redis multiplexed connection for async operations
    connection: MultiplexedConnection,
    key_prefix: String,
    retention_secs: u64,
}

impl RedisCheckpointStore {
    /// Connect to the Redis server named in the configuration
    pub async fn connect(config: &CheckpointConfig) -> Result<Self, InfrastructureError> {
        info!(url = %mask_url(&config.redis_url), "Connecting checkpoint store to Redis");

        let client = Client::open(config.redis_url.as_str()).map_err(|e| {
            error!("Failed to parse Redis URL: {}", e);
            InfrastructureError::Config(format!("Invalid Redis URL: {}", e))
        })?;
        let connection = client.get_multiplexed_async_connection().await?;

        info!(key_prefix = %config.key_prefix, "Redis checkpoint store ready");
        Ok(Self::with_connection(
            connection,
            config.key_prefix.clone(),
            config.retention_secs,
        ))
    }

    pub fn with_connection(
        connection: MultiplexedConnection,
        key_prefix: impl Into<String>,
        retention_secs: u64,
    ) -> Self {
        Self {
            connection,
            key_prefix: key_prefix.into(),
            retention_secs,
        }
    }

    fn run_key(&self, instance_id: &InstanceId) -> String {
        format!("{}:run:{}", self.key_prefix, instance_id)
    }

    fn index_key(&self) -> String {
        format!("{}:runs", self.key_prefix)
    }
}

fn backend(e: RedisError) -> CheckpointError {
    CheckpointError::Backend(e.to_string())
}

#[async_trait]
impl CheckpointStore for RedisCheckpointStore {
    async fn load(&self, instance_id: &InstanceId) -> Result<Option<RunCursor>, CheckpointError> {
        let mut conn = self.connection.clone();
        let raw: Option<String> = conn.get(self.run_key(instance_id)).await.map_err(backend)?;

        raw.map(|json| serde_json::from_str(&json))
            .transpose()
            .map_err(CheckpointError::from)
    }

    async fn save(&self, cursor: &RunCursor) -> Result<(), CheckpointError> {
        let mut conn = self.connection.clone();
        let key = self.run_key(&cursor.instance_id);
        let json = serde_json::to_string(cursor)?;

        let mut pipe = redis::pipe();
        pipe.atomic();
        if cursor.is_terminal() {
            pipe.cmd("SET")
                .arg(&key)
                .arg(&json)
                .arg("EX")
                .arg(self.retention_secs)
                .ignore()
                .cmd("SREM")
                .arg(self.index_key())
                .arg(cursor.instance_id.as_str())
                .ignore();
        } else {
            pipe.cmd("SET")
                .arg(&key)
                .arg(&json)
                .ignore()
                .cmd("SADD")
                .arg(self.index_key())
                .arg(cursor.instance_id.as_str())
                .ignore();
        }
        pipe.query_async::<_, ()>(&mut conn).await.map_err(backend)?;

        debug!(
            instance_id = %cursor.instance_id,
            outer_attempt = cursor.outer_attempt,
            inner_attempt = cursor.inner_attempt,
            "Cursor checkpointed"
        );
        Ok(())
    }

    async fn list_pending(&self) -> Result<Vec<RunCursor>, CheckpointError> {
        let mut conn = self.connection.clone();
        let ids: Vec<String> = conn.smembers(self.index_key()).await.map_err(backend)?;

        let mut pending = Vec::with_capacity(ids.len());
        for id in ids {
            let instance_id = InstanceId::new(id);
            match self.load(&instance_id).await? {
                Some(cursor) if !cursor.is_terminal() => pending.push(cursor),
                Some(_) => {}
                None => warn!(
                    instance_id = %instance_id,
                    "Pending run index refers to a missing cursor"
                ),
            }
        }
        pending.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(pending)
    }
}

/// Hide credentials embedded in a Redis URL
fn mask_url(url: &str) -> String {
    match (url.find("://"), url.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            format!("{}://***{}", &url[..scheme_end], &url[at..])
        }
        _ => url.to_string(),
    }
}
