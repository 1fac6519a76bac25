use std::time::Duration;

use async_trait::async_trait;
use redis::{AsyncCommands, aio::ConnectionManager};

use crate::{
    error::Result,
    models::session::SessionRecord,
    session::store::SessionStore,
};

/// A session store backed by Redis.
///
/// Records are kept as JSON under `session:{token}` with a Redis TTL equal
/// to the session lifetime, so Redis evicts them on its own.
#[derive(Clone)]
pub struct RedisSessionStore {
    redis: ConnectionManager,
}

impl RedisSessionStore {
    /// Creates a new `RedisSessionStore`.
    pub fn new(redis: ConnectionManager) -> Self {
        Self { redis }
    }

    fn key(token: &str) -> String {
        format!("session:{}", token)
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn load(&self, token: &str) -> Result<Option<SessionRecord>> {
        let mut redis = self.redis.clone();
        let session_json: Option<String> = redis.get(Self::key(token)).await?;

        let Some(session_json) = session_json else {
            return Ok(None);
        };

        let record: SessionRecord = serde_json::from_str(&session_json)?;
        if record.is_expired() {
            tracing::debug!("Session record outlived its TTL, discarding");
            let _: () = redis.del(Self::key(token)).await?;
            return Ok(None);
        }

        Ok(Some(record))
    }

    async fn save(&self, token: &str, record: &SessionRecord, ttl: Duration) -> Result<()> {
        let mut redis = self.redis.clone();
        let session_json = serde_json::to_string(record)?;

        let _: () = redis
            .set_ex(Self::key(token), &session_json, ttl.as_secs().max(1))
            .await
            .map_err(|e| {
                tracing::error!("❌ Redis set_ex failed: {}", e);
                e
            })?;

        Ok(())
    }

    async fn delete(&self, token: &str) -> Result<()> {
        let mut redis = self.redis.clone();
        let _: () = redis.del(Self::key(token)).await?;
        Ok(())
    }
}
