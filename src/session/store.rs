use std::{collections::HashMap, sync::Arc, time::Duration};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::{error::Result, models::session::SessionRecord};

/// Where session records live between requests.
///
/// Implementations must be safe to share between concurrent requests; the
/// session layer never assumes it holds a token exclusively.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Loads the record for `token`. Missing and expired records are `None`.
    async fn load(&self, token: &str) -> Result<Option<SessionRecord>>;

    /// Stores `record` under `token` for `ttl`, replacing any previous value.
    async fn save(&self, token: &str, record: &SessionRecord, ttl: Duration) -> Result<()>;

    /// Removes the record for `token`. Removing an unknown token is not an error.
    async fn delete(&self, token: &str) -> Result<()>;
}

/// A process-local session store.
#[derive(Clone, Default)]
pub struct MemorySessionStore {
    records: Arc<Mutex<HashMap<String, SessionRecord>>>,
}

impl MemorySessionStore {
    /// Creates a new, empty `MemorySessionStore`.
    pub fn new() -> Self {
        Self::default()
    }

    /// The number of live records.
    pub async fn len(&self) -> usize {
        let records = self.records.lock().await;
        records.values().filter(|r| !r.is_expired()).count()
    }

    /// Whether the store holds no live records.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self, token: &str) -> Result<Option<SessionRecord>> {
        let mut records = self.records.lock().await;

        match records.get(token) {
            Some(record) if record.is_expired() => {
                records.remove(token);
                Ok(None)
            }
            Some(record) => Ok(Some(record.clone())),
            None => Ok(None),
        }
    }

    async fn save(&self, token: &str, record: &SessionRecord, _ttl: Duration) -> Result<()> {
        // Expiry is carried by `record.expires_at`. Every write sweeps out
        // records whose owners never came back.
        let mut records = self.records.lock().await;
        records.retain(|_, r| !r.is_expired());
        records.insert(token.to_string(), record.clone());
        Ok(())
    }

    async fn delete(&self, token: &str) -> Result<()> {
        let mut records = self.records.lock().await;
        records.remove(token);
        Ok(())
    }
}
