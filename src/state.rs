use std::sync::Arc;

use redis::aio::ConnectionManager;

use crate::{
    config::{Config, SessionBackend},
    error::Result,
    repositories::{
        snippet::{PgSnippetRepository, SnippetRepository},
        user::{PgUserRepository, UserRepository},
    },
    session::{
        SessionManager,
        redis::RedisSessionStore,
        store::{MemorySessionStore, SessionStore},
    },
};

/// The application's state.
#[derive(Clone)]
pub struct AppState {
    /// The snippet store.
    pub snippets: Arc<dyn SnippetRepository>,
    /// The user store.
    pub users: Arc<dyn UserRepository>,
    /// Loads and persists per-request sessions.
    pub sessions: SessionManager,
}

impl AppState {
    /// Creates a new `AppState` from already-built collaborators.
    pub fn new(
        snippets: Arc<dyn SnippetRepository>,
        users: Arc<dyn UserRepository>,
        sessions: SessionManager,
    ) -> Self {
        Self {
            snippets,
            users,
            sessions,
        }
    }

    /// Connects to PostgreSQL and the configured session backend.
    ///
    /// # Arguments
    ///
    /// * `config` - The application's configuration.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `AppState`.
    pub async fn from_config(config: &Config) -> Result<Self> {
        let db = crate::db::create_pool(&config.database_url)?;
        crate::db::run_migrations(&db).await?;
        tracing::info!("✅ PostgreSQL pool initialized and schema up to date");

        let store: Arc<dyn SessionStore> = match config.session_backend {
            SessionBackend::Redis => {
                let redis_client = redis::Client::open(config.redis_url.as_str())?;
                let redis = ConnectionManager::new(redis_client).await?;
                tracing::info!("✅ Redis session store initialized");
                Arc::new(RedisSessionStore::new(redis))
            }
            SessionBackend::Memory => {
                tracing::warn!("⚠️ Using in-memory sessions; they will not survive a restart");
                Arc::new(MemorySessionStore::new())
            }
        };

        let sessions = SessionManager::new(store, config.session_lifetime, config.cookie_secure);

        Ok(Self::new(
            Arc::new(PgSnippetRepository::new(db.clone())),
            Arc::new(PgUserRepository::new(db)),
            sessions,
        ))
    }
}
