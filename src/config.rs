use std::env;
use std::time::Duration;

use anyhow::{Context, Result};

/// Which backend holds session records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionBackend {
    /// Redis, keyed by `session:{token}`.
    Redis,
    /// Process-local map. Sessions do not survive a restart.
    Memory,
}

/// The application's configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// The address the HTTP listener binds to.
    pub bind_addr: String,
    /// The URL of the PostgreSQL database.
    pub database_url: String,
    /// The URL of the Redis server.
    pub redis_url: String,
    /// Where session records are kept.
    pub session_backend: SessionBackend,
    /// How long a session lives after its last write.
    pub session_lifetime: Duration,
    /// Whether the session cookie carries the `Secure` attribute.
    pub cookie_secure: bool,
    /// The deadline applied to every request.
    pub request_timeout: Duration,
}

impl Config {
    /// Creates a new `Config` from environment variables.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `Config`.
    pub fn from_env() -> Result<Self> {
        let session_lifetime_hours: u64 = env::var("SESSION_LIFETIME_HOURS")
            .unwrap_or_else(|_| "12".to_string())
            .parse()
            .context("Invalid SESSION_LIFETIME_HOURS")?;

        let request_timeout_secs: u64 = env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .context("Invalid REQUEST_TIMEOUT_SECS")?;

        let session_backend = match env::var("SESSION_BACKEND")
            .unwrap_or_else(|_| "redis".to_string())
            .as_str()
        {
            "redis" => SessionBackend::Redis,
            "memory" => SessionBackend::Memory,
            other => anyhow::bail!("SESSION_BACKEND must be `redis` or `memory`, got `{}`", other),
        };

        Ok(Self {
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:3939".to_string()),
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            redis_url: env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string()),
            session_backend,
            session_lifetime: Duration::from_secs(session_lifetime_hours * 3600),
            cookie_secure: env::var("COOKIE_SECURE")
                .unwrap_or_else(|_| "true".to_string())
                .parse()
                .context("Invalid COOKIE_SECURE (expected true or false)")?,
            request_timeout: Duration::from_secs(request_timeout_secs),
        })
    }
}
