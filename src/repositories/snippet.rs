use async_trait::async_trait;
use deadpool_postgres::Pool;

use crate::{
    error::{AppError, Result},
    models::snippet::Snippet,
};

/// The number of snippets shown on the home page.
pub const LATEST_LIMIT: i64 = 10;

/// Storage for snippets.
#[async_trait]
pub trait SnippetRepository: Send + Sync {
    /// Stores a snippet that expires `expires_days` from now and returns its ID.
    async fn insert(&self, title: &str, content: &str, expires_days: i32) -> Result<i64>;

    /// Fetches an unexpired snippet, or `AppError::NotFound`.
    async fn get(&self, id: i64) -> Result<Snippet>;

    /// Fetches up to ten unexpired snippets, newest first.
    async fn latest(&self) -> Result<Vec<Snippet>>;
}

/// A `SnippetRepository` backed by PostgreSQL.
#[derive(Clone)]
pub struct PgSnippetRepository {
    pool: Pool,
}

impl PgSnippetRepository {
    /// Creates a new `PgSnippetRepository`.
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SnippetRepository for PgSnippetRepository {
    async fn insert(&self, title: &str, content: &str, expires_days: i32) -> Result<i64> {
        let client = self.pool.get().await?;
        let row = client
            .query_one(
                r#"
                INSERT INTO snippets (title, content, created, expires)
                VALUES ($1, $2, NOW(), NOW() + make_interval(days => $3))
                RETURNING id
                "#,
                &[&title, &content, &expires_days],
            )
            .await?;
        Ok(row.get("id"))
    }

    async fn get(&self, id: i64) -> Result<Snippet> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt(
                r#"
                SELECT id, title, content, created, expires
                FROM snippets
                WHERE expires > NOW() AND id = $1
                "#,
                &[&id],
            )
            .await?
            .ok_or(AppError::NotFound)?;
        Ok(Snippet::from(&row))
    }

    async fn latest(&self) -> Result<Vec<Snippet>> {
        let client = self.pool.get().await?;
        let rows = client
            .query(
                r#"
                SELECT id, title, content, created, expires
                FROM snippets
                WHERE expires > NOW()
                ORDER BY id DESC
                LIMIT $1
                "#,
                &[&LATEST_LIMIT],
            )
            .await?;
        Ok(rows.iter().map(Snippet::from).collect())
    }
}
