use chrono::{DateTime, Utc};
use tokio_postgres::Row;

/// A user-submitted title/content pair with a limited lifetime.
#[derive(Debug, Clone, PartialEq)]
pub struct Snippet {
    /// The unique identifier for the snippet.
    pub id: i64,
    /// The snippet's title.
    pub title: String,
    /// The snippet's body.
    pub content: String,
    /// The timestamp when the snippet was created.
    pub created: DateTime<Utc>,
    /// The timestamp after which the snippet is no longer shown.
    pub expires: DateTime<Utc>,
}

impl From<&Row> for Snippet {
    fn from(row: &Row) -> Self {
        Self {
            id: row.get("id"),
            title: row.get("title"),
            content: row.get("content"),
            created: row.get("created"),
            expires: row.get("expires"),
        }
    }
}
