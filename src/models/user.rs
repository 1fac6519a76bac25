use chrono::{DateTime, Utc};
use tokio_postgres::Row;

/// Represents a registered account.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    /// The unique identifier for the user.
    pub id: i64,
    /// The user's display name.
    pub name: String,
    /// The user's email address.
    pub email: String,
    /// The timestamp when the user signed up.
    pub created: DateTime<Utc>,
}

impl From<&Row> for User {
    fn from(row: &Row) -> Self {
        Self {
            id: row.get("id"),
            name: row.get("name"),
            email: row.get("email"),
            created: row.get("created"),
        }
    }
}
