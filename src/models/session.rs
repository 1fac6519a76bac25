use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The values a session can carry between requests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionData {
    /// A one-time message shown on the next rendered page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flash: Option<String>,
    /// The ID of the logged-in user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authenticated_user_id: Option<i64>,
    /// The path an anonymous visitor asked for before being sent to login.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_path: Option<String>,
    /// The per-session anti-forgery secret.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub csrf_secret: Option<String>,
}

/// A session as persisted in a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// The session values.
    pub data: SessionData,
    /// The timestamp after which the record is no longer valid.
    pub expires_at: DateTime<Utc>,
}

impl SessionRecord {
    /// Whether the record has outlived its lifetime.
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }
}
