//! Cookie-keyed server-side sessions.
//!
//! A [`Session`] is loaded once per request by the session layer, handed to
//! handlers through request extensions, and committed back to its
//! [`SessionStore`] exactly once after the handler has produced a response.
//! Nothing is written for a request that never touched its session.

pub mod redis;
pub mod store;

use std::{sync::Arc, time::Duration};

use axum::{extract::FromRequestParts, http::request::Parts};
use base64::{Engine as _, engine::general_purpose};
use chrono::Utc;
use rand::{RngCore, rngs::OsRng};
use tokio::sync::Mutex;
use tower_cookies::{Cookie, Cookies, cookie::SameSite};

use crate::{
    crypto::csrf::generate_csrf_secret,
    error::{AppError, Result},
    models::session::{SessionData, SessionRecord},
};
use store::SessionStore;

/// The name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "session";

/// The size of a session token in bytes.
const SESSION_TOKEN_SIZE: usize = 32;

/// Generates an unguessable, URL-safe session token.
pub fn generate_session_token() -> String {
    let mut token = [0u8; SESSION_TOKEN_SIZE];
    OsRng.fill_bytes(&mut token);

    general_purpose::URL_SAFE_NO_PAD.encode(token)
}

/// Loads and commits sessions against a store.
#[derive(Clone)]
pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    lifetime: Duration,
    cookie_secure: bool,
}

impl SessionManager {
    /// Creates a new `SessionManager`.
    ///
    /// # Arguments
    ///
    /// * `store` - Where session records are kept.
    /// * `lifetime` - How long a record lives after its last write.
    /// * `cookie_secure` - Whether the cookie is restricted to HTTPS.
    pub fn new(store: Arc<dyn SessionStore>, lifetime: Duration, cookie_secure: bool) -> Self {
        Self {
            store,
            lifetime,
            cookie_secure,
        }
    }

    /// Loads the session named by `token`, or starts an empty one if the
    /// token is absent, unknown or expired.
    pub async fn load(&self, token: Option<&str>) -> Result<Session> {
        let record = match token {
            Some(token) => self.store.load(token).await?,
            None => None,
        };

        let inner = match record {
            Some(record) => SessionInner {
                loaded_token: token.map(str::to_string),
                token: token.map(str::to_string),
                data: record.data,
                modified: false,
                destroyed: false,
            },
            None => {
                if token.is_some() {
                    tracing::debug!("Session cookie names no live session, starting fresh");
                }
                SessionInner::default()
            }
        };

        Ok(Session {
            inner: Arc::new(Mutex::new(inner)),
        })
    }

    /// Writes the session back to the store and updates the cookie.
    ///
    /// Untouched sessions are not written. A renewed or destroyed session
    /// also deletes the record it was loaded from.
    pub async fn commit(&self, session: &Session, cookies: &Cookies) -> Result<()> {
        let mut inner = session.inner.lock().await;

        if !inner.modified && !inner.destroyed {
            return Ok(());
        }

        if let Some(loaded) = inner.loaded_token.clone() {
            if inner.token.as_deref() != Some(loaded.as_str()) {
                self.store.delete(&loaded).await?;
                tracing::debug!("🔄 Previous session token retired");
            }
        }

        if inner.destroyed {
            if inner.loaded_token.is_some() {
                let mut cookie = Cookie::new(SESSION_COOKIE, "");
                cookie.set_path("/");
                cookies.remove(cookie);
            }
            inner.loaded_token = None;
        } else {
            let token = inner
                .token
                .get_or_insert_with(generate_session_token)
                .clone();

            let lifetime = chrono::Duration::from_std(self.lifetime)
                .map_err(|e| AppError::Internal(format!("Invalid session lifetime: {}", e)))?;
            let record = SessionRecord {
                data: inner.data.clone(),
                expires_at: Utc::now() + lifetime,
            };

            self.store.save(&token, &record, self.lifetime).await?;
            cookies.add(self.session_cookie(token.clone()));
            inner.loaded_token = Some(token);
        }

        inner.modified = false;
        inner.destroyed = false;

        Ok(())
    }

    fn session_cookie(&self, token: String) -> Cookie<'static> {
        let mut cookie = Cookie::new(SESSION_COOKIE, token);
        cookie.set_http_only(true);
        cookie.set_secure(self.cookie_secure);
        cookie.set_same_site(SameSite::Lax);
        cookie.set_path("/");
        cookie.set_max_age(tower_cookies::cookie::time::Duration::seconds(
            self.lifetime.as_secs() as i64,
        ));
        cookie
    }
}

#[derive(Debug, Default)]
struct SessionInner {
    /// The token the request arrived with, if it named a live session.
    loaded_token: Option<String>,
    /// The token the session will be saved under.
    token: Option<String>,
    data: SessionData,
    modified: bool,
    destroyed: bool,
}

impl SessionInner {
    fn touch(&mut self) {
        self.modified = true;
        self.destroyed = false;
    }
}

/// The session attached to the current request.
///
/// Cloning is cheap and every clone refers to the same session.
#[derive(Clone)]
pub struct Session {
    inner: Arc<Mutex<SessionInner>>,
}

impl Session {
    /// The current token, if the session has been persisted or renewed.
    pub async fn token(&self) -> Option<String> {
        self.inner.lock().await.token.clone()
    }

    /// The ID of the logged-in user.
    pub async fn user_id(&self) -> Option<i64> {
        self.inner.lock().await.data.authenticated_user_id
    }

    /// Records the logged-in user.
    pub async fn put_user_id(&self, user_id: i64) {
        let mut inner = self.inner.lock().await;
        inner.data.authenticated_user_id = Some(user_id);
        inner.touch();
    }

    /// Forgets the logged-in user.
    pub async fn remove_user_id(&self) {
        let mut inner = self.inner.lock().await;
        if inner.data.authenticated_user_id.take().is_some() {
            inner.touch();
        }
    }

    /// Queues a message for the next rendered page.
    pub async fn put_flash(&self, message: impl Into<String>) {
        let mut inner = self.inner.lock().await;
        inner.data.flash = Some(message.into());
        inner.touch();
    }

    /// Takes the queued message, if any.
    pub async fn pop_flash(&self) -> Option<String> {
        let mut inner = self.inner.lock().await;
        let flash = inner.data.flash.take();
        if flash.is_some() {
            inner.touch();
        }
        flash
    }

    /// Remembers where to send the user after login.
    pub async fn put_redirect_path(&self, path: impl Into<String>) {
        let mut inner = self.inner.lock().await;
        inner.data.redirect_path = Some(path.into());
        inner.touch();
    }

    /// Takes the remembered post-login destination, if any.
    pub async fn pop_redirect_path(&self) -> Option<String> {
        let mut inner = self.inner.lock().await;
        let path = inner.data.redirect_path.take();
        if path.is_some() {
            inner.touch();
        }
        path
    }

    /// The session's CSRF secret, created on first use.
    pub async fn csrf_secret(&self) -> String {
        let mut inner = self.inner.lock().await;
        if let Some(secret) = &inner.data.csrf_secret {
            return secret.clone();
        }

        let secret = generate_csrf_secret();
        inner.data.csrf_secret = Some(secret.clone());
        inner.touch();
        secret
    }

    /// Moves the session data to a fresh token. Call whenever the
    /// authentication state changes.
    pub async fn renew(&self) {
        let mut inner = self.inner.lock().await;
        inner.token = Some(generate_session_token());
        inner.touch();
    }

    /// Drops all session data and the token.
    pub async fn destroy(&self) {
        let mut inner = self.inner.lock().await;
        inner.data = SessionData::default();
        inner.token = None;
        inner.modified = false;
        inner.destroyed = true;
    }
}

impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self> {
        parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or_else(|| AppError::Internal("Session layer is not installed on this route".to_string()))
    }
}
