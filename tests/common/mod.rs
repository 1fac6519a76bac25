#![allow(dead_code)]

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, AtomicUsize, Ordering},
};
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Request, StatusCode, header},
};
use chrono::{TimeZone, Utc};
use http_body_util::BodyExt;
use once_cell::sync::Lazy;
use regex::Regex;
use tower::ServiceExt;

use snippetbox::{
    config::{Config, SessionBackend},
    error::{AppError, Result},
    models::{snippet::Snippet, user::User},
    repositories::{snippet::SnippetRepository, user::UserRepository},
    routes,
    session::{SESSION_COOKIE, SessionManager, store::MemorySessionStore},
    state::AppState,
};

pub const ALICE_ID: i64 = 39;
pub const ALICE_EMAIL: &str = "alice@example.com";
pub const ALICE_PASSWORD: &str = "pa$$word";
pub const TAKEN_EMAIL: &str = "dupe@example.com";

static CSRF_RX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"<input type="hidden" name="csrf_token" value="([^"]+)">"#).unwrap());

pub fn mock_snippet() -> Snippet {
    Snippet {
        id: 1,
        title: "An old silent pond".to_string(),
        content: "An old silent pond...".to_string(),
        created: Utc.with_ymd_and_hms(2022, 1, 1, 10, 0, 0).unwrap(),
        expires: Utc.with_ymd_and_hms(2023, 1, 1, 10, 0, 0).unwrap(),
    }
}

/// A snippet store that knows only snippet 1.
#[derive(Default)]
pub struct MockSnippets {
    pub inserts: AtomicUsize,
    pub gets: AtomicUsize,
    pub panic_on_latest: AtomicBool,
    pub stall_latest: AtomicBool,
}

#[async_trait]
impl SnippetRepository for MockSnippets {
    async fn insert(&self, _title: &str, _content: &str, _expires_days: i32) -> Result<i64> {
        self.inserts.fetch_add(1, Ordering::SeqCst);
        Ok(2)
    }

    async fn get(&self, id: i64) -> Result<Snippet> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        match id {
            1 => Ok(mock_snippet()),
            _ => Err(AppError::NotFound),
        }
    }

    async fn latest(&self) -> Result<Vec<Snippet>> {
        if self.panic_on_latest.load(Ordering::SeqCst) {
            panic!("snippet store exploded");
        }
        if self.stall_latest.load(Ordering::SeqCst) {
            tokio::time::sleep(Duration::from_secs(60)).await;
        }
        Ok(vec![mock_snippet()])
    }
}

/// A user store holding only Alice.
#[derive(Default)]
pub struct MockUsers {
    pub inserts: AtomicUsize,
    pub exists_lookups: AtomicUsize,
}

#[async_trait]
impl UserRepository for MockUsers {
    async fn insert(&self, _name: &str, email: &str, _password: &str) -> Result<()> {
        self.inserts.fetch_add(1, Ordering::SeqCst);
        match email {
            TAKEN_EMAIL => Err(AppError::DuplicateEmail),
            _ => Ok(()),
        }
    }

    async fn authenticate(&self, email: &str, password: &str) -> Result<i64> {
        if email == ALICE_EMAIL && password == ALICE_PASSWORD {
            Ok(ALICE_ID)
        } else {
            Err(AppError::InvalidCredentials)
        }
    }

    async fn exists(&self, id: i64) -> Result<bool> {
        self.exists_lookups.fetch_add(1, Ordering::SeqCst);
        Ok(id == ALICE_ID)
    }

    async fn get(&self, id: i64) -> Result<User> {
        match id {
            ALICE_ID => Ok(User {
                id: ALICE_ID,
                name: "Alice Jones".to_string(),
                email: ALICE_EMAIL.to_string(),
                created: Utc.with_ymd_and_hms(2022, 1, 1, 10, 0, 0).unwrap(),
            }),
            _ => Err(AppError::NotFound),
        }
    }
}

pub fn test_config() -> Config {
    Config {
        bind_addr: "127.0.0.1:0".to_string(),
        database_url: "postgres://unused".to_string(),
        redis_url: "redis://unused".to_string(),
        session_backend: SessionBackend::Memory,
        session_lifetime: Duration::from_secs(12 * 3600),
        cookie_secure: true,
        request_timeout: Duration::from_secs(10),
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    pub fn location(&self) -> Option<&str> {
        self.headers
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
    }

    pub fn csrf_token(&self) -> Option<String> {
        CSRF_RX
            .captures(&self.body)
            .map(|caps| caps[1].to_string())
    }
}

/// The full router plus a one-cookie jar, like a browser with a single tab.
pub struct TestApp {
    pub router: Router,
    pub snippets: Arc<MockSnippets>,
    pub users: Arc<MockUsers>,
    pub store: MemorySessionStore,
    jar: Mutex<Option<String>>,
}

impl TestApp {
    pub fn new() -> Self {
        let snippets = Arc::new(MockSnippets::default());
        let users = Arc::new(MockUsers::default());
        let store = MemorySessionStore::new();
        let config = test_config();

        let state = AppState::new(
            snippets.clone(),
            users.clone(),
            SessionManager::new(
                Arc::new(store.clone()),
                config.session_lifetime,
                config.cookie_secure,
            ),
        );

        Self {
            router: routes::app(state, &config),
            snippets,
            users,
            store,
            jar: Mutex::new(None),
        }
    }

    /// The session token currently held by the jar.
    pub fn session_token(&self) -> Option<String> {
        self.jar.lock().unwrap().clone()
    }

    pub fn set_session_token(&self, token: &str) {
        *self.jar.lock().unwrap() = Some(token.to_string());
    }

    pub async fn get(&self, path: &str) -> TestResponse {
        let request = self.with_cookie(Request::get(path)).body(Body::empty()).unwrap();
        self.send(request).await
    }

    pub async fn post_form(&self, path: &str, form: &str) -> TestResponse {
        let request = self
            .with_cookie(Request::post(path))
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(form.to_string()))
            .unwrap();
        self.send(request).await
    }

    /// Fetches a page with a form and returns its CSRF token.
    pub async fn csrf_token_from(&self, path: &str) -> String {
        let page = self.get(path).await;
        assert_eq!(page.status, StatusCode::OK, "GET {}", path);
        page.csrf_token().expect("form should carry a CSRF token")
    }

    pub async fn login_as_alice(&self) -> TestResponse {
        let token = self.csrf_token_from("/user/login").await;
        self.post_form(
            "/user/login",
            &format!("csrf_token={}&email=alice%40example.com&password=pa%24%24word", token),
        )
        .await
    }

    fn with_cookie(&self, builder: axum::http::request::Builder) -> axum::http::request::Builder {
        match self.session_token() {
            Some(token) => builder.header(header::COOKIE, format!("{}={}", SESSION_COOKIE, token)),
            None => builder,
        }
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();

        for value in response.headers().get_all(header::SET_COOKIE) {
            let value = value.to_str().unwrap();
            let pair = value.split(';').next().unwrap_or_default();
            if let Some(token) = pair.strip_prefix(&format!("{}=", SESSION_COOKIE)) {
                *self.jar.lock().unwrap() = if token.is_empty() {
                    None
                } else {
                    Some(token.to_string())
                };
            }
        }

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();

        TestResponse {
            status,
            headers,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }
}
