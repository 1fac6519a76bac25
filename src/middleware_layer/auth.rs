use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderValue, Method, header, request::Parts},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use crate::{error::AppError, session::Session, state::AppState};

/// Where anonymous visitors to protected pages are sent.
pub const LOGIN_PATH: &str = "/user/login";

/// Who is making the current request. Computed per request and never
/// cached across requests.
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthContext {
    user_id: Option<i64>,
}

impl AuthContext {
    /// A request from a confirmed, existing user.
    pub fn authenticated(user_id: i64) -> Self {
        Self {
            user_id: Some(user_id),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user_id.is_some()
    }

    /// The ID of the authenticated user.
    pub fn user_id(&self) -> Option<i64> {
        self.user_id
    }
}

impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<AuthContext>()
            .copied()
            .unwrap_or_default())
    }
}

/// A middleware that works out whether the session belongs to a live user.
///
/// A session pointing at a user that no longer exists is treated as
/// anonymous, and the stale ID is dropped from the session.
///
/// # Arguments
///
/// * `state` - The application state.
/// * `session` - The request's session.
/// * `req` - The incoming request.
/// * `next` - The next middleware in the chain.
///
/// # Returns
///
/// The downstream `Response`, or a 500 if the user lookup fails.
pub async fn authenticate(
    State(state): State<AppState>,
    session: Session,
    mut req: Request,
    next: Next,
) -> Response {
    let Some(user_id) = session.user_id().await.filter(|id| *id > 0) else {
        return next.run(req).await;
    };

    match state.users.exists(user_id).await {
        Ok(true) => {
            tracing::debug!("✅ User authenticated: {}", user_id);
            req.extensions_mut()
                .insert(AuthContext::authenticated(user_id));
        }
        Ok(false) => {
            tracing::warn!("⚠️ Session references unknown user {}, dropping it", user_id);
            session.remove_user_id().await;
        }
        Err(e) => return e.into_response(),
    }

    next.run(req).await
}

/// A middleware that only lets authenticated users through.
///
/// Anonymous requests are sent to the login page with a 303. For `GET` and
/// `HEAD` the requested path is remembered in the session first, since the
/// post-login redirect can only replay a `GET`. Authenticated responses are
/// marked `Cache-Control: no-store`.
///
/// # Arguments
///
/// * `auth` - The request's authentication context.
/// * `session` - The request's session.
/// * `req` - The incoming request.
/// * `next` - The next middleware in the chain.
///
/// # Returns
///
/// The downstream `Response`, or a redirect to the login page.
pub async fn require_authentication(
    auth: AuthContext,
    session: Session,
    req: Request,
    next: Next,
) -> Response {
    if !auth.is_authenticated() {
        tracing::debug!("🔐 Anonymous request to {}, redirecting to login", req.uri().path());
        if matches!(*req.method(), Method::GET | Method::HEAD) {
            session.put_redirect_path(req.uri().path()).await;
        }
        return Redirect::to(LOGIN_PATH).into_response();
    }

    let mut response = next.run(req).await;
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}
