use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tower_cookies::Cookies;

use crate::{session::SESSION_COOKIE, state::AppState};

/// A middleware that loads the request's session and commits it once the
/// handler has produced a response.
///
/// The commit happens for error responses too. If it fails, the handler's
/// response is replaced by a 500 since the client would otherwise be shown
/// state that was never saved.
///
/// # Arguments
///
/// * `state` - The application state.
/// * `cookies` - The request cookies.
/// * `req` - The incoming request.
/// * `next` - The next middleware in the chain.
///
/// # Returns
///
/// The downstream `Response`.
pub async fn load_and_save(
    State(state): State<AppState>,
    cookies: Cookies,
    mut req: Request,
    next: Next,
) -> Response {
    let token = cookies
        .get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string());

    let session = match state.sessions.load(token.as_deref()).await {
        Ok(session) => session,
        Err(e) => return e.into_response(),
    };

    req.extensions_mut().insert(session.clone());

    let response = next.run(req).await;

    if let Err(e) = state.sessions.commit(&session, &cookies).await {
        tracing::error!("❌ Failed to persist session");
        return e.into_response();
    }

    response
}
