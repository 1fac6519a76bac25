use axum::{
    Router,
    http::StatusCode,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
};
use tower_cookies::CookieManagerLayer;
use tower_http::{
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::{
    config::Config,
    handlers::{assets, snippets, system, users},
    middleware_layer::{
        auth::{authenticate, require_authentication},
        csrf::verify_csrf,
        headers::security_headers,
        recover::recover_panic,
        session::load_and_save,
    },
    state::AppState,
};

/// Routes that need a logged-in user.
fn protected_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/snippet/create",
            get(snippets::snippet_create).post(snippets::snippet_create_post),
        )
        .route("/user/logout", post(users::logout))
        .route("/account/view", get(users::account_view))
        .route_layer(from_fn(require_authentication))
}

/// Every route that carries a session.
///
/// Layers run outermost first: cookies, session, CSRF, then the auth
/// context. Protected routes add the login requirement last.
fn dynamic_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(snippets::home))
        .route("/snippet/view/{id}", get(snippets::snippet_view))
        .route("/user/signup", get(users::signup).post(users::signup_post))
        .route("/user/login", get(users::login).post(users::login_post))
        .merge(protected_routes())
        .route_layer(from_fn_with_state(state.clone(), authenticate))
        .route_layer(from_fn(verify_csrf))
        .route_layer(from_fn_with_state(state.clone(), load_and_save))
        .route_layer(CookieManagerLayer::new())
}

/// Builds the complete application.
///
/// # Arguments
///
/// * `state` - The application state.
/// * `config` - Supplies the request deadline.
///
/// # Returns
///
/// The `Router`, wrapped in panic recovery, request tracing and security
/// headers, in that order from the outside in.
pub fn app(state: AppState, config: &Config) -> Router {
    Router::new()
        .route("/ping", get(system::ping))
        .route("/static/{*path}", get(assets::static_asset))
        .merge(dynamic_routes(&state))
        .fallback(system::not_found)
        .with_state(state)
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            config.request_timeout,
        ))
        .layer(from_fn(security_headers))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default().level(Level::INFO))
                .on_request(DefaultOnRequest::default().level(Level::DEBUG))
                .on_response(DefaultOnResponse::default().level(Level::INFO))
                .on_failure(DefaultOnFailure::default().level(Level::ERROR)),
        )
        .layer(from_fn(recover_panic))
}
