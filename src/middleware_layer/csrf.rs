use axum::{
    Form,
    body::{Body, Bytes},
    extract::{FromRequest, FromRequestParts, Request},
    http::{HeaderValue, Method, header, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use crate::{
    crypto::csrf::{CSRF_HEADER, mask_token, verify_token},
    error::{AppError, Result},
    session::Session,
};

/// The largest form body buffered to look for the token.
const CSRF_BODY_LIMIT: usize = 1024 * 1024;

/// The masked token to embed in forms rendered for this request.
#[derive(Debug, Clone)]
pub struct CsrfToken(pub String);

impl<S> FromRequestParts<S> for CsrfToken
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self> {
        parts
            .extensions
            .get::<CsrfToken>()
            .cloned()
            .ok_or_else(|| AppError::Internal("CSRF layer is not installed on this route".to_string()))
    }
}

#[derive(Deserialize)]
struct CsrfField {
    #[serde(default)]
    csrf_token: String,
}

fn is_safe(method: &Method) -> bool {
    matches!(
        *method,
        Method::GET | Method::HEAD | Method::OPTIONS | Method::TRACE
    )
}

fn is_form(req: &Request) -> bool {
    req.headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"))
}

/// Pulls the submitted token out of the header or the form body.
///
/// The body is read into memory and put back, so the handler still sees the
/// complete form.
async fn submitted_token(req: Request) -> Result<(Option<String>, Request)> {
    if let Some(value) = req.headers().get(CSRF_HEADER) {
        let token = value.to_str().ok().map(str::to_string);
        return Ok((token, req));
    }

    if !is_form(&req) {
        return Ok((None, req));
    }

    let (parts, body) = req.into_parts();
    let bytes: Bytes = axum::body::to_bytes(body, CSRF_BODY_LIMIT)
        .await
        .map_err(|e| AppError::BadRequest(format!("Unreadable form body: {}", e)))?;

    let form_req = axum::http::Request::builder()
        .method(Method::POST)
        .header(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/x-www-form-urlencoded"),
        )
        .body(Body::from(bytes.clone()))
        .map_err(|e| AppError::Internal(format!("Failed to rebuild request: {}", e)))?;

    let token = Form::<CsrfField>::from_request(form_req, &())
        .await
        .ok()
        .map(|Form(field)| field.csrf_token);

    Ok((token, Request::from_parts(parts, Body::from(bytes))))
}

/// A middleware that rejects state-changing requests without a valid CSRF
/// token and hands a fresh token to the handler.
///
/// # Arguments
///
/// * `session` - The request's session, which holds the CSRF secret.
/// * `req` - The incoming request.
/// * `next` - The next middleware in the chain.
///
/// # Returns
///
/// The downstream `Response`, or a 400 if verification fails.
pub async fn verify_csrf(session: Session, req: Request, next: Next) -> Response {
    let secret = session.csrf_secret().await;

    let mut req = if is_safe(req.method()) {
        req
    } else {
        let (submitted, req) = match submitted_token(req).await {
            Ok(found) => found,
            Err(e) => return e.into_response(),
        };

        let valid = submitted
            .as_deref()
            .is_some_and(|token| verify_token(&secret, token));

        if !valid {
            tracing::warn!(
                "❌ CSRF: {} {} rejected ({})",
                req.method(),
                req.uri().path(),
                if submitted.is_some() { "token mismatch" } else { "token missing" }
            );
            return AppError::Csrf.into_response();
        }

        tracing::debug!("✅ CSRF token valid");
        req
    };

    let Some(masked) = mask_token(&secret) else {
        return AppError::Internal("Session holds a malformed CSRF secret".to_string())
            .into_response();
    };
    req.extensions_mut().insert(CsrfToken(masked));

    next.run(req).await
}
