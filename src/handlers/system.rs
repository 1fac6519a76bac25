use crate::error::AppError;

/// Liveness check. Touches neither the session nor any store.
pub async fn ping() -> &'static str {
    "OK"
}

/// The response for paths no route matches, identical to a 404 raised by a
/// handler.
pub async fn not_found() -> AppError {
    AppError::NotFound
}
