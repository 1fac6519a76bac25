use std::{any::Any, backtrace::Backtrace, panic::AssertUnwindSafe};

use axum::{
    extract::Request,
    http::{HeaderValue, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use futures::FutureExt;

use crate::middleware_layer::headers::set_security_headers;

/// Installs a process-wide panic hook that logs the panic location and a
/// backtrace through `tracing`.
///
/// The hook runs before unwinding starts, so the trace points at the fault.
/// [`recover_panic`] only sees the payload after the stack is gone.
pub fn install_panic_hook() {
    std::panic::set_hook(Box::new(|info| {
        let trace = Backtrace::force_capture();
        let location = info
            .location()
            .map(|l| l.to_string())
            .unwrap_or_else(|| "unknown location".to_string());

        tracing::error!(
            "💥 Panic at {}: {}\n{}",
            location,
            panic_message(info.payload()),
            trace
        );
    }));
}

/// A middleware that turns a panic anywhere below it into a plain 500.
///
/// The response carries `Connection: close` so the client does not reuse a
/// connection whose handler died half way through. The security headers are
/// set here too, since the panic unwound past the layer that adds them.
///
/// # Arguments
///
/// * `req` - The incoming request.
/// * `next` - The next middleware in the chain.
///
/// # Returns
///
/// The downstream `Response`, or a 500 if it panicked.
pub async fn recover_panic(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let uri = req.uri().clone();

    match AssertUnwindSafe(next.run(req)).catch_unwind().await {
        Ok(response) => response,
        Err(payload) => {
            tracing::error!(
                "💥 Handler panicked on {} {}: {}",
                method,
                uri,
                panic_message(payload.as_ref())
            );

            let mut response = (
                StatusCode::INTERNAL_SERVER_ERROR,
                StatusCode::INTERNAL_SERVER_ERROR
                    .canonical_reason()
                    .unwrap_or("Internal Server Error"),
            )
                .into_response();
            response
                .headers_mut()
                .insert(header::CONNECTION, HeaderValue::from_static("close"));
            set_security_headers(response.headers_mut());
            response
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic payload"
    }
}
