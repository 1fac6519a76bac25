use axum::{
    extract::Path,
    http::{HeaderValue, header},
    response::{IntoResponse, Response},
};
use rust_embed::RustEmbed;

use crate::error::{AppError, Result};

/// The contents of `ui/static`, compiled into the binary.
#[derive(RustEmbed)]
#[folder = "ui/static/"]
struct StaticAssets;

/// Serves a file from the embedded asset tree. `/static/css/main.css` maps
/// to `css/main.css`; anything unknown is the application's usual 404.
pub async fn static_asset(Path(path): Path<String>) -> Result<Response> {
    let file = StaticAssets::get(&path).ok_or(AppError::NotFound)?;

    let content_type = mime_guess::from_path(&path)
        .first_or_octet_stream()
        .to_string();
    let content_type = HeaderValue::from_str(&content_type)
        .map_err(|e| AppError::Internal(format!("Bad content type for {}: {}", path, e)))?;

    let mut response = file.data.into_owned().into_response();
    response
        .headers_mut()
        .insert(header::CONTENT_TYPE, content_type);
    Ok(response)
}
