use axum::{Router, extract::DefaultBodyLimit, routing::post};

use super::handlers::process_image;
use crate::state::AppState;

pub const MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

pub fn routes() -> Router<AppState> {
    routes_with_limit(MAX_UPLOAD_BYTES)
}

/// Upload routes with a custom request body limit in bytes.
pub fn routes_with_limit(limit: usize) -> Router<AppState> {
    Router::new()
        .route("/process", post(process_image))
        .layer(DefaultBodyLimit::max(limit))
}
