//! Page routes.

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use std::sync::Arc;

use super::SharedState;

/// Handler for GET /
///
/// Serves `index.html` from the static directory.
pub async fn index_handler(State(state): State<Arc<SharedState>>) -> Response {
    let Some(dir) = state.static_dir.as_ref() else {
        return (StatusCode::NOT_FOUND, "No static directory configured").into_response();
    };

    let path = dir.join("index.html");
    match tokio::fs::read_to_string(&path).await {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            log::warn!("Cannot read {}: {}", path.display(), e);
            (StatusCode::NOT_FOUND, "index.html not found").into_response()
        }
    }
}
