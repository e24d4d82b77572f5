//! The rewritten page.

use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, HeaderValue, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};

use crate::rewrite::rewrite_stream;
use crate::state::AppState;

/// Body returned when the template cannot be fetched.
pub const FETCH_FAILED_BODY: &str = "Failed to fetch static webpage";

/// Fetch the template and stream it back through the rewriter.
///
/// Fetch failures (transport errors and non-success statuses alike) are
/// answered with a plain-text 200; there is no retry.
pub async fn page_handler(State(state): State<AppState>, uri: Uri) -> Response {
    let template = match state.template.fetch().await {
        Ok(template) => template,
        Err(err) => {
            tracing::warn!(error = %err, path = %uri.path(), "failed to fetch template");
            return fetch_failed_response();
        }
    };

    let body = Body::from_stream(rewrite_stream(template, Arc::clone(&state.dispatch)));

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/html; charset=utf-8"),
    );
    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );

    (StatusCode::OK, headers, body).into_response()
}

fn fetch_failed_response() -> Response {
    (
        StatusCode::OK,
        [(
            header::CONTENT_TYPE,
            HeaderValue::from_static("text/plain; charset=utf-8"),
        )],
        FETCH_FAILED_BODY,
    )
        .into_response()
}
