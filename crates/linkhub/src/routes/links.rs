//! JSON endpoint for the link registry.

use axum::extract::State;
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};

use crate::error::LinkHubError;
use crate::state::AppState;

/// Serve the registry as `[{"name": .., "url": ..}, ..]` in registry order.
pub async fn links_handler(State(state): State<AppState>) -> Result<Response, LinkHubError> {
    let json_string = state.links.to_json()?;

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );

    Ok((StatusCode::OK, headers, json_string).into_response())
}
