//! Error types for the link hub.
//!
//! Only [`LinkHubError`] ever becomes an HTTP error. Upstream failures degrade
//! to the plain-text fallback page, and mutation failures are recorded by the
//! rewriter without reaching the caller.

use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};

/// Boxed error carried through the rewrite stream.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failure fetching the template document.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    /// Connection, TLS, timeout or body read failure.
    #[error("upstream request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The upstream answered with a non-success status.
    #[error("upstream returned status {0}")]
    Status(StatusCode),
}

/// A handler could not be applied to a matched element.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MutationError {
    /// Inner content was set or appended on an element that has none.
    #[error("<{0}> cannot hold content")]
    ContentOnVoidElement(String),

    /// The attribute name would not survive serialization.
    #[error("invalid attribute name {0:?}")]
    InvalidAttributeName(String),
}

/// Terminal error of a rewritten output stream.
#[derive(Debug, thiserror::Error)]
pub enum RewriteError {
    /// The input ended abnormally mid-document.
    #[error("template stream terminated: {0}")]
    StreamTerminated(#[source] BoxError),
}

/// Errors surfaced as HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum LinkHubError {
    /// JSON serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl IntoResponse for LinkHubError {
    fn into_response(self) -> Response {
        match &self {
            Self::Serialization(err) => tracing::error!(error = %err, "serialization error"),
        }

        (
            StatusCode::INTERNAL_SERVER_ERROR,
            [(
                header::CONTENT_TYPE,
                HeaderValue::from_static("text/plain; charset=utf-8"),
            )],
            "An internal error occurred",
        )
            .into_response()
    }
}
