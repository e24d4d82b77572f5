//! Route definitions for the link hub.
//!
//! ## Routes
//!
//! - `/links` (any method) - The link registry as JSON
//! - anything else - The rewritten template page

mod links;
mod page;

use axum::Router;
use axum::routing::any;

use crate::state::AppState;

pub use page::FETCH_FAILED_BODY;

/// Exact path of the JSON endpoint. `/links/` is served the page.
pub const LINKS_PATH: &str = "/links";

/// Build the complete link hub router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(LINKS_PATH, any(links::links_handler))
        .fallback(page::page_handler)
        .with_state(state)
}
