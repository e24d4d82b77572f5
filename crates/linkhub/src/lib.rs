//! Linkhub - a personal link page served by rewriting a remote template.
//!
//! The template is fetched on every page request and streamed back through a
//! selective HTML rewriter that fills in the profile, the social link, the
//! page title, the background and the list of outbound links. The same links
//! are available as JSON.
//!
//! # Architecture
//!
//! - **Rewrite**: single-pass streaming HTML transform driven by a selector dispatch table
//! - **Hub**: the handler bindings for the template (`div#links`, `img#avatar`, ...)
//! - **Upstream**: template fetch behind the [`TemplateSource`](upstream::TemplateSource) trait
//!
//! # URL Pattern
//!
//! ```text
//! /links    (any method) -> JSON array of {"name", "url"}
//! /{other}  (any method) -> rewritten page, or a plain-text notice if the
//!                           template is unavailable
//! ```

pub mod config;
pub mod error;
pub mod hub;
pub mod links;
pub mod profile;
pub mod rewrite;
pub mod routes;
pub mod state;
pub mod upstream;

pub use config::Config;
pub use routes::router;
pub use state::AppState;
