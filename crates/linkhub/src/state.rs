//! Application state shared across all request handlers.

use std::sync::Arc;

use crate::config::Config;
use crate::error::UpstreamError;
use crate::hub;
use crate::links::LinkRegistry;
use crate::profile::Profile;
use crate::rewrite::DispatchTable;
use crate::upstream::{HttpTemplateSource, TemplateSource};

/// Shared application state available to all request handlers.
///
/// Everything here is built once at startup and only read afterwards.
#[derive(Clone)]
pub struct AppState {
    /// Links served at `/links` and rendered into the page.
    pub links: Arc<LinkRegistry>,

    /// Handlers applied to the template.
    pub dispatch: Arc<DispatchTable>,

    /// Source of the page template.
    pub template: Arc<dyn TemplateSource>,
}

impl AppState {
    /// Create the application state with the built-in profile and links.
    pub fn new(config: &Config) -> Result<Self, UpstreamError> {
        let template = HttpTemplateSource::new(&config.upstream_url, config.upstream_timeout)?;
        Ok(Self::with_parts(
            &Profile::default(),
            LinkRegistry::default(),
            Arc::new(template),
        ))
    }

    /// Assemble the state from explicit parts.
    pub fn with_parts(
        profile: &Profile,
        links: LinkRegistry,
        template: Arc<dyn TemplateSource>,
    ) -> Self {
        let dispatch = hub::dispatch_table(profile, &links);

        tracing::info!(
            links = links.len(),
            handlers = dispatch.len(),
            "application state initialized"
        );

        Self {
            links: Arc::new(links),
            dispatch: Arc::new(dispatch),
            template,
        }
    }
}
