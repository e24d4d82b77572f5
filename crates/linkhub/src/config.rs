//! Application configuration loaded from environment variables.

use std::time::Duration;

/// Template served by the hub unless overridden.
pub const DEFAULT_UPSTREAM_URL: &str = "https://static-links-page.signalnerve.workers.dev";

const DEFAULT_UPSTREAM_TIMEOUT: Duration = Duration::from_secs(10);

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address (e.g., "0.0.0.0:8787").
    pub bind_addr: String,

    /// URL of the HTML template that gets rewritten.
    pub upstream_url: String,

    /// Total time allowed for the template fetch, body included.
    pub upstream_timeout: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Optional:
    /// - `LINKHUB_BIND_ADDR`: Server bind address (default: "0.0.0.0:8787")
    /// - `LINKHUB_UPSTREAM_URL`: Template URL (default: [`DEFAULT_UPSTREAM_URL`])
    /// - `LINKHUB_UPSTREAM_TIMEOUT_SECS`: Fetch timeout in seconds (default: 10)
    pub fn from_env() -> anyhow::Result<Self> {
        let bind_addr =
            std::env::var("LINKHUB_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8787".to_string());

        let upstream_url = std::env::var("LINKHUB_UPSTREAM_URL")
            .map(|url| url.trim().to_string())
            .ok()
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| DEFAULT_UPSTREAM_URL.to_string());

        let upstream_timeout = std::env::var("LINKHUB_UPSTREAM_TIMEOUT_SECS")
            .ok()
            .and_then(|secs| secs.trim().parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_UPSTREAM_TIMEOUT);

        tracing::info!(
            bind_addr = %bind_addr,
            upstream_url = %upstream_url,
            upstream_timeout_secs = upstream_timeout.as_secs(),
            "linkhub configuration loaded"
        );

        Ok(Self {
            bind_addr,
            upstream_url,
            upstream_timeout,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8787".to_string(),
            upstream_url: DEFAULT_UPSTREAM_URL.to_string(),
            upstream_timeout: DEFAULT_UPSTREAM_TIMEOUT,
        }
    }
}
