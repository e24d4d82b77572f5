//! Fetching the template document.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;
use futures::{StreamExt, TryStreamExt};

use crate::error::UpstreamError;

/// Body of a successfully fetched template, delivered incrementally.
pub type TemplateStream = BoxStream<'static, Result<Bytes, UpstreamError>>;

/// Where the page template comes from.
#[async_trait]
pub trait TemplateSource: Send + Sync {
    /// Start fetching the template.
    ///
    /// Resolves once the response head is in; the body is read lazily
    /// through the returned stream.
    async fn fetch(&self) -> Result<TemplateStream, UpstreamError>;
}

/// Fetches the template over HTTP with reqwest.
#[derive(Debug, Clone)]
pub struct HttpTemplateSource {
    client: reqwest::Client,
    url: String,
}

impl HttpTemplateSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, UpstreamError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("linkhub/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl TemplateSource for HttpTemplateSource {
    async fn fetch(&self) -> Result<TemplateStream, UpstreamError> {
        let response = self.client.get(&self.url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::Status(status));
        }

        tracing::debug!(url = %self.url, status = %status, "template response received");

        Ok(response
            .bytes_stream()
            .map_err(UpstreamError::from)
            .boxed())
    }
}

/// A template held in memory, served in fixed chunks.
#[derive(Debug, Clone)]
pub struct StaticTemplateSource {
    body: Bytes,
    chunk_size: usize,
}

impl StaticTemplateSource {
    pub fn new(body: impl Into<Bytes>) -> Self {
        Self {
            body: body.into(),
            chunk_size: 8 * 1024,
        }
    }

    /// Split the body into chunks of `size` bytes.
    pub fn with_chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = size.max(1);
        self
    }
}

#[async_trait]
impl TemplateSource for StaticTemplateSource {
    async fn fetch(&self) -> Result<TemplateStream, UpstreamError> {
        let body = self.body.clone();
        let chunks: Vec<Result<Bytes, UpstreamError>> = (0..body.len())
            .step_by(self.chunk_size)
            .map(|start| Ok(body.slice(start..(start + self.chunk_size).min(body.len()))))
            .collect();
        Ok(futures::stream::iter(chunks).boxed())
    }
}
