//! Content-fetch capability: retrieving page bodies for extraction.

use async_trait::async_trait;

use crate::error::{ProviderError, SearchError};
use crate::http;

/// A fetched page body.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedPage {
    /// URL after redirects.
    pub url: String,
    /// `Content-Type` header, lowercased, without parameters.
    pub content_type: Option<String>,
    pub body: String,
    /// The body hit the size cap and was cut off.
    pub truncated: bool,
}

impl FetchedPage {
    /// Whether the body should be treated as HTML. Missing content types
    /// are sniffed from the body.
    pub fn is_html(&self) -> bool {
        match self.content_type.as_deref() {
            Some(ct) => ct.contains("html") || ct.contains("xml"),
            None => {
                let head: String = self.body.chars().take(512).collect::<String>().to_ascii_lowercase();
                head.contains("<html") || head.contains("<!doctype html") || head.contains("<body")
            }
        }
    }
}

/// Something that can fetch a URL for the content extractor.
#[async_trait]
pub trait ContentFetcher: Send + Sync {
    /// Provider id used for registry bookkeeping.
    fn id(&self) -> &str;

    /// Fetch `url`.
    ///
    /// # Errors
    ///
    /// [`ProviderError::Transport`] for connection failures and
    /// non-success statuses, [`ProviderError::Timeout`] when the request
    /// timed out, [`ProviderError::MalformedResponse`] for bodies that are
    /// neither text nor HTML.
    async fn fetch(&self, url: &str) -> Result<FetchedPage, ProviderError>;
}

/// HTTP GET fetcher with redirect following (up to
/// [`http::MAX_REDIRECTS`]), a per-request timeout and a response size cap.
pub struct HttpFetcher {
    id: String,
    client: reqwest::Client,
    max_bytes: usize,
}

impl HttpFetcher {
    /// Builds a fetcher with its own client.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Http`] if the client cannot be constructed.
    pub fn new(
        user_agent: Option<&str>,
        timeout: std::time::Duration,
        max_bytes: usize,
    ) -> Result<Self, SearchError> {
        Ok(Self::with_client(
            http::build_client(user_agent, timeout)?,
            max_bytes,
        ))
    }

    pub fn with_client(client: reqwest::Client, max_bytes: usize) -> Self {
        Self {
            id: "http-fetch".into(),
            client,
            max_bytes,
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }
}

fn is_textual(content_type: &str) -> bool {
    content_type.starts_with("text/")
        || content_type.contains("html")
        || content_type.contains("xml")
        || content_type.contains("json")
}

#[async_trait]
impl ContentFetcher for HttpFetcher {
    fn id(&self) -> &str {
        &self.id
    }

    async fn fetch(&self, url: &str) -> Result<FetchedPage, ProviderError> {
        tracing::trace!(fetcher = %self.id, url, "fetching page");
        let response = self
            .client
            .get(url)
            .header("Accept", "text/html,application/xhtml+xml,text/plain;q=0.9,*/*;q=0.5")
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(&self.id, &e))?;
        let response = http::ensure_success(&self.id, response).await?;

        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| {
                v.split(';')
                    .next()
                    .unwrap_or_default()
                    .trim()
                    .to_ascii_lowercase()
            })
            .filter(|v| !v.is_empty());
        if let Some(ct) = content_type.as_deref() {
            if !is_textual(ct) {
                return Err(ProviderError::MalformedResponse(format!(
                    "{}: unsupported content type {ct}",
                    self.id
                )));
            }
        }

        let (bytes, truncated) = http::read_capped(&self.id, response, self.max_bytes).await?;
        if truncated {
            tracing::debug!(fetcher = %self.id, url, max_bytes = self.max_bytes, "page body truncated");
        }
        Ok(FetchedPage {
            url: final_url,
            content_type,
            body: String::from_utf8_lossy(&bytes).into_owned(),
            truncated,
        })
    }
}
