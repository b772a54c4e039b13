//! AI summarization capability.

use async_trait::async_trait;
use sift_search::ProviderError;

/// An AI backend that turns a prompt and corpus text into a structured
/// markdown summary.
///
/// Implementations perform one request and report failures as
/// [`ProviderError`]; retries and fallback belong to the
/// [`SummarizationEngine`](super::SummarizationEngine).
#[async_trait]
pub trait SummarizeProvider: Send + Sync {
    /// Provider id, matching its registry descriptor.
    fn id(&self) -> &str;

    /// Send `prompt` (instructions) and `corpus_text` (numbered sources).
    ///
    /// # Errors
    ///
    /// [`ProviderError::Transport`] for connection failures and non-success
    /// statuses, [`ProviderError::Timeout`] when the request timed out,
    /// [`ProviderError::MalformedResponse`] when no text could be read from
    /// the response.
    async fn summarize(&self, prompt: &str, corpus_text: &str) -> Result<String, ProviderError>;
}
