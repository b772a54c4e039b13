//! Capability trait for pluggable search providers.
//!
//! Every backend (Tavily, Exa, SerpAPI, Brave, DuckDuckGo) implements
//! [`SearchProvider`] so the aggregator can fan out over trait objects
//! chosen from the registry's ordered list.

use crate::error::ProviderError;
use crate::types::RawHit;
use async_trait::async_trait;

/// A search backend.
///
/// Implementors handle their own URL construction, authentication and
/// response parsing. Timeouts are applied by the caller, so an
/// implementation only needs to map its own failures onto
/// [`ProviderError`].
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Provider id, matching its [`ProviderDescriptor`](crate::types::ProviderDescriptor).
    fn id(&self) -> &str;

    /// Run `text` as a search and return at most `limit` hits in the
    /// provider's own rank order.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Transport`] for connection failures and
    /// non-success statuses, and [`ProviderError::MalformedResponse`] when
    /// the body cannot be parsed.
    async fn query(&self, text: &str, limit: usize) -> Result<Vec<RawHit>, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    /// A mock provider for testing trait object dispatch.
    struct MockProvider {
        hits: Vec<RawHit>,
    }

    #[async_trait]
    impl SearchProvider for MockProvider {
        fn id(&self) -> &str {
            "mock"
        }

        async fn query(&self, _text: &str, limit: usize) -> Result<Vec<RawHit>, ProviderError> {
            if self.hits.is_empty() {
                return Err(ProviderError::MalformedResponse("mock failure".into()));
            }
            Ok(self.hits.iter().take(limit).cloned().collect())
        }
    }

    fn raw(url: &str) -> RawHit {
        RawHit {
            url: url.into(),
            title: "Test".into(),
            snippet: "A test result".into(),
            score: None,
        }
    }

    #[test]
    fn provider_is_object_safe() {
        fn assert_send_sync<T: Send + Sync + ?Sized>() {}
        assert_send_sync::<dyn SearchProvider>();
    }

    #[tokio::test]
    async fn trait_object_respects_limit() {
        let provider: Arc<dyn SearchProvider> = Arc::new(MockProvider {
            hits: vec![raw("https://a.com"), raw("https://b.com"), raw("https://c.com")],
        });
        let hits = provider.query("test", 2).await.expect("should succeed");
        assert_eq!(hits.len(), 2);
        assert_eq!(provider.id(), "mock");
    }

    #[tokio::test]
    async fn errors_propagate() {
        let provider = MockProvider { hits: vec![] };
        let err = provider.query("test", 5).await.unwrap_err();
        assert_eq!(err.code(), "PROVIDER_MALFORMED_RESPONSE");
    }
}
