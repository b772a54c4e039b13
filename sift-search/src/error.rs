//! Error types for the sift-search crate.
//!
//! [`ProviderError`] is the shared taxonomy for every external call (search,
//! AI summarization, content fetch). Each variant carries a stable code so
//! logs and tests can match on it without parsing messages. No API keys or
//! request bodies appear in error messages.

/// Stable error codes for [`ProviderError`] variants.
pub mod error_codes {
    /// The provider did not answer within its timeout.
    pub const PROVIDER_TIMEOUT: &str = "PROVIDER_TIMEOUT";
    /// Connection failure or non-success HTTP status.
    pub const PROVIDER_TRANSPORT: &str = "PROVIDER_TRANSPORT";
    /// The provider answered, but the body could not be understood.
    pub const PROVIDER_MALFORMED_RESPONSE: &str = "PROVIDER_MALFORMED_RESPONSE";
    /// Extracted content was too thin or too noisy to use.
    pub const EXTRACTION_BELOW_QUALITY_THRESHOLD: &str = "EXTRACTION_BELOW_QUALITY_THRESHOLD";
    /// Every provider in a chain failed.
    pub const ALL_PROVIDERS_EXHAUSTED: &str = "ALL_PROVIDERS_EXHAUSTED";
}

/// Failure of a single external provider call.
///
/// These never cross a component boundary: the component that issued the
/// call logs the error, reports it to the registry and degrades.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    /// The call exceeded its timeout.
    #[error("[{}] {}", error_codes::PROVIDER_TIMEOUT, .0)]
    Timeout(String),

    /// Connection error or non-success HTTP status.
    #[error("[{}] {}", error_codes::PROVIDER_TRANSPORT, .0)]
    Transport(String),

    /// The response body was empty, garbled or missing required fields.
    #[error("[{}] {}", error_codes::PROVIDER_MALFORMED_RESPONSE, .0)]
    MalformedResponse(String),

    /// Extraction produced text below the quality threshold.
    #[error("[{}] {}", error_codes::EXTRACTION_BELOW_QUALITY_THRESHOLD, .0)]
    BelowQualityThreshold(String),

    /// Internal signal that a provider chain has nothing left to try.
    #[error("[{}] {}", error_codes::ALL_PROVIDERS_EXHAUSTED, .0)]
    AllProvidersExhausted(String),
}

impl ProviderError {
    /// Stable code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Timeout(_) => error_codes::PROVIDER_TIMEOUT,
            Self::Transport(_) => error_codes::PROVIDER_TRANSPORT,
            Self::MalformedResponse(_) => error_codes::PROVIDER_MALFORMED_RESPONSE,
            Self::BelowQualityThreshold(_) => error_codes::EXTRACTION_BELOW_QUALITY_THRESHOLD,
            Self::AllProvidersExhausted(_) => error_codes::ALL_PROVIDERS_EXHAUSTED,
        }
    }

    /// The message without the code prefix.
    pub fn message(&self) -> &str {
        match self {
            Self::Timeout(m)
            | Self::Transport(m)
            | Self::MalformedResponse(m)
            | Self::BelowQualityThreshold(m)
            | Self::AllProvidersExhausted(m) => m,
        }
    }

    /// Classify a [`reqwest::Error`] raised while talking to `provider`.
    pub fn from_reqwest(provider: &str, err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(format!("{provider}: request timed out"))
        } else if err.is_decode() {
            Self::MalformedResponse(format!("{provider}: could not decode body: {err}"))
        } else if let Some(status) = err.status() {
            Self::Transport(format!("{provider}: HTTP {}", status.as_u16()))
        } else {
            Self::Transport(format!("{provider}: {err}"))
        }
    }
}

/// Errors surfaced to callers of this crate. Only configuration and client
/// construction can fail; provider failures are absorbed as [`ProviderError`].
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// Invalid configuration.
    #[error("config error: {0}")]
    Config(String),

    /// The HTTP client could not be constructed.
    #[error("HTTP error: {0}")]
    Http(String),
}

/// Convenience type alias for sift-search results.
pub type Result<T> = std::result::Result<T, SearchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_code_prefix() {
        let err = ProviderError::Timeout("tavily: exceeded 8s".into());
        assert_eq!(err.to_string(), "[PROVIDER_TIMEOUT] tavily: exceeded 8s");
    }

    #[test]
    fn codes_are_stable() {
        let cases = [
            (ProviderError::Timeout(String::new()), "PROVIDER_TIMEOUT"),
            (ProviderError::Transport(String::new()), "PROVIDER_TRANSPORT"),
            (
                ProviderError::MalformedResponse(String::new()),
                "PROVIDER_MALFORMED_RESPONSE",
            ),
            (
                ProviderError::BelowQualityThreshold(String::new()),
                "EXTRACTION_BELOW_QUALITY_THRESHOLD",
            ),
            (
                ProviderError::AllProvidersExhausted(String::new()),
                "ALL_PROVIDERS_EXHAUSTED",
            ),
        ];
        for (err, code) in cases {
            assert_eq!(err.code(), code);
        }
    }

    #[test]
    fn message_strips_code() {
        let err = ProviderError::Transport("exa: HTTP 503".into());
        assert_eq!(err.message(), "exa: HTTP 503");
    }

    #[test]
    fn display_config() {
        let err = SearchError::Config("max_results must be > 0".into());
        assert_eq!(err.to_string(), "config error: max_results must be > 0");
    }

    #[test]
    fn errors_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SearchError>();
        assert_send_sync::<ProviderError>();
    }
}
