//! Error types for the sift pipeline.

/// Top-level error type.
///
/// Provider and per-URL failures never surface here: they are recorded in
/// the provider registry and absorbed by the fallback paths. Only setup and
/// configuration problems reach the caller.
#[derive(Debug, thiserror::Error)]
pub enum SiftError {
    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// HTTP client construction error.
    #[error("HTTP client error: {0}")]
    Http(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<sift_search::SearchError> for SiftError {
    fn from(err: sift_search::SearchError) -> Self {
        match err {
            sift_search::SearchError::Config(msg) => Self::Config(msg),
            sift_search::SearchError::Http(msg) => Self::Http(msg),
        }
    }
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, SiftError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_errors_map_to_matching_variants() {
        let err: SiftError = sift_search::SearchError::Config("max_results must be > 0".into()).into();
        assert!(matches!(err, SiftError::Config(_)));
        assert_eq!(err.to_string(), "config error: max_results must be > 0");

        let err: SiftError = sift_search::SearchError::Http("tls".into()).into();
        assert!(matches!(err, SiftError::Http(_)));
    }
}
