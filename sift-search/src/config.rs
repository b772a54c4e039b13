//! Configuration for search, extraction and provider health tracking.
//!
//! Each struct deserializes with `#[serde(default)]` so it can be embedded as
//! a section of the application's TOML file, and each has a `validate()`
//! that rejects zero limits and timeouts.

use crate::error::SearchError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Controls the search fan-out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Maximum number of hits kept after deduplication and ranking.
    pub max_results: usize,
    /// Default per-provider timeout in seconds, used when a provider block
    /// does not set its own.
    pub timeout_seconds: u64,
    /// Request safe-search filtering from providers that support it.
    pub safe_search: bool,
    /// Custom User-Agent string. If `None`, rotates through a built-in list
    /// of realistic browser User-Agents.
    pub user_agent: Option<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_results: 10,
            timeout_seconds: 8,
            safe_search: true,
            user_agent: None,
        }
    }
}

impl SearchConfig {
    /// Validates this configuration.
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.max_results == 0 {
            return Err(SearchError::Config(
                "max_results must be greater than 0".into(),
            ));
        }
        if self.timeout_seconds == 0 {
            return Err(SearchError::Config(
                "timeout_seconds must be greater than 0".into(),
            ));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// Controls page fetching and the extraction cascade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Size of the extraction worker pool.
    pub concurrency: usize,
    /// Minimum word count for extracted text to be accepted.
    pub min_words: usize,
    /// Minimum ratio of unique words to total words.
    pub min_diversity: f64,
    /// Budget for a single extraction strategy, in milliseconds.
    pub strategy_timeout_ms: u64,
    /// Budget for fetching and extracting one URL, in seconds.
    pub per_url_budget_secs: u64,
    /// HTTP timeout for a single page fetch, in seconds.
    pub fetch_timeout_secs: u64,
    /// Responses larger than this are cut off.
    pub max_response_bytes: usize,
    /// Extracted text is truncated to this many characters.
    pub max_chars: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            concurrency: 5,
            min_words: 40,
            min_diversity: 0.2,
            strategy_timeout_ms: 2_000,
            per_url_budget_secs: 15,
            fetch_timeout_secs: 10,
            max_response_bytes: 2 * 1024 * 1024,
            max_chars: 20_000,
        }
    }
}

impl ExtractionConfig {
    /// Validates this configuration.
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.concurrency == 0 {
            return Err(SearchError::Config(
                "extraction concurrency must be greater than 0".into(),
            ));
        }
        if self.strategy_timeout_ms == 0 {
            return Err(SearchError::Config(
                "strategy_timeout_ms must be greater than 0".into(),
            ));
        }
        if self.per_url_budget_secs == 0 {
            return Err(SearchError::Config(
                "per_url_budget_secs must be greater than 0".into(),
            ));
        }
        if self.fetch_timeout_secs == 0 {
            return Err(SearchError::Config(
                "fetch_timeout_secs must be greater than 0".into(),
            ));
        }
        if self.max_response_bytes == 0 {
            return Err(SearchError::Config(
                "max_response_bytes must be greater than 0".into(),
            ));
        }
        if self.max_chars == 0 {
            return Err(SearchError::Config(
                "max_chars must be greater than 0".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.min_diversity) {
            return Err(SearchError::Config(
                "min_diversity must be between 0.0 and 1.0".into(),
            ));
        }
        Ok(())
    }

    pub fn strategy_timeout(&self) -> Duration {
        Duration::from_millis(self.strategy_timeout_ms)
    }

    pub fn per_url_budget(&self) -> Duration {
        Duration::from_secs(self.per_url_budget_secs)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

/// Controls how provider outcomes turn into health states.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Number of recent outcomes kept per provider.
    pub window_size: usize,
    /// Consecutive trailing failures that mark a provider degraded.
    pub degraded_after: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            window_size: 5,
            degraded_after: 3,
        }
    }
}

impl RegistryConfig {
    /// Validates this configuration.
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.window_size == 0 {
            return Err(SearchError::Config(
                "window_size must be greater than 0".into(),
            ));
        }
        if self.degraded_after == 0 {
            return Err(SearchError::Config(
                "degraded_after must be greater than 0".into(),
            ));
        }
        if self.degraded_after > self.window_size {
            return Err(SearchError::Config(
                "degraded_after must be <= window_size".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(SearchConfig::default().validate().is_ok());
        assert!(ExtractionConfig::default().validate().is_ok());
        assert!(RegistryConfig::default().validate().is_ok());
    }

    #[test]
    fn default_extraction_values() {
        let config = ExtractionConfig::default();
        assert_eq!(config.concurrency, 5);
        assert_eq!(config.min_words, 40);
        assert!((config.min_diversity - 0.2).abs() < f64::EPSILON);
        assert_eq!(config.strategy_timeout(), Duration::from_secs(2));
    }

    #[test]
    fn zero_max_results_rejected() {
        let config = SearchConfig {
            max_results: 0,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_results"));
    }

    #[test]
    fn zero_timeout_rejected() {
        let config = SearchConfig {
            timeout_seconds: 0,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("timeout_seconds"));
    }

    #[test]
    fn zero_concurrency_rejected() {
        let config = ExtractionConfig {
            concurrency: 0,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("concurrency"));
    }

    #[test]
    fn diversity_out_of_range_rejected() {
        let config = ExtractionConfig {
            min_diversity: 1.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn degraded_after_larger_than_window_rejected() {
        let config = RegistryConfig {
            window_size: 2,
            degraded_after: 3,
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("degraded_after"));
    }

    #[test]
    fn partial_section_fills_defaults() {
        let config: ExtractionConfig =
            serde_json::from_str(r#"{"min_words": 10}"#).expect("deserialize");
        assert_eq!(config.min_words, 10);
        assert_eq!(config.concurrency, 5);
    }
}
