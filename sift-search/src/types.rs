//! Core types shared by the registry, the search aggregator and the content
//! extractor.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// What a provider is used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProviderCategory {
    /// Web search backend returning ranked hits.
    Search,
    /// Model that turns a corpus into a structured summary.
    AiSummarize,
    /// Page fetcher used by the content extractor.
    ContentFetch,
}

impl ProviderCategory {
    /// Returns the kebab-case name used in logs and config.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Search => "search",
            Self::AiSummarize => "ai-summarize",
            Self::ContentFetch => "content-fetch",
        }
    }
}

impl fmt::Display for ProviderCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Runtime reliability classification of a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HealthState {
    /// No outcome recorded yet in this run.
    Unknown,
    /// Last outcome was a success.
    Healthy,
    /// Failed repeatedly; still tried, but after every non-degraded provider.
    Degraded,
    /// Switched off by configuration or an explicit `disable` call.
    Disabled,
}

impl HealthState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Healthy => "healthy",
            Self::Degraded => "degraded",
            Self::Disabled => "disabled",
        }
    }
}

impl fmt::Display for HealthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Static description of a configured provider.
///
/// Owned by the [`ProviderRegistry`](crate::registry::ProviderRegistry); the
/// live health state is kept separately in the registry's slots.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderDescriptor {
    /// Unique provider id, e.g. `"tavily"` or `"openai"`.
    pub id: String,
    pub category: ProviderCategory,
    /// Lower values are tried first.
    pub priority: u32,
    /// Upper bound for a single call to this provider.
    pub timeout: Duration,
    /// Input-size limit in characters. Only meaningful for AI providers.
    pub max_input_chars: Option<usize>,
    /// Config-time switch. A descriptor with `enabled = false` starts disabled.
    pub enabled: bool,
}

impl ProviderDescriptor {
    /// Creates an enabled descriptor with priority 100 and an 8 second timeout.
    pub fn new(id: impl Into<String>, category: ProviderCategory) -> Self {
        Self {
            id: id.into(),
            category,
            priority: 100,
            timeout: Duration::from_secs(8),
            max_input_chars: None,
            enabled: true,
        }
    }

    #[must_use]
    pub fn with_priority(mut self, priority: u32) -> Self {
        self.priority = priority;
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_max_input_chars(mut self, max_input_chars: usize) -> Self {
        self.max_input_chars = Some(max_input_chars);
        self
    }

    #[must_use]
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

/// A hit as reported by one provider, before merging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawHit {
    pub url: String,
    pub title: String,
    pub snippet: String,
    /// Provider-reported relevance, if the provider reports one.
    pub score: Option<f64>,
}

/// A merged, deduplicated and ranked search hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    /// The URL as returned by the provider. Unique within one result set.
    pub url: String,
    pub title: String,
    pub snippet: String,
    /// Id of the provider this hit came from.
    pub provider: String,
    /// Relevance score (higher is better), provider-reported or computed.
    pub score: f64,
    /// When the provider response carrying this hit arrived.
    pub fetched_at: DateTime<Utc>,
}

/// Which extraction strategy produced a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExtractionStrategy {
    /// Readability-style main-content block detection.
    Article,
    /// Boilerplate tag removal over the whole page.
    MarkupStrip,
    /// The originating hit's snippet.
    SnippetFallback,
}

impl ExtractionStrategy {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Article => "article",
            Self::MarkupStrip => "markup-strip",
            Self::SnippetFallback => "snippet-fallback",
        }
    }
}

impl fmt::Display for ExtractionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Readable text extracted for one hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedDocument {
    pub url: String,
    /// Page title, empty when none could be found.
    pub title: String,
    pub text: String,
    pub strategy: ExtractionStrategy,
    pub word_count: usize,
    /// Content quality in `0.0..=1.0` (length band, title, lexical diversity).
    pub quality: f64,
    /// `false` when the text is the snippet fallback.
    pub success: bool,
}

impl ExtractedDocument {
    /// Builds the snippet fallback document for `hit`.
    pub fn snippet_fallback(hit: &SearchHit) -> Self {
        Self {
            url: hit.url.clone(),
            title: hit.title.clone(),
            text: hit.snippet.clone(),
            strategy: ExtractionStrategy::SnippetFallback,
            word_count: hit.snippet.split_whitespace().count(),
            quality: 0.0,
            success: false,
        }
    }
}
