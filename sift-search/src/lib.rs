//! # sift-search
//!
//! Provider health tracking, concurrent multi-provider web search and
//! cascading content extraction for the sift research pipeline.
//!
//! ## Design
//!
//! - [`ProviderRegistry`] holds every configured backend (search, AI,
//!   content fetch) with a per-provider sliding window of outcomes
//! - [`SearchAggregator`] queries all enabled search providers
//!   concurrently, each under its own timeout, then merges, deduplicates
//!   by normalised URL and ranks the hits
//! - [`ContentExtractor`] fetches hit pages with a bounded worker pool and
//!   runs article extraction, markup stripping and snippet fallback in turn
//! - Graceful degradation: a failing provider costs its own hits, never the
//!   whole search
//!
//! ## Security
//!
//! - API keys are only sent to their own provider and never logged
//! - Search queries are logged only at trace/debug level
//! - Response bodies are size-capped before parsing

pub mod config;
pub mod content;
pub mod engine;
pub mod engines;
pub mod error;
pub mod http;
pub mod orchestrator;
pub mod registry;
pub mod types;

pub use config::{ExtractionConfig, RegistryConfig, SearchConfig};
pub use content::{ContentExtractor, ContentFetcher, FetchedPage, HttpFetcher};
pub use engine::SearchProvider;
pub use error::{ProviderError, Result, SearchError};
pub use orchestrator::SearchAggregator;
pub use registry::{Outcome, ProviderHealth, ProviderRegistry};
pub use types::{
    ExtractedDocument, ExtractionStrategy, HealthState, ProviderCategory, ProviderDescriptor,
    RawHit, SearchHit,
};
