//! Sift: resilient multi-source research aggregation.
//!
//! A query goes through three stages that each survive the failure of any
//! external dependency:
//! query → Search → Extract → Summarize → [`SummaryReport`]
//!
//! # Architecture
//!
//! - **Search**: concurrent fan-out over every configured search provider,
//!   merged and deduplicated by [`sift_search::SearchAggregator`]
//! - **Extract**: bounded worker pool running the extraction cascade over
//!   the top hits ([`sift_search::ContentExtractor`])
//! - **Summarize**: ordered AI provider chain with a deterministic
//!   heuristic fallback ([`summarize::SummarizationEngine`])
//!
//! All three share one [`sift_search::ProviderRegistry`] that tracks
//! provider health for the current run.

pub mod config;
pub mod corpus;
pub mod error;
pub mod pipeline;
pub mod report;
pub mod summarize;

pub use config::SiftConfig;
pub use corpus::CorpusEntry;
pub use error::{Result, SiftError};
pub use pipeline::{PipelineSettings, ResearchPipeline};
pub use report::{Attribution, Narrative, ReportStats, Source, SummaryReport};
pub use summarize::{SummarizationEngine, SummarizeProvider};
