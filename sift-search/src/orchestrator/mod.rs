//! Search aggregation: concurrent provider queries, dedup, scoring, ranking.
//!
//! [`search::SearchAggregator`] fans a query out to every enabled search
//! provider, scores hits (provider-reported, or position blended with
//! query-term overlap),
//! deduplicates them by normalised URL and returns a sorted, truncated
//! result set.

pub mod dedup;
pub mod scoring;
pub mod search;
pub mod url_normalize;

pub use search::SearchAggregator;
