//! Search aggregator: concurrent multi-provider fan-out, dedup, score, rank.
//!
//! Queries every search provider the registry offers concurrently, each
//! under its own timeout. Failures stay local: they are logged, reported to
//! the registry and contribute zero hits. Successful responses are scored,
//! deduplicated by normalised URL, sorted and truncated.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::time::Instant;

use crate::engine::SearchProvider;
use crate::error::ProviderError;
use crate::registry::{Outcome, ProviderRegistry};
use crate::types::{ProviderCategory, ProviderDescriptor, RawHit, SearchHit};

use super::dedup::{deduplicate, Candidate};
use super::scoring::{hit_score, QueryTerms};

type CallResult = Result<(Vec<RawHit>, DateTime<Utc>), ProviderError>;

/// Fans a query out to every enabled search provider.
pub struct SearchAggregator {
    registry: Arc<ProviderRegistry>,
    providers: HashMap<String, Arc<dyn SearchProvider>>,
}

impl SearchAggregator {
    pub fn new(registry: Arc<ProviderRegistry>) -> Self {
        Self {
            registry,
            providers: HashMap::new(),
        }
    }

    /// Adds a provider adapter. It is only queried when the registry holds
    /// a search descriptor with the same id.
    #[must_use]
    pub fn with_provider(mut self, provider: Arc<dyn SearchProvider>) -> Self {
        self.register(provider);
        self
    }

    pub fn register(&mut self, provider: Arc<dyn SearchProvider>) {
        let id = provider.id().to_string();
        if self.registry.descriptor(&id).is_none() {
            tracing::warn!(provider = %id, "search provider has no registry descriptor and will not be queried");
        }
        self.providers.insert(id, provider);
    }

    pub fn registry(&self) -> &Arc<ProviderRegistry> {
        &self.registry
    }

    /// Number of providers a search would currently query.
    pub fn provider_count(&self) -> usize {
        self.selected().len()
    }

    /// Search with no overall deadline.
    pub async fn search(&self, query: &str, max_results: usize) -> Vec<SearchHit> {
        self.search_until(query, max_results, None).await
    }

    /// Search, capping every provider call at `deadline`.
    ///
    /// Never fails: with every provider failing (or none configured) the
    /// result is empty. Each attempted provider gets exactly one registry
    /// update; providers skipped because the deadline already passed get
    /// none.
    pub async fn search_until(
        &self,
        query: &str,
        max_results: usize,
        deadline: Option<Instant>,
    ) -> Vec<SearchHit> {
        let selected = self.selected();
        if selected.is_empty() {
            tracing::warn!("no search providers available");
            return Vec::new();
        }
        tracing::debug!(query, providers = selected.len(), "fanning out search");

        let calls = selected.iter().map(|(descriptor, provider)| async move {
            let result =
                call_provider(descriptor, provider.as_ref(), query, max_results, deadline).await;
            (descriptor, result)
        });
        let outcomes = futures::future::join_all(calls).await;

        let terms = QueryTerms::new(query);
        let mut candidates = Vec::new();
        let mut failures = 0usize;
        for (descriptor, outcome) in outcomes {
            let Some(result) = outcome else {
                continue;
            };
            self.registry.record(&descriptor.id, Outcome::of(&result));
            match result {
                Ok((raw_hits, fetched_at)) => {
                    tracing::debug!(provider = %descriptor.id, count = raw_hits.len(), "provider returned hits");
                    candidates.extend(
                        raw_hits
                            .into_iter()
                            .filter(|raw| !raw.url.trim().is_empty())
                            .take(max_results)
                            .enumerate()
                            .map(|(position, raw)| {
                                let hit = SearchHit {
                                    score: hit_score(&terms, &raw, position),
                                    url: raw.url,
                                    title: raw.title,
                                    snippet: raw.snippet,
                                    provider: descriptor.id.clone(),
                                    fetched_at,
                                };
                                Candidate::new(hit, descriptor.priority, position)
                            }),
                    );
                }
                Err(err) => {
                    failures += 1;
                    tracing::warn!(
                        provider = %descriptor.id,
                        code = err.code(),
                        error = %err,
                        "search provider failed"
                    );
                }
            }
        }

        if candidates.is_empty() && failures == selected.len() {
            tracing::warn!(failures, "all search providers failed");
        }

        let mut merged = deduplicate(candidates);
        merged.sort_by(|a, b| {
            b.hit
                .score
                .total_cmp(&a.hit.score)
                .then(a.priority.cmp(&b.priority))
                .then_with(|| a.key.cmp(&b.key))
        });
        merged.truncate(max_results);
        merged.into_iter().map(|c| c.hit).collect()
    }

    fn selected(&self) -> Vec<(ProviderDescriptor, Arc<dyn SearchProvider>)> {
        self.registry
            .enabled_providers(ProviderCategory::Search)
            .into_iter()
            .filter_map(|descriptor| match self.providers.get(&descriptor.id) {
                Some(provider) => Some((descriptor, Arc::clone(provider))),
                None => {
                    tracing::debug!(provider = %descriptor.id, "no adapter for search provider");
                    None
                }
            })
            .collect()
    }
}

/// One bounded provider call. `None` when the deadline left no time to try.
async fn call_provider(
    descriptor: &ProviderDescriptor,
    provider: &dyn SearchProvider,
    query: &str,
    limit: usize,
    deadline: Option<Instant>,
) -> Option<CallResult> {
    let mut budget = descriptor.timeout;
    if let Some(deadline) = deadline {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            tracing::debug!(provider = %descriptor.id, "deadline passed, provider skipped");
            return None;
        }
        budget = budget.min(remaining);
    }

    let result = match tokio::time::timeout(budget, provider.query(query, limit)).await {
        Ok(Ok(hits)) => Ok((hits, Utc::now())),
        Ok(Err(err)) => Err(err),
        Err(_) => Err(ProviderError::Timeout(format!(
            "{}: no response within {}ms",
            descriptor.id,
            budget.as_millis()
        ))),
    };
    Some(result)
}
