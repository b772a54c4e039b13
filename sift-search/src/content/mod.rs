//! Content extraction: fetch a hit's page and turn it into readable text.
//!
//! Each URL goes through a fixed cascade until one strategy's output passes
//! the quality gate:
//!
//! 1. structured-article extraction (main-content block detection),
//! 2. generic markup stripping,
//! 3. the hit's own snippet (marked `success = false`).
//!
//! Strategies run on the blocking pool under `strategy_timeout`; the whole
//! per-URL attempt is bounded by `per_url_budget`. Fetch outcomes are
//! reported to the registry under the fetcher's id, and a disabled fetcher
//! means every hit goes straight to the snippet fallback.

pub mod clean;
pub mod fetch;
pub mod strategy;

pub use fetch::{ContentFetcher, FetchedPage, HttpFetcher};

use std::sync::Arc;

use futures::StreamExt;
use tokio::time::Instant;

use crate::config::ExtractionConfig;
use crate::error::ProviderError;
use crate::registry::{Outcome, ProviderRegistry};
use crate::types::{ExtractedDocument, ExtractionStrategy, HealthState, SearchHit};

use clean::{truncate_chars, word_count};
use strategy::{quality_score, Extracted, QualityGate};

/// Signature of a synchronous extraction strategy: `(body, is_html)`.
pub type StrategyFn = fn(&str, bool) -> Option<Extracted>;

fn article_strategy(body: &str, is_html: bool) -> Option<Extracted> {
    strategy::run(ExtractionStrategy::Article, body, is_html)
}

fn markup_strategy(body: &str, is_html: bool) -> Option<Extracted> {
    strategy::run(ExtractionStrategy::MarkupStrip, body, is_html)
}

/// Fetches pages and runs the extraction cascade with a bounded worker pool.
pub struct ContentExtractor {
    fetcher: Arc<dyn ContentFetcher>,
    registry: Arc<ProviderRegistry>,
    config: ExtractionConfig,
    strategies: Vec<(ExtractionStrategy, StrategyFn)>,
}

impl ContentExtractor {
    pub fn new(
        fetcher: Arc<dyn ContentFetcher>,
        registry: Arc<ProviderRegistry>,
        config: ExtractionConfig,
    ) -> Self {
        Self {
            fetcher,
            registry,
            config,
            strategies: vec![
                (ExtractionStrategy::Article, article_strategy as StrategyFn),
                (ExtractionStrategy::MarkupStrip, markup_strategy as StrategyFn),
            ],
        }
    }

    /// Replace the cascade's page strategies (the snippet fallback always
    /// stays last).
    #[must_use]
    pub fn with_strategies(mut self, strategies: Vec<(ExtractionStrategy, StrategyFn)>) -> Self {
        self.strategies = strategies;
        self
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    fn fetch_enabled(&self) -> bool {
        self.registry.status(self.fetcher.id()) != HealthState::Disabled
    }

    /// Extract one hit. Never fails: anything short of a document passing
    /// the quality gate yields the snippet fallback.
    pub async fn extract(&self, hit: &SearchHit) -> ExtractedDocument {
        if !self.fetch_enabled() {
            return ExtractedDocument::snippet_fallback(hit);
        }
        match tokio::time::timeout(self.config.per_url_budget(), self.cascade(hit)).await {
            Ok(Ok(doc)) => doc,
            Ok(Err(err)) => {
                tracing::debug!(url = %hit.url, code = err.code(), error = %err, "extraction fell back to snippet");
                ExtractedDocument::snippet_fallback(hit)
            }
            Err(_) => {
                tracing::debug!(url = %hit.url, "per-URL extraction budget exhausted");
                ExtractedDocument::snippet_fallback(hit)
            }
        }
    }

    async fn cascade(&self, hit: &SearchHit) -> Result<ExtractedDocument, ProviderError> {
        let page = self.fetcher.fetch(&hit.url).await;
        self.registry.record(self.fetcher.id(), Outcome::of(&page));
        let page = page?;

        let is_html = page.is_html();
        let body: Arc<str> = Arc::from(page.body);
        let gate = QualityGate {
            min_words: self.config.min_words,
            min_diversity: self.config.min_diversity,
        };
        let mut last_err = None;

        for &(strategy, run) in &self.strategies {
            let input = Arc::clone(&body);
            let task = tokio::task::spawn_blocking(move || run(&input, is_html));
            let extracted = match tokio::time::timeout(self.config.strategy_timeout(), task).await
            {
                Ok(Ok(Some(extracted))) => extracted,
                Ok(Ok(None)) => continue,
                Ok(Err(join_err)) => {
                    tracing::warn!(url = %hit.url, %strategy, error = %join_err, "extraction strategy panicked");
                    continue;
                }
                Err(_) => {
                    tracing::debug!(url = %hit.url, %strategy, "extraction strategy timed out");
                    last_err = Some(ProviderError::Timeout(format!(
                        "{strategy} strategy exceeded {}ms",
                        self.config.strategy_timeout_ms
                    )));
                    continue;
                }
            };

            let text = truncate_chars(&extracted.text, self.config.max_chars);
            if let Err(err) = gate.check(&text) {
                tracing::debug!(url = %hit.url, %strategy, error = %err, "extraction below quality threshold");
                last_err = Some(err);
                continue;
            }

            let title = if extracted.title.is_empty() {
                hit.title.clone()
            } else {
                extracted.title
            };
            let quality = quality_score(&text, &title, strategy);
            tracing::debug!(url = %hit.url, %strategy, quality, "content extracted");
            return Ok(ExtractedDocument {
                url: hit.url.clone(),
                word_count: word_count(&text),
                title,
                text,
                strategy,
                quality,
                success: true,
            });
        }

        Err(last_err.unwrap_or_else(|| {
            ProviderError::BelowQualityThreshold("no strategy produced text".into())
        }))
    }

    /// Extract many hits with at most `concurrency` in flight. The output
    /// has one slot per hit, in hit order; slots still pending when
    /// `deadline` passes stay `None`.
    pub async fn extract_all(
        &self,
        hits: &[SearchHit],
        deadline: Option<Instant>,
    ) -> Vec<Option<ExtractedDocument>> {
        let mut slots: Vec<Option<ExtractedDocument>> = vec![None; hits.len()];
        let mut stream = futures::stream::iter(hits.iter().enumerate())
            .map(|(index, hit)| async move { (index, self.extract(hit).await) })
            .buffer_unordered(self.config.concurrency.max(1));

        let collect = async {
            while let Some((index, doc)) = stream.next().await {
                slots[index] = Some(doc);
            }
        };
        match deadline {
            Some(deadline) => {
                if tokio::time::timeout_at(deadline, collect).await.is_err() {
                    tracing::warn!("extraction deadline reached, remaining hits use snippets");
                }
            }
            None => collect.await,
        }

        let completed = slots.iter().filter(|s| s.is_some()).count();
        tracing::debug!(total = hits.len(), completed, "extraction finished");
        slots
    }
}
