//! Summarization engine: ordered AI provider chain with a deterministic
//! heuristic fallback.
//!
//! # Design
//!
//! The engine walks the AI providers the registry offers, in registry
//! order, one at a time:
//!
//! ```text
//! TryProvider(0) ─fail─► TryProvider(1) ─fail─► … ─► HeuristicFallback
//!       │                      │                           │
//!       └──────success─────────┴─────────► Done ◄──────────┘
//! ```
//!
//! Every attempt is reported to the registry, except providers whose
//! input limit cannot hold even the top corpus entry: those are skipped
//! without penalty. The run deadline caps each call and, once passed,
//! sends the chain straight to the heuristic path.
//!
//! Keywords and follow-up questions never depend on which path produced
//! the narrative; AI-suggested questions are placed first when present.

pub mod heuristic;
pub mod keywords;
pub mod prompt;
pub mod provider;
pub mod providers;
pub mod questions;
pub mod response;
pub mod text;

pub use provider::SummarizeProvider;

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use sift_search::{
    Outcome, ProviderCategory, ProviderDescriptor, ProviderError, ProviderRegistry,
};
use tokio::time::Instant;

use crate::config::SummaryConfig;
use crate::corpus::{CorpusEntry, word_total};
use crate::report::{Attribution, Narrative, ReportStats, Source, SummaryReport};

use heuristic::heuristic_narrative;
use keywords::extract_keywords;
use prompt::{build_prompt, render_corpus};
use questions::{generate_questions, merge_questions};
use response::{ParsedResponse, parse_response};

/// Notice added when configured AI providers all failed.
pub const AI_UNAVAILABLE_NOTICE: &str = "AI summarization unavailable; used heuristic fallback";

enum ChainState {
    TryProvider(usize),
    HeuristicFallback,
    Done { provider: String, parsed: ParsedResponse },
}

enum Attempt {
    Succeeded(ParsedResponse),
    Failed,
    Skipped,
    DeadlinePassed,
}

/// Turns a corpus into a [`SummaryReport`].
pub struct SummarizationEngine {
    registry: Arc<ProviderRegistry>,
    providers: HashMap<String, Arc<dyn SummarizeProvider>>,
    config: SummaryConfig,
}

impl SummarizationEngine {
    pub fn new(registry: Arc<ProviderRegistry>, config: SummaryConfig) -> Self {
        Self {
            registry,
            providers: HashMap::new(),
            config,
        }
    }

    /// Adds an AI provider adapter. It is only tried when the registry
    /// holds an AI descriptor with the same id.
    #[must_use]
    pub fn with_provider(mut self, provider: Arc<dyn SummarizeProvider>) -> Self {
        self.register(provider);
        self
    }

    pub fn register(&mut self, provider: Arc<dyn SummarizeProvider>) {
        let id = provider.id().to_string();
        if self.registry.descriptor(&id).is_none() {
            tracing::warn!(provider = %id, "AI provider has no registry descriptor and will not be tried");
        }
        self.providers.insert(id, provider);
    }

    pub fn config(&self) -> &SummaryConfig {
        &self.config
    }

    /// Number of AI providers the chain would currently try.
    pub fn provider_count(&self) -> usize {
        self.chain().len()
    }

    fn chain(&self) -> Vec<(ProviderDescriptor, Arc<dyn SummarizeProvider>)> {
        self.registry
            .enabled_providers(ProviderCategory::AiSummarize)
            .into_iter()
            .filter_map(|d| {
                let provider = Arc::clone(self.providers.get(&d.id)?);
                Some((d, provider))
            })
            .collect()
    }

    /// Summarize with no deadline.
    pub async fn summarize(&self, query: &str, corpus: &[CorpusEntry]) -> SummaryReport {
        self.summarize_until(query, corpus, None).await
    }

    /// Summarize `corpus`, giving up on AI providers at `deadline`.
    ///
    /// Never fails. The narrative always has four non-empty sections and
    /// the attribution names whoever wrote it.
    pub async fn summarize_until(
        &self,
        query: &str,
        corpus: &[CorpusEntry],
        deadline: Option<Instant>,
    ) -> SummaryReport {
        let chain = self.chain();
        let mut notices = Vec::new();

        let ai = if corpus.is_empty() {
            tracing::debug!("empty corpus, skipping AI providers");
            None
        } else {
            self.run_chain(query, corpus, &chain, deadline).await
        };
        if ai.is_none() && !chain.is_empty() && !corpus.is_empty() {
            notices.push(AI_UNAVAILABLE_NOTICE.to_string());
        }

        let heuristic = heuristic_narrative(query, corpus);
        let (narrative, attribution, suggested) = match ai {
            Some((provider, parsed)) => {
                let suggested = parsed.questions.clone();
                (
                    fill_narrative(parsed, heuristic),
                    Attribution::Provider(provider),
                    suggested,
                )
            }
            None => (heuristic, Attribution::HeuristicFallback, Vec::new()),
        };

        let keywords = extract_keywords(
            query,
            corpus.iter().map(CorpusEntry::text),
            self.config.keyword_target,
            self.config.keyword_floor,
        );
        let generated = generate_questions(query, &keywords, self.config.max_questions);
        let follow_up_questions = merge_questions(suggested, generated, self.config.max_questions);

        tracing::info!(
            attribution = %attribution,
            sources = corpus.len(),
            keywords = keywords.len(),
            "summary ready"
        );

        SummaryReport {
            query: query.to_string(),
            narrative,
            keywords,
            follow_up_questions,
            attribution,
            sources: Source::from_corpus(corpus),
            stats: ReportStats {
                sources_found: corpus.len(),
                documents_extracted: corpus.iter().filter(|e| e.is_extracted()).count(),
                words_analyzed: word_total(corpus),
            },
            notices,
            generated_at: Utc::now(),
        }
    }

    async fn run_chain(
        &self,
        query: &str,
        corpus: &[CorpusEntry],
        chain: &[(ProviderDescriptor, Arc<dyn SummarizeProvider>)],
        deadline: Option<Instant>,
    ) -> Option<(String, ParsedResponse)> {
        let prompt = build_prompt(query);
        let mut state = ChainState::TryProvider(0);
        loop {
            state = match state {
                ChainState::TryProvider(i) => match chain.get(i) {
                    None => ChainState::HeuristicFallback,
                    Some((descriptor, provider)) => {
                        match self
                            .attempt(descriptor, provider.as_ref(), &prompt, corpus, deadline)
                            .await
                        {
                            Attempt::Succeeded(parsed) => ChainState::Done {
                                provider: descriptor.id.clone(),
                                parsed,
                            },
                            Attempt::Failed | Attempt::Skipped => ChainState::TryProvider(i + 1),
                            Attempt::DeadlinePassed => ChainState::HeuristicFallback,
                        }
                    }
                },
                ChainState::HeuristicFallback => {
                    if !chain.is_empty() {
                        let exhausted = ProviderError::AllProvidersExhausted(format!(
                            "{} AI providers configured, none produced a summary",
                            chain.len()
                        ));
                        tracing::warn!(code = exhausted.code(), error = %exhausted, "falling back to heuristic summary");
                    }
                    return None;
                }
                ChainState::Done { provider, parsed } => return Some((provider, parsed)),
            };
        }
    }

    async fn attempt(
        &self,
        descriptor: &ProviderDescriptor,
        provider: &dyn SummarizeProvider,
        prompt: &str,
        corpus: &[CorpusEntry],
        deadline: Option<Instant>,
    ) -> Attempt {
        let Some(rendered) = render_corpus(prompt, corpus, descriptor.max_input_chars) else {
            tracing::info!(
                provider = %descriptor.id,
                max_input_chars = ?descriptor.max_input_chars,
                "top source exceeds provider input limit, skipping"
            );
            return Attempt::Skipped;
        };

        let mut timeout = descriptor.timeout;
        if let Some(deadline) = deadline {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                tracing::warn!(provider = %descriptor.id, "run deadline passed before AI summarization");
                return Attempt::DeadlinePassed;
            }
            timeout = timeout.min(remaining);
        }

        tracing::debug!(
            provider = %descriptor.id,
            included = rendered.included,
            chars = rendered.text.len(),
            "requesting AI summary"
        );
        let result = match tokio::time::timeout(timeout, provider.summarize(prompt, &rendered.text))
            .await
        {
            Ok(reply) => reply.and_then(|text| parse_response(&descriptor.id, &text)),
            Err(_) => Err(ProviderError::Timeout(format!(
                "{}: no response within {}ms",
                descriptor.id,
                timeout.as_millis()
            ))),
        };
        self.registry.record(&descriptor.id, Outcome::of(&result));

        match result {
            Ok(parsed) => {
                tracing::info!(provider = %descriptor.id, sections = parsed.narrative_sections(), "AI summary accepted");
                Attempt::Succeeded(parsed)
            }
            Err(err) => {
                tracing::warn!(
                    provider = %descriptor.id,
                    code = err.code(),
                    error = %err,
                    "AI provider failed"
                );
                Attempt::Failed
            }
        }
    }
}

/// AI sections where present, heuristic sections elsewhere.
fn fill_narrative(parsed: ParsedResponse, heuristic: Narrative) -> Narrative {
    Narrative {
        overview: parsed.overview.unwrap_or(heuristic.overview),
        key_findings: parsed.key_findings.unwrap_or(heuristic.key_findings),
        detailed_analysis: parsed
            .detailed_analysis
            .unwrap_or(heuristic.detailed_analysis),
        implications: parsed.implications.unwrap_or(heuristic.implications),
    }
}
