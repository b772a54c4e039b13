//! End-to-end research run: search, extract, summarize.
//!
//! [`ResearchPipeline::run`] never fails. Every stage degrades on its own
//! and the report records what happened in its `notices`.

use std::sync::Arc;
use std::time::Duration;

use sift_search::engines::{
    BraveProvider, DuckDuckGoProvider, ExaProvider, SerpApiProvider, TavilyProvider,
};
use sift_search::{
    ContentExtractor, ContentFetcher, HttpFetcher, ProviderCategory, ProviderDescriptor,
    ProviderRegistry, SearchAggregator, SearchHit, SearchProvider,
};
use tokio::time::Instant;

use crate::config::{AiKind, ProviderBlock, SearchKind, SiftConfig};
use crate::corpus::build_corpus;
use crate::error::{Result, SiftError};
use crate::report::SummaryReport;
use crate::summarize::providers::{
    AnthropicProvider, GeminiProvider, OllamaProvider, OpenAiCompatibleProvider,
};
use crate::summarize::{SummarizationEngine, SummarizeProvider};

/// Registry id of the page fetcher.
pub const FETCHER_ID: &str = "http-fetch";

pub const NO_SEARCH_PROVIDERS_NOTICE: &str = "no search providers configured";
pub const SEARCH_FAILED_NOTICE: &str = "all search providers failed; no sources found";
pub const NO_RESULTS_NOTICE: &str = "search returned no results";
pub const DEADLINE_NOTICE: &str =
    "run deadline reached; summary uses the sources gathered so far";

/// Run-level limits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineSettings {
    /// Hits kept after search ranking.
    pub max_results: usize,
    /// Top hits that go through extraction and into the corpus.
    pub extraction_pool: usize,
    pub overall_deadline: Duration,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self::from_config(&SiftConfig::empty())
    }
}

impl PipelineSettings {
    pub fn from_config(config: &SiftConfig) -> Self {
        Self {
            max_results: config.search_options.max_results,
            extraction_pool: config.pipeline.extraction_pool,
            overall_deadline: config.pipeline.overall_deadline(),
        }
    }
}

/// Owns the registry and the three stages that share it.
pub struct ResearchPipeline {
    registry: Arc<ProviderRegistry>,
    aggregator: SearchAggregator,
    extractor: ContentExtractor,
    engine: SummarizationEngine,
    settings: PipelineSettings,
}

impl ResearchPipeline {
    /// Assemble a pipeline from parts. All parts must share `registry`.
    pub fn new(
        registry: Arc<ProviderRegistry>,
        aggregator: SearchAggregator,
        extractor: ContentExtractor,
        engine: SummarizationEngine,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            registry,
            aggregator,
            extractor,
            engine,
            settings,
        }
    }

    /// Build every provider whose credentials resolve. Keyed providers
    /// without a key are left out.
    ///
    /// # Errors
    ///
    /// Returns [`SiftError::Config`] if the configuration is invalid and
    /// [`SiftError::Http`] if an HTTP client cannot be built.
    pub fn from_config(config: &SiftConfig) -> Result<Self> {
        config.validate()?;
        let user_agent = config.search_options.user_agent.as_deref();

        let mut descriptors = Vec::new();
        let mut search_providers: Vec<Arc<dyn SearchProvider>> = Vec::new();
        for block in &config.search {
            let id = block.provider_id();
            let key = block.resolve_api_key();
            if block.requires_key() && key.is_none() {
                tracing::info!(provider = %id, "no API key found, search provider skipped");
                continue;
            }
            let timeout = block.timeout(&config.search_options);
            let client = sift_search::http::build_client(user_agent, timeout)?;
            descriptors.push(
                ProviderDescriptor::new(&id, ProviderCategory::Search)
                    .with_priority(block.priority())
                    .with_timeout(timeout)
                    .with_enabled(block.enabled),
            );
            search_providers.push(search_provider(
                block,
                id,
                key.unwrap_or_default(),
                client,
                config.search_options.safe_search,
            ));
        }

        let mut ai_providers: Vec<Arc<dyn SummarizeProvider>> = Vec::new();
        for block in &config.ai {
            let id = block.provider_id();
            let key = block.resolve_api_key();
            if block.requires_key() && key.is_none() {
                tracing::info!(provider = %id, "no API key found, AI provider skipped");
                continue;
            }
            let timeout = block.timeout();
            let client = reqwest::Client::builder()
                .user_agent(concat!("sift/", env!("CARGO_PKG_VERSION")))
                .timeout(timeout)
                .build()
                .map_err(|e| SiftError::Http(format!("failed to build HTTP client: {e}")))?;
            descriptors.push(
                ProviderDescriptor::new(&id, ProviderCategory::AiSummarize)
                    .with_priority(block.priority())
                    .with_timeout(timeout)
                    .with_max_input_chars(block.max_input_chars())
                    .with_enabled(block.enabled),
            );
            ai_providers.push(ai_provider(
                block,
                id,
                key,
                client,
                config.summary.max_output_tokens,
            ));
        }

        let fetcher = HttpFetcher::new(
            user_agent,
            config.extraction.fetch_timeout(),
            config.extraction.max_response_bytes,
        )?
        .with_id(FETCHER_ID);
        descriptors.push(
            ProviderDescriptor::new(FETCHER_ID, ProviderCategory::ContentFetch)
                .with_timeout(config.extraction.per_url_budget()),
        );

        let registry = Arc::new(ProviderRegistry::new(config.registry.clone(), descriptors));
        let mut aggregator = SearchAggregator::new(Arc::clone(&registry));
        for provider in search_providers {
            aggregator.register(provider);
        }
        let fetcher: Arc<dyn ContentFetcher> = Arc::new(fetcher);
        let extractor =
            ContentExtractor::new(fetcher, Arc::clone(&registry), config.extraction.clone());
        let mut engine = SummarizationEngine::new(Arc::clone(&registry), config.summary.clone());
        for provider in ai_providers {
            engine.register(provider);
        }

        tracing::info!(
            search = aggregator.provider_count(),
            ai = engine.provider_count(),
            "research pipeline ready"
        );
        Ok(Self::new(
            registry,
            aggregator,
            extractor,
            engine,
            PipelineSettings::from_config(config),
        ))
    }

    #[must_use]
    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.settings.max_results = max_results.max(1);
        self
    }

    pub fn registry(&self) -> &Arc<ProviderRegistry> {
        &self.registry
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Fail when no search provider can be queried. [`run`](Self::run)
    /// still works in that state; this is for callers that want to refuse
    /// early.
    pub fn check(&self) -> Result<()> {
        if self.aggregator.provider_count() == 0 {
            return Err(SiftError::Config(NO_SEARCH_PROVIDERS_NOTICE.into()));
        }
        Ok(())
    }

    /// Research `query` and return a report. Never fails.
    pub async fn run(&self, query: &str) -> SummaryReport {
        let query = query.trim();
        self.registry.begin_run();
        let deadline = Instant::now().checked_add(self.settings.overall_deadline);
        if deadline.is_none() {
            tracing::warn!(
                secs = self.settings.overall_deadline.as_secs(),
                "run deadline out of range, running without one"
            );
        }
        let mut notices = Vec::new();
        tracing::debug!(query, "research run started");

        let hits = self.search(query, deadline, &mut notices).await;
        let sources_found = hits.len();

        let top: Vec<SearchHit> = hits
            .into_iter()
            .take(self.settings.extraction_pool)
            .collect();
        let documents = if top.is_empty() {
            Vec::new()
        } else {
            self.extractor.extract_all(&top, deadline).await
        };
        if deadline.is_some_and(|d| Instant::now() >= d) {
            tracing::warn!("run deadline reached before summarization");
            notices.push(DEADLINE_NOTICE.to_string());
        }

        let corpus = build_corpus(top, documents);
        let mut report = self
            .engine
            .summarize_until(query, &corpus, deadline)
            .await;
        report.stats.sources_found = sources_found;
        notices.append(&mut report.notices);
        report.notices = notices;

        tracing::info!(
            sources = report.sources.len(),
            extracted = report.stats.documents_extracted,
            attribution = %report.attribution,
            "research run finished"
        );
        report
    }

    async fn search(
        &self,
        query: &str,
        deadline: Option<Instant>,
        notices: &mut Vec<String>,
    ) -> Vec<SearchHit> {
        if self.aggregator.provider_count() == 0 {
            tracing::warn!("no search providers configured");
            notices.push(NO_SEARCH_PROVIDERS_NOTICE.to_string());
            return Vec::new();
        }
        let hits = self
            .aggregator
            .search_until(query, self.settings.max_results, deadline)
            .await;
        if hits.is_empty() {
            let offered = self.registry.enabled_providers(ProviderCategory::Search);
            let all_failed = self
                .registry
                .health_report()
                .iter()
                .filter(|h| offered.iter().any(|d| d.id == h.id))
                .all(|h| h.consecutive_failures > 0);
            notices.push(if all_failed {
                SEARCH_FAILED_NOTICE.to_string()
            } else {
                NO_RESULTS_NOTICE.to_string()
            });
        }
        hits
    }
}

fn search_provider(
    block: &ProviderBlock<SearchKind>,
    id: String,
    key: String,
    client: reqwest::Client,
    safe_search: bool,
) -> Arc<dyn SearchProvider> {
    let endpoint = block.endpoint.clone();
    match block.kind {
        SearchKind::Tavily => {
            let mut provider = TavilyProvider::new(key, client).with_id(id);
            if let Some(endpoint) = endpoint {
                provider = provider.with_endpoint(endpoint);
            }
            Arc::new(provider)
        }
        SearchKind::Exa => {
            let mut provider = ExaProvider::new(key, client).with_id(id);
            if let Some(endpoint) = endpoint {
                provider = provider.with_endpoint(endpoint);
            }
            Arc::new(provider)
        }
        SearchKind::SerpApi => {
            let mut provider = SerpApiProvider::new(key, client)
                .with_id(id)
                .with_safe_search(safe_search);
            if let Some(endpoint) = endpoint {
                provider = provider.with_endpoint(endpoint);
            }
            Arc::new(provider)
        }
        SearchKind::Brave => {
            let mut provider = BraveProvider::new(key, client)
                .with_id(id)
                .with_safe_search(safe_search);
            if let Some(endpoint) = endpoint {
                provider = provider.with_endpoint(endpoint);
            }
            Arc::new(provider)
        }
        SearchKind::DuckDuckGo => {
            let mut provider = DuckDuckGoProvider::new(client)
                .with_id(id)
                .with_safe_search(safe_search);
            if let Some(endpoint) = endpoint {
                provider = provider.with_endpoint(endpoint);
            }
            Arc::new(provider)
        }
    }
}

fn ai_provider(
    block: &ProviderBlock<AiKind>,
    id: String,
    key: Option<String>,
    client: reqwest::Client,
    max_tokens: u32,
) -> Arc<dyn SummarizeProvider> {
    let model = block.model();
    let endpoint = block.endpoint();
    match block.kind {
        AiKind::OpenAi | AiKind::Perplexity | AiKind::Together | AiKind::Groq => Arc::new(
            OpenAiCompatibleProvider::new(id, key, model, client)
                .with_base_url(endpoint)
                .with_max_tokens(max_tokens),
        ),
        AiKind::Anthropic => Arc::new(
            AnthropicProvider::new(id, key.unwrap_or_default(), model, client)
                .with_base_url(endpoint)
                .with_max_tokens(max_tokens),
        ),
        AiKind::Gemini => Arc::new(
            GeminiProvider::new(id, key.unwrap_or_default(), model, client)
                .with_base_url(endpoint)
                .with_max_tokens(max_tokens),
        ),
        AiKind::Ollama => Arc::new(
            OllamaProvider::new(id, model, client)
                .with_base_url(endpoint)
                .with_max_tokens(max_tokens),
        ),
    }
}
