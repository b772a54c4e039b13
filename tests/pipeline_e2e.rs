//! End-to-end pipeline runs with mock search providers, a mock page
//! fetcher and (optionally) a mock AI server.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use sift::config::SummaryConfig;
use sift::pipeline::{
    DEADLINE_NOTICE, FETCHER_ID, NO_SEARCH_PROVIDERS_NOTICE, PipelineSettings,
    SEARCH_FAILED_NOTICE,
};
use sift::summarize::AI_UNAVAILABLE_NOTICE;
use sift::summarize::providers::OpenAiCompatibleProvider;
use sift::{Attribution, ResearchPipeline, SummarizationEngine};
use sift_search::{
    ContentExtractor, ContentFetcher, ExtractionConfig, FetchedPage, ProviderCategory,
    ProviderDescriptor, ProviderError, ProviderRegistry, RawHit, RegistryConfig,
    SearchAggregator, SearchProvider,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const QUERY: &str = "renewable energy trends";

struct FixedSearch {
    id: &'static str,
    hits: Result<Vec<RawHit>, ProviderError>,
}

#[async_trait]
impl SearchProvider for FixedSearch {
    fn id(&self) -> &str {
        self.id
    }

    async fn query(&self, _text: &str, limit: usize) -> Result<Vec<RawHit>, ProviderError> {
        self.hits
            .clone()
            .map(|hits| hits.into_iter().take(limit).collect())
    }
}

/// Fails every fetch, optionally after a delay, so the corpus is built
/// from snippets.
struct OfflineFetcher {
    delay: Duration,
}

#[async_trait]
impl ContentFetcher for OfflineFetcher {
    fn id(&self) -> &str {
        FETCHER_ID
    }

    async fn fetch(&self, url: &str) -> Result<FetchedPage, ProviderError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Err(ProviderError::Transport(format!("{url}: offline")))
    }
}

fn raw(url: &str, title: &str, snippet: &str) -> RawHit {
    RawHit {
        url: url.into(),
        title: title.into(),
        snippet: snippet.into(),
        score: None,
    }
}

fn alpha_hits() -> Vec<RawHit> {
    vec![
        raw(
            "https://energy.example/solar-record",
            "Solar sets a record",
            "Renewable energy capacity grew by 50 percent in 2023, led by record solar installations worldwide.",
        ),
        raw(
            "https://energy.example/wind",
            "Offshore wind expands",
            "Offshore wind projects added new renewable energy capacity across northern Europe last year.",
        ),
        raw(
            "https://energy.example/storage",
            "Battery storage",
            "Battery storage deployments doubled as utilities paired batteries with renewable energy farms.",
        ),
        raw(
            "https://energy.example/investment",
            "Investment outlook",
            "Analysts expect renewable energy investment to keep rising through the next decade.",
        ),
        raw(
            "https://energy.example/grid",
            "Grid upgrades",
            "Grid operators plan new transmission lines to carry renewable power to cities.",
        ),
    ]
}

fn beta_hits() -> Vec<RawHit> {
    vec![
        raw(
            "https://energy.example/solar-record?utm_source=newsletter",
            "Solar sets a record",
            "Solar installations reached a record high in 2023 according to industry data.",
        ),
        raw(
            "https://news.example/hydrogen",
            "Green hydrogen",
            "Green hydrogen pilots use surplus renewable energy to produce clean fuel for industry.",
        ),
        raw(
            "https://news.example/jobs",
            "Clean energy jobs",
            "Employment in the renewable energy sector rose to 13 million jobs globally.",
        ),
        raw(
            "https://news.example/policy",
            "Policy support",
            "Governments introduced tax credits that will accelerate renewable energy adoption.",
        ),
        raw(
            "https://news.example/costs",
            "Falling costs",
            "The cost of solar and wind electricity fell below fossil fuel generation in most markets.",
        ),
    ]
}

fn search_descriptor(id: &str, priority: u32) -> ProviderDescriptor {
    ProviderDescriptor::new(id, ProviderCategory::Search)
        .with_priority(priority)
        .with_timeout(Duration::from_secs(2))
}

struct Setup {
    search: Vec<(ProviderDescriptor, Arc<dyn SearchProvider>)>,
    ai: Vec<(ProviderDescriptor, Arc<dyn sift::SummarizeProvider>)>,
    fetch_delay: Duration,
    settings: PipelineSettings,
}

impl Setup {
    fn new() -> Self {
        Self {
            search: Vec::new(),
            ai: Vec::new(),
            fetch_delay: Duration::ZERO,
            settings: PipelineSettings {
                max_results: 10,
                extraction_pool: 8,
                overall_deadline: Duration::from_secs(30),
            },
        }
    }

    fn with_search(mut self, id: &'static str, priority: u32, hits: Result<Vec<RawHit>, ProviderError>) -> Self {
        self.search.push((
            search_descriptor(id, priority),
            Arc::new(FixedSearch { id, hits }),
        ));
        self
    }

    fn build(self) -> ResearchPipeline {
        let mut descriptors: Vec<ProviderDescriptor> =
            self.search.iter().map(|(d, _)| d.clone()).collect();
        descriptors.extend(self.ai.iter().map(|(d, _)| d.clone()));
        descriptors.push(ProviderDescriptor::new(FETCHER_ID, ProviderCategory::ContentFetch));
        let registry = Arc::new(ProviderRegistry::new(RegistryConfig::default(), descriptors));

        let mut aggregator = SearchAggregator::new(Arc::clone(&registry));
        for (_, provider) in self.search {
            aggregator.register(provider);
        }
        let fetcher: Arc<dyn ContentFetcher> = Arc::new(OfflineFetcher {
            delay: self.fetch_delay,
        });
        let extractor =
            ContentExtractor::new(fetcher, Arc::clone(&registry), ExtractionConfig::default());
        let mut engine = SummarizationEngine::new(Arc::clone(&registry), SummaryConfig::default());
        for (_, provider) in self.ai {
            engine.register(provider);
        }
        ResearchPipeline::new(registry, aggregator, extractor, engine, self.settings)
    }
}

#[tokio::test]
async fn renewable_energy_with_heuristic_fallback() {
    let pipeline = Setup::new()
        .with_search("alpha", 1, Ok(alpha_hits()))
        .with_search("beta", 2, Ok(beta_hits()))
        .build();

    let report = pipeline.run(QUERY).await;

    assert_eq!(report.stats.sources_found, 9);
    assert_eq!(report.sources.len(), 8);
    assert_eq!(report.attribution, Attribution::HeuristicFallback);
    assert!(report.narrative.is_complete());
    assert!(!report.keywords.is_empty());
    assert!(
        report
            .keywords
            .iter()
            .any(|k| k == "renewable" || k == "energy")
    );
    assert!(!report.follow_up_questions.is_empty());
    assert!(report.notices.is_empty());

    let solar: Vec<_> = report
        .sources
        .iter()
        .filter(|s| s.url.contains("solar-record"))
        .collect();
    assert_eq!(solar.len(), 1);
}

#[tokio::test]
async fn zero_providers_of_any_kind() {
    let pipeline = Setup::new().build();
    let report = pipeline.run(QUERY).await;

    assert!(report.sources.is_empty());
    assert!(report.keywords.is_empty());
    assert!(!report.follow_up_questions.is_empty());
    assert_eq!(report.attribution.as_str(), "heuristic-fallback");
    assert!(report.narrative.is_complete());
    assert_eq!(report.notices, [NO_SEARCH_PROVIDERS_NOTICE]);
    assert!(pipeline.check().is_err());
}

#[tokio::test]
async fn every_search_provider_failing_is_not_an_error() {
    let pipeline = Setup::new()
        .with_search("alpha", 1, Err(ProviderError::Transport("alpha: HTTP 500".into())))
        .with_search("beta", 2, Err(ProviderError::Timeout("beta: timed out".into())))
        .build();

    let report = pipeline.run(QUERY).await;

    assert!(report.sources.is_empty());
    assert_eq!(report.stats.sources_found, 0);
    assert!(report.attribution.is_heuristic());
    assert_eq!(report.notices, [SEARCH_FAILED_NOTICE]);
    assert!(report.narrative.overview.contains("No sources were found"));
}

#[tokio::test]
async fn one_failing_provider_costs_only_its_hits() {
    let pipeline = Setup::new()
        .with_search("alpha", 1, Ok(alpha_hits()))
        .with_search("beta", 2, Err(ProviderError::Transport("beta: HTTP 502".into())))
        .build();

    let report = pipeline.run(QUERY).await;

    assert_eq!(report.stats.sources_found, 5);
    assert_eq!(report.sources.len(), 5);
    assert!(report.sources.iter().all(|s| s.provider == "alpha"));
    assert!(report.notices.is_empty());
}

#[tokio::test]
async fn ai_provider_writes_the_narrative() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"content":
                "## Overview\nRenewables dominate new capacity [1].\n\n\
                 ## Key Findings\n- Solar grew 50% [1].\n\n\
                 ## Detailed Analysis\nCosts keep falling [5].\n\n\
                 ## Implications\nStorage will matter more.\n\n\
                 ## Follow-up Questions\n- Which regions lead adoption?\n"
            }}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut setup = Setup::new()
        .with_search("alpha", 1, Ok(alpha_hits()))
        .with_search("beta", 2, Ok(beta_hits()));
    setup.ai.push((
        ProviderDescriptor::new("mock-openai", ProviderCategory::AiSummarize)
            .with_priority(1)
            .with_timeout(Duration::from_secs(5)),
        Arc::new(
            OpenAiCompatibleProvider::new("mock-openai", None, "test-model", reqwest::Client::new())
                .with_base_url(server.uri()),
        ),
    ));
    let pipeline = setup.build();

    let report = pipeline.run(QUERY).await;

    assert_eq!(report.attribution.as_str(), "mock-openai");
    assert_eq!(report.narrative.overview, "Renewables dominate new capacity [1].");
    assert_eq!(report.follow_up_questions[0], "Which regions lead adoption?");
    assert!(!report.keywords.is_empty());
    assert!(report.notices.is_empty());
}

#[tokio::test]
async fn failing_ai_provider_adds_notice() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let mut setup = Setup::new().with_search("alpha", 1, Ok(alpha_hits()));
    setup.ai.push((
        ProviderDescriptor::new("broken", ProviderCategory::AiSummarize)
            .with_timeout(Duration::from_secs(5)),
        Arc::new(
            OpenAiCompatibleProvider::new("broken", None, "m", reqwest::Client::new())
                .with_base_url(server.uri()),
        ),
    ));
    let pipeline = setup.build();

    let report = pipeline.run(QUERY).await;

    assert!(report.attribution.is_heuristic());
    assert_eq!(report.notices, [AI_UNAVAILABLE_NOTICE]);
    let broken = pipeline
        .registry()
        .health_report()
        .into_iter()
        .find(|h| h.id == "broken")
        .expect("registered");
    assert_eq!(broken.consecutive_failures, 1);
}

#[tokio::test]
async fn deadline_cuts_extraction_short() {
    let mut setup = Setup::new().with_search("alpha", 1, Ok(alpha_hits()));
    setup.fetch_delay = Duration::from_secs(5);
    setup.settings.overall_deadline = Duration::from_millis(300);
    let pipeline = setup.build();

    let started = std::time::Instant::now();
    let report = pipeline.run(QUERY).await;

    assert!(started.elapsed() < Duration::from_secs(3));
    assert_eq!(report.sources.len(), 5);
    assert_eq!(report.stats.documents_extracted, 0);
    assert!(report.attribution.is_heuristic());
    assert_eq!(report.notices, [DEADLINE_NOTICE]);
    assert!(report.narrative.is_complete());
}
