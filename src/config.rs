//! Configuration types for the research pipeline.
//!
//! The whole file deserializes with `#[serde(default)]`, so an empty TOML
//! document is a valid configuration. Provider blocks are arrays:
//!
//! ```toml
//! [pipeline]
//! extraction_pool = 8
//!
//! [[search]]
//! kind = "tavily"
//! api_key_env = "MY_TAVILY_KEY"
//!
//! [[ai]]
//! kind = "openai"
//! model = "gpt-4o-mini"
//! max_input_chars = 48000
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use sift_search::{ExtractionConfig, RegistryConfig, SearchConfig};

use crate::pipeline::FETCHER_ID;
use crate::report::HEURISTIC_FALLBACK;

use crate::error::{Result, SiftError};

/// Root configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiftConfig {
    pub pipeline: PipelineConfig,
    pub registry: RegistryConfig,
    /// Fan-out settings shared by every search provider.
    pub search_options: SearchConfig,
    pub extraction: ExtractionConfig,
    pub summary: SummaryConfig,
    /// Search provider blocks (`[[search]]`).
    pub search: Vec<ProviderBlock<SearchKind>>,
    /// AI summarization provider blocks (`[[ai]]`).
    pub ai: Vec<ProviderBlock<AiKind>>,
}

impl Default for SiftConfig {
    fn default() -> Self {
        Self {
            pipeline: PipelineConfig::default(),
            registry: RegistryConfig::default(),
            search_options: SearchConfig::default(),
            extraction: ExtractionConfig::default(),
            summary: SummaryConfig::default(),
            search: vec![
                ProviderBlock::new(SearchKind::Tavily),
                ProviderBlock::new(SearchKind::Exa),
                ProviderBlock::new(SearchKind::SerpApi),
                ProviderBlock::new(SearchKind::Brave),
                ProviderBlock::new(SearchKind::DuckDuckGo),
            ],
            ai: vec![
                ProviderBlock::new(AiKind::OpenAi),
                ProviderBlock::new(AiKind::Anthropic),
                ProviderBlock::new(AiKind::Gemini),
            ],
        }
    }
}

/// Run-level limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// How many top-ranked hits go through content extraction.
    pub extraction_pool: usize,
    /// Upper bound on one whole run, in seconds.
    pub overall_deadline_secs: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            extraction_pool: 8,
            overall_deadline_secs: 60,
        }
    }
}

impl PipelineConfig {
    pub fn overall_deadline(&self) -> Duration {
        Duration::from_secs(self.overall_deadline_secs)
    }
}

/// Summarization settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryConfig {
    /// Maximum number of keywords in a report.
    pub keyword_target: usize,
    /// Below this many keywords a debug message is logged. Never padded.
    pub keyword_floor: usize,
    /// Maximum number of follow-up questions.
    pub max_questions: usize,
    /// Output token limit requested from AI providers.
    pub max_output_tokens: u32,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            keyword_target: 20,
            keyword_floor: 5,
            max_questions: 8,
            max_output_tokens: 1_500,
        }
    }
}

/// Per-kind defaults for provider blocks.
pub trait ProviderKind: Copy {
    /// Name used as the default provider id.
    fn name(&self) -> &'static str;
    /// Environment variable conventionally holding this kind's API key.
    fn default_key_env(&self) -> Option<&'static str>;
    fn default_priority(&self) -> u32;
}

/// Supported search backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchKind {
    Tavily,
    Exa,
    SerpApi,
    Brave,
    DuckDuckGo,
}

impl ProviderKind for SearchKind {
    fn name(&self) -> &'static str {
        match self {
            Self::Tavily => "tavily",
            Self::Exa => "exa",
            Self::SerpApi => "serpapi",
            Self::Brave => "brave",
            Self::DuckDuckGo => "duckduckgo",
        }
    }

    fn default_key_env(&self) -> Option<&'static str> {
        match self {
            Self::Tavily => Some("TAVILY_API_KEY"),
            Self::Exa => Some("EXA_API_KEY"),
            Self::SerpApi => Some("SERPAPI_API_KEY"),
            Self::Brave => Some("BRAVE_API_KEY"),
            Self::DuckDuckGo => None,
        }
    }

    fn default_priority(&self) -> u32 {
        match self {
            Self::Tavily => 10,
            Self::Exa => 20,
            Self::SerpApi => 30,
            Self::Brave => 40,
            Self::DuckDuckGo => 50,
        }
    }
}

/// Supported AI summarization backends. `perplexity`, `together` and `groq`
/// speak the OpenAI chat-completions protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AiKind {
    OpenAi,
    Perplexity,
    Together,
    Groq,
    Anthropic,
    Gemini,
    Ollama,
}

impl ProviderKind for AiKind {
    fn name(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Perplexity => "perplexity",
            Self::Together => "together",
            Self::Groq => "groq",
            Self::Anthropic => "anthropic",
            Self::Gemini => "gemini",
            Self::Ollama => "ollama",
        }
    }

    fn default_key_env(&self) -> Option<&'static str> {
        match self {
            Self::OpenAi => Some("OPENAI_API_KEY"),
            Self::Perplexity => Some("PERPLEXITY_API_KEY"),
            Self::Together => Some("TOGETHER_API_KEY"),
            Self::Groq => Some("GROQ_API_KEY"),
            Self::Anthropic => Some("ANTHROPIC_API_KEY"),
            Self::Gemini => Some("GEMINI_API_KEY"),
            Self::Ollama => None,
        }
    }

    fn default_priority(&self) -> u32 {
        match self {
            Self::OpenAi => 10,
            Self::Anthropic => 20,
            Self::Gemini => 30,
            Self::Perplexity => 40,
            Self::Together => 50,
            Self::Groq => 60,
            Self::Ollama => 90,
        }
    }
}

impl AiKind {
    pub fn default_endpoint(&self) -> &'static str {
        match self {
            Self::OpenAi => "https://api.openai.com/v1",
            Self::Perplexity => "https://api.perplexity.ai",
            Self::Together => "https://api.together.xyz/v1",
            Self::Groq => "https://api.groq.com/openai/v1",
            Self::Anthropic => "https://api.anthropic.com",
            Self::Gemini => "https://generativelanguage.googleapis.com/v1beta",
            Self::Ollama => "http://localhost:11434",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            Self::OpenAi => "gpt-4o-mini",
            Self::Perplexity => "sonar",
            Self::Together => "meta-llama/Llama-3.3-70B-Instruct-Turbo",
            Self::Groq => "llama-3.3-70b-versatile",
            Self::Anthropic => "claude-3-5-haiku-latest",
            Self::Gemini => "gemini-1.5-flash",
            Self::Ollama => "llama3.1",
        }
    }

    /// Input-size limit in characters used when a block sets none.
    pub fn default_max_input_chars(&self) -> usize {
        match self {
            Self::Ollama => 12_000,
            Self::Anthropic | Self::Gemini => 60_000,
            _ => 48_000,
        }
    }

    pub fn default_timeout_secs(&self) -> u64 {
        match self {
            Self::Ollama => 90,
            _ => 30,
        }
    }
}

/// One `[[search]]` or `[[ai]]` block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderBlock<K> {
    pub kind: K,
    /// Provider id; defaults to the kind name. Must be unique.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Base URL or endpoint override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    /// Inline API key. Prefer `api_key_env`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Environment variable holding the API key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,
    /// Model name (AI providers only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    /// Lower is tried first.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<u32>,
    /// Input-size limit in characters (AI providers only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_input_chars: Option<usize>,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_true() -> bool {
    true
}

impl<K: ProviderKind> ProviderBlock<K> {
    /// A block with every optional field unset.
    pub fn new(kind: K) -> Self {
        Self {
            kind,
            id: None,
            endpoint: None,
            api_key: None,
            api_key_env: None,
            model: None,
            timeout_secs: None,
            priority: None,
            max_input_chars: None,
            enabled: true,
        }
    }

    pub fn provider_id(&self) -> String {
        self.id
            .clone()
            .unwrap_or_else(|| self.kind.name().to_string())
    }

    pub fn priority(&self) -> u32 {
        self.priority.unwrap_or_else(|| self.kind.default_priority())
    }

    /// Whether this kind needs an API key at all.
    pub fn requires_key(&self) -> bool {
        self.kind.default_key_env().is_some()
    }

    /// Resolve the API key from the process environment.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.resolve_api_key_with(|var| std::env::var(var).ok())
    }

    /// Resolve the API key: the inline key, then the named variable, then
    /// the kind's conventional variable. Blank values count as missing.
    pub fn resolve_api_key_with(&self, lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
        let present = |value: Option<String>| value.filter(|v| !v.trim().is_empty());
        present(self.api_key.clone())
            .or_else(|| self.api_key_env.as_deref().and_then(|var| present(lookup(var))))
            .or_else(|| {
                self.kind
                    .default_key_env()
                    .and_then(|var| present(lookup(var)))
            })
    }

    fn validate(&self) -> Result<()> {
        let id = self.provider_id();
        if id.trim().is_empty() {
            return Err(SiftError::Config("provider id must not be empty".into()));
        }
        if self.timeout_secs == Some(0) {
            return Err(SiftError::Config(format!(
                "provider `{id}`: timeout_secs must be greater than 0"
            )));
        }
        if self.max_input_chars == Some(0) {
            return Err(SiftError::Config(format!(
                "provider `{id}`: max_input_chars must be greater than 0"
            )));
        }
        Ok(())
    }
}

impl ProviderBlock<SearchKind> {
    /// Per-call timeout, defaulting to the shared search timeout.
    pub fn timeout(&self, options: &SearchConfig) -> Duration {
        self.timeout_secs
            .map_or_else(|| options.timeout(), Duration::from_secs)
    }
}

impl ProviderBlock<AiKind> {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(
            self.timeout_secs
                .unwrap_or_else(|| self.kind.default_timeout_secs()),
        )
    }

    pub fn model(&self) -> String {
        self.model
            .clone()
            .unwrap_or_else(|| self.kind.default_model().to_string())
    }

    pub fn endpoint(&self) -> String {
        self.endpoint
            .clone()
            .unwrap_or_else(|| self.kind.default_endpoint().to_string())
    }

    pub fn max_input_chars(&self) -> usize {
        self.max_input_chars
            .unwrap_or_else(|| self.kind.default_max_input_chars())
    }
}

impl SiftConfig {
    /// Config without any provider blocks.
    pub fn empty() -> Self {
        Self {
            search: Vec::new(),
            ai: Vec::new(),
            ..Self::default()
        }
    }

    /// Load configuration from a TOML file, falling back to defaults for missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| SiftError::Config(e.to_string()))
    }

    /// Save configuration to a TOML file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or the config cannot be serialized.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| SiftError::Config(e.to_string()))
    }

    /// Returns the default config file path: `~/.config/sift/config.toml`.
    pub fn default_config_path() -> PathBuf {
        if let Some(config) = std::env::var_os("XDG_CONFIG_HOME") {
            PathBuf::from(config).join("sift").join("config.toml")
        } else if let Some(home) = std::env::var_os("HOME") {
            PathBuf::from(home)
                .join(".config")
                .join("sift")
                .join("config.toml")
        } else {
            PathBuf::from("/tmp/sift-config/config.toml")
        }
    }

    /// Reject zero limits, zero timeouts, duplicate provider ids and ids
    /// reserved for the fallback summarizer or the page fetcher.
    pub fn validate(&self) -> Result<()> {
        self.registry.validate()?;
        self.search_options.validate()?;
        self.extraction.validate()?;

        if self.pipeline.extraction_pool == 0 {
            return Err(SiftError::Config(
                "extraction_pool must be greater than 0".into(),
            ));
        }
        if self.pipeline.overall_deadline_secs == 0 {
            return Err(SiftError::Config(
                "overall_deadline_secs must be greater than 0".into(),
            ));
        }
        if self.summary.keyword_target == 0 {
            return Err(SiftError::Config(
                "keyword_target must be greater than 0".into(),
            ));
        }
        if self.summary.keyword_floor > self.summary.keyword_target {
            return Err(SiftError::Config(
                "keyword_floor must be <= keyword_target".into(),
            ));
        }
        if self.summary.max_questions == 0 {
            return Err(SiftError::Config(
                "max_questions must be greater than 0".into(),
            ));
        }
        if self.summary.max_output_tokens == 0 {
            return Err(SiftError::Config(
                "max_output_tokens must be greater than 0".into(),
            ));
        }

        let mut seen = HashSet::new();
        let ids = self
            .search
            .iter()
            .map(|b| b.validate().map(|()| b.provider_id()))
            .chain(self.ai.iter().map(|b| b.validate().map(|()| b.provider_id())));
        for id in ids {
            let id = id?;
            if id == HEURISTIC_FALLBACK || id == FETCHER_ID {
                return Err(SiftError::Config(format!("provider id `{id}` is reserved")));
            }
            if !seen.insert(id.clone()) {
                return Err(SiftError::Config(format!("duplicate provider id `{id}`")));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var| map.get(var).cloned()
    }

    #[test]
    fn default_config_is_valid() {
        let config = SiftConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.summary.keyword_target, 20);
        assert_eq!(config.summary.keyword_floor, 5);
        assert_eq!(config.search.len(), 5);
        assert!(config.search.iter().any(|b| b.kind == SearchKind::DuckDuckGo));
    }

    #[test]
    fn empty_toml_uses_defaults() {
        let config = SiftConfig::from_toml("").expect("parse");
        assert_eq!(config, SiftConfig::default());
    }

    #[test]
    fn parses_provider_blocks() {
        let config = SiftConfig::from_toml(
            r#"
            [pipeline]
            extraction_pool = 3

            [summary]
            keyword_target = 10

            [[search]]
            kind = "brave"
            priority = 1
            timeout_secs = 4

            [[ai]]
            kind = "perplexity"
            id = "pplx"
            model = "sonar-pro"
            max_input_chars = 8000
            enabled = false
            "#,
        )
        .expect("parse");

        assert_eq!(config.pipeline.extraction_pool, 3);
        assert_eq!(config.pipeline.overall_deadline_secs, 60);
        assert_eq!(config.summary.keyword_target, 10);
        assert_eq!(config.search.len(), 1);
        assert_eq!(config.search[0].priority(), 1);
        assert_eq!(
            config.search[0].timeout(&config.search_options),
            Duration::from_secs(4)
        );

        let ai = &config.ai[0];
        assert_eq!(ai.provider_id(), "pplx");
        assert_eq!(ai.model(), "sonar-pro");
        assert_eq!(ai.endpoint(), "https://api.perplexity.ai");
        assert_eq!(ai.max_input_chars(), 8000);
        assert!(!ai.enabled);
    }

    #[test]
    fn unknown_kind_is_config_error() {
        let err = SiftConfig::from_toml("[[search]]\nkind = \"altavista\"\n").unwrap_err();
        assert!(matches!(err, SiftError::Config(_)));
    }

    #[test]
    fn credential_resolution_order() {
        let mut block = ProviderBlock::new(SearchKind::Tavily);
        let lookup = env(&[("TAVILY_API_KEY", "conventional"), ("MY_KEY", "named")]);
        assert_eq!(block.resolve_api_key_with(&lookup).as_deref(), Some("conventional"));

        block.api_key_env = Some("MY_KEY".into());
        assert_eq!(block.resolve_api_key_with(&lookup).as_deref(), Some("named"));

        block.api_key = Some("inline".into());
        assert_eq!(block.resolve_api_key_with(&lookup).as_deref(), Some("inline"));
    }

    #[test]
    fn blank_and_missing_keys_do_not_resolve() {
        let mut block = ProviderBlock::new(AiKind::OpenAi);
        block.api_key = Some("   ".into());
        assert!(block.resolve_api_key_with(env(&[])).is_none());
        assert!(block.resolve_api_key_with(env(&[("OPENAI_API_KEY", "")])).is_none());
    }

    #[test]
    fn keyless_kinds() {
        assert!(!ProviderBlock::new(SearchKind::DuckDuckGo).requires_key());
        assert!(!ProviderBlock::new(AiKind::Ollama).requires_key());
        assert!(ProviderBlock::new(AiKind::Gemini).requires_key());
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let mut config = SiftConfig::empty();
        config.search.push(ProviderBlock::new(SearchKind::Brave));
        let mut second = ProviderBlock::new(SearchKind::Tavily);
        second.id = Some("brave".into());
        config.search.push(second);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("duplicate provider id"));
    }

    #[test]
    fn reserved_ids_are_rejected() {
        let mut config = SiftConfig::empty();
        let mut ai = ProviderBlock::new(AiKind::Ollama);
        ai.id = Some(HEURISTIC_FALLBACK.into());
        config.ai.push(ai);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("reserved"));

        let mut config = SiftConfig::empty();
        let mut search = ProviderBlock::new(SearchKind::DuckDuckGo);
        search.id = Some(FETCHER_ID.into());
        config.search.push(search);
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_limits_are_rejected() {
        let mut config = SiftConfig::empty();
        config.pipeline.extraction_pool = 0;
        assert!(config.validate().is_err());

        let mut config = SiftConfig::empty();
        config.summary.keyword_floor = 30;
        assert!(config.validate().is_err());

        let mut config = SiftConfig::empty();
        let mut block = ProviderBlock::new(AiKind::Anthropic);
        block.timeout_secs = Some(0);
        config.ai.push(block);
        assert!(config.validate().is_err());

        let mut config = SiftConfig::empty();
        config.registry.degraded_after = 9;
        assert!(matches!(config.validate(), Err(SiftError::Config(_))));
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("config.toml");

        let mut config = SiftConfig::default();
        config.pipeline.extraction_pool = 4;
        config.ai[0].model = Some("gpt-4.1-mini".into());

        config.save_to_file(&path).expect("save");
        let loaded = SiftConfig::from_file(&path).expect("load");
        assert_eq!(loaded, config);
    }

    #[test]
    fn from_file_nonexistent_returns_error() {
        let result = SiftConfig::from_file(Path::new("/nonexistent/path/config.toml"));
        assert!(matches!(result, Err(SiftError::Io(_))));
    }

    #[test]
    fn default_config_path_ends_with_config_toml() {
        let path = SiftConfig::default_config_path();
        let path_str = path.to_string_lossy();
        assert!(path_str.ends_with("config.toml"));
        assert!(path_str.contains("sift"));
    }
}
