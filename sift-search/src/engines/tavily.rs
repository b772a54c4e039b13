//! Tavily search API: real-time web search with relevance scores.

use crate::engine::SearchProvider;
use crate::error::ProviderError;
use crate::types::RawHit;
use async_trait::async_trait;
use serde_json::{json, Value};

use super::{clean_snippet, required_array, send_for_json, str_field};

pub const DEFAULT_ENDPOINT: &str = "https://api.tavily.com/search";

/// Tavily `POST /search` adapter.
pub struct TavilyProvider {
    id: String,
    endpoint: String,
    api_key: String,
    client: reqwest::Client,
}

impl TavilyProvider {
    pub fn new(api_key: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            id: "tavily".into(),
            endpoint: DEFAULT_ENDPOINT.into(),
            api_key: api_key.into(),
            client,
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl SearchProvider for TavilyProvider {
    fn id(&self) -> &str {
        &self.id
    }

    async fn query(&self, text: &str, limit: usize) -> Result<Vec<RawHit>, ProviderError> {
        tracing::trace!(provider = %self.id, query = text, "Tavily search");
        let request = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&json!({
                "query": text,
                "max_results": limit,
                "search_depth": "basic",
                "include_answer": false,
            }));
        let body = send_for_json(&self.id, request).await?;
        parse_tavily_response(&self.id, &body, limit)
    }
}

/// Parse a Tavily response body. `results` is required; entries without a
/// URL are skipped.
pub(crate) fn parse_tavily_response(
    provider: &str,
    body: &Value,
    limit: usize,
) -> Result<Vec<RawHit>, ProviderError> {
    let hits = required_array(provider, body, "results")?
        .iter()
        .filter_map(|item| {
            let url = str_field(item, "url");
            if url.is_empty() {
                return None;
            }
            Some(RawHit {
                url,
                title: str_field(item, "title"),
                snippet: clean_snippet(&str_field(item, "content")),
                score: item.get("score").and_then(Value::as_f64),
            })
        })
        .take(limit)
        .collect();
    Ok(hits)
}
