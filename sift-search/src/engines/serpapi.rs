//! SerpAPI: Google organic results through a hosted scraping API.

use crate::engine::SearchProvider;
use crate::error::ProviderError;
use crate::types::RawHit;
use async_trait::async_trait;
use serde_json::Value;

use super::{clean_snippet, send_for_json, str_field};

pub const DEFAULT_ENDPOINT: &str = "https://serpapi.com/search.json";

/// SerpAPI caps `num` for the Google engine.
const MAX_NUM: usize = 10;

/// SerpAPI `GET /search.json?engine=google` adapter.
pub struct SerpApiProvider {
    id: String,
    endpoint: String,
    api_key: String,
    safe_search: bool,
    client: reqwest::Client,
}

impl SerpApiProvider {
    pub fn new(api_key: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            id: "serpapi".into(),
            endpoint: DEFAULT_ENDPOINT.into(),
            api_key: api_key.into(),
            safe_search: true,
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

    #[must_use]
    pub fn with_safe_search(mut self, safe_search: bool) -> Self {
        self.safe_search = safe_search;
        self
    }
}

#[async_trait]
impl SearchProvider for SerpApiProvider {
    fn id(&self) -> &str {
        &self.id
    }

    async fn query(&self, text: &str, limit: usize) -> Result<Vec<RawHit>, ProviderError> {
        tracing::trace!(provider = %self.id, query = text, "SerpAPI search");
        let num = limit.clamp(1, MAX_NUM).to_string();
        let mut params = vec![
            ("engine", "google"),
            ("q", text),
            ("num", num.as_str()),
            ("api_key", self.api_key.as_str()),
        ];
        if self.safe_search {
            params.push(("safe", "active"));
        }
        let request = self.client.get(&self.endpoint).query(&params);
        let body = send_for_json(&self.id, request).await?;
        parse_serpapi_response(&self.id, &body, limit)
    }
}

/// Parse a SerpAPI body. A body reporting that Google had no results is an
/// empty result set; any other body without `organic_results` is malformed.
pub(crate) fn parse_serpapi_response(
    provider: &str,
    body: &Value,
    limit: usize,
) -> Result<Vec<RawHit>, ProviderError> {
    let Some(items) = body.get("organic_results").and_then(Value::as_array) else {
        let error = str_field(body, "error");
        if error.contains("hasn't returned any results") {
            return Ok(Vec::new());
        }
        let detail = if error.is_empty() {
            "missing `organic_results` array".to_string()
        } else {
            error
        };
        return Err(ProviderError::MalformedResponse(format!(
            "{provider}: {detail}"
        )));
    };

    let hits = items
        .iter()
        .filter_map(|item| {
            let url = str_field(item, "link");
            if url.is_empty() {
                return None;
            }
            Some(RawHit {
                url,
                title: str_field(item, "title"),
                snippet: clean_snippet(&str_field(item, "snippet")),
                score: None,
            })
        })
        .take(limit)
        .collect();
    Ok(hits)
}
