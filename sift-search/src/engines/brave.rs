//! Brave Search API: independent index, good quality results.
//!
//! Brave has its own crawler and index, making it a valuable source of
//! results independent from Google and Bing.

use crate::engine::SearchProvider;
use crate::error::ProviderError;
use crate::types::RawHit;
use async_trait::async_trait;
use serde_json::Value;

use super::{clean_snippet, send_for_json, str_field};

pub const DEFAULT_ENDPOINT: &str = "https://api.search.brave.com/res/v1/web/search";

/// Brave accepts at most 20 results per request.
const MAX_COUNT: usize = 20;

/// Brave Web Search API adapter.
pub struct BraveProvider {
    id: String,
    endpoint: String,
    api_key: String,
    safe_search: bool,
    client: reqwest::Client,
}

impl BraveProvider {
    pub fn new(api_key: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            id: "brave".into(),
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
impl SearchProvider for BraveProvider {
    fn id(&self) -> &str {
        &self.id
    }

    async fn query(&self, text: &str, limit: usize) -> Result<Vec<RawHit>, ProviderError> {
        tracing::trace!(provider = %self.id, query = text, "Brave search");
        let count = limit.clamp(1, MAX_COUNT).to_string();
        let safesearch = if self.safe_search { "strict" } else { "off" };
        let request = self
            .client
            .get(&self.endpoint)
            .header("Accept", "application/json")
            .header("X-Subscription-Token", &self.api_key)
            .query(&[("q", text), ("count", count.as_str()), ("safesearch", safesearch)]);
        let body = send_for_json(&self.id, request).await?;
        parse_brave_response(&self.id, &body, limit)
    }
}

/// Parse a Brave body. Brave omits the `web` block when nothing matched, so
/// a search-typed body without it is an empty result set.
pub(crate) fn parse_brave_response(
    provider: &str,
    body: &Value,
    limit: usize,
) -> Result<Vec<RawHit>, ProviderError> {
    let Some(web) = body.get("web") else {
        if body.get("type").and_then(Value::as_str) == Some("search") {
            return Ok(Vec::new());
        }
        return Err(ProviderError::MalformedResponse(format!(
            "{provider}: missing `web` block"
        )));
    };
    let items = web
        .get("results")
        .and_then(Value::as_array)
        .ok_or_else(|| {
            ProviderError::MalformedResponse(format!("{provider}: missing `web.results` array"))
        })?;

    let hits = items
        .iter()
        .filter_map(|item| {
            let url = str_field(item, "url");
            if url.is_empty() {
                return None;
            }
            Some(RawHit {
                url,
                title: clean_snippet(&str_field(item, "title")),
                snippet: clean_snippet(&str_field(item, "description")),
                score: None,
            })
        })
        .take(limit)
        .collect();
    Ok(hits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_web_results_and_strips_markup() {
        let body = json!({"type": "search", "web": {"results": [
            {"title": "Wind <strong>power</strong>", "url": "https://w.org", "description": "Offshore <strong>wind</strong> doubled"}
        ]}});
        let hits = parse_brave_response("brave", &body, 10).expect("parse");
        assert_eq!(hits[0].title, "Wind power");
        assert_eq!(hits[0].snippet, "Offshore wind doubled");
    }

    #[test]
    fn search_without_web_block_is_empty() {
        let body = json!({"type": "search", "query": {"original": "x"}});
        assert!(parse_brave_response("brave", &body, 10).expect("parse").is_empty());
    }

    #[test]
    fn error_body_is_malformed() {
        let body = json!({"type": "ErrorResponse", "error": {"code": "SUBSCRIPTION_TOKEN_INVALID"}});
        let err = parse_brave_response("brave", &body, 10).unwrap_err();
        assert_eq!(err.code(), "PROVIDER_MALFORMED_RESPONSE");
    }
}
