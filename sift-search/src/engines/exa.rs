//! Exa search API: neural search returning summaries and highlights.

use crate::engine::SearchProvider;
use crate::error::ProviderError;
use crate::types::RawHit;
use async_trait::async_trait;
use serde_json::{json, Value};

use super::{clean_snippet, required_array, send_for_json, str_field};

pub const DEFAULT_ENDPOINT: &str = "https://api.exa.ai/search";

/// Longest page-text excerpt used as a snippet when Exa sends no summary.
const TEXT_SNIPPET_CHARS: usize = 300;

/// Exa `POST /search` adapter.
pub struct ExaProvider {
    id: String,
    endpoint: String,
    api_key: String,
    client: reqwest::Client,
}

impl ExaProvider {
    pub fn new(api_key: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            id: "exa".into(),
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
impl SearchProvider for ExaProvider {
    fn id(&self) -> &str {
        &self.id
    }

    async fn query(&self, text: &str, limit: usize) -> Result<Vec<RawHit>, ProviderError> {
        tracing::trace!(provider = %self.id, query = text, "Exa search");
        let request = self
            .client
            .post(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .json(&json!({
                "query": text,
                "type": "auto",
                "numResults": limit,
                "contents": {
                    "summary": true,
                    "highlights": true,
                    "text": { "maxCharacters": 1000 },
                },
            }));
        let body = send_for_json(&self.id, request).await?;
        parse_exa_response(&self.id, &body, limit)
    }
}

/// Snippet preference: summary, first highlight, start of page text.
fn exa_snippet(item: &Value) -> String {
    let summary = str_field(item, "summary");
    if !summary.trim().is_empty() {
        return clean_snippet(&summary);
    }
    let highlight = item
        .get("highlights")
        .and_then(Value::as_array)
        .and_then(|h| h.first())
        .and_then(Value::as_str)
        .unwrap_or_default();
    if !highlight.trim().is_empty() {
        return clean_snippet(highlight);
    }
    let text = clean_snippet(&str_field(item, "text"));
    text.chars().take(TEXT_SNIPPET_CHARS).collect()
}

pub(crate) fn parse_exa_response(
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
                snippet: exa_snippet(item),
                score: item.get("score").and_then(Value::as_f64),
            })
        })
        .take(limit)
        .collect();
    Ok(hits)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snippet_prefers_summary_then_highlight_then_text() {
        let body = json!({"results": [
            {"url": "https://a.com", "title": "A", "summary": "Summary A", "highlights": ["hl"], "text": "text"},
            {"url": "https://b.com", "title": "B", "highlights": ["Highlight B"], "text": "text"},
            {"url": "https://c.com", "title": "C", "text": "Plain page text"}
        ]});
        let hits = parse_exa_response("exa", &body, 10).expect("parse");
        let snippets: Vec<&str> = hits.iter().map(|h| h.snippet.as_str()).collect();
        assert_eq!(snippets, ["Summary A", "Highlight B", "Plain page text"]);
    }

    #[test]
    fn long_text_snippet_is_capped() {
        let body = json!({"results": [{"url": "https://a.com", "text": "word ".repeat(200)}]});
        let hits = parse_exa_response("exa", &body, 10).expect("parse");
        assert!(hits[0].snippet.chars().count() <= TEXT_SNIPPET_CHARS);
    }

    #[test]
    fn missing_results_is_malformed() {
        let err = parse_exa_response("exa", &json!({"error": "x"}), 5).unwrap_err();
        assert_eq!(err.code(), "PROVIDER_MALFORMED_RESPONSE");
    }
}
