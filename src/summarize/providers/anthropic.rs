//! Anthropic Messages API adapter.
//!
//! The prompt goes in the top-level `system` field and the corpus as the
//! single user message. Response text is the concatenation of all `text`
//! content blocks.

use async_trait::async_trait;
use serde_json::{Value, json};
use sift_search::ProviderError;

use super::{TEMPERATURE, join_url, non_empty, post_json};
use crate::summarize::provider::SummarizeProvider;

pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
pub const API_VERSION: &str = "2023-06-01";

/// Messages API adapter.
pub struct AnthropicProvider {
    id: String,
    base_url: String,
    api_key: String,
    model: String,
    max_tokens: u32,
    client: reqwest::Client,
}

impl AnthropicProvider {
    pub fn new(
        id: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        client: reqwest::Client,
    ) -> Self {
        Self {
            id: id.into(),
            base_url: DEFAULT_BASE_URL.into(),
            api_key: api_key.into(),
            model: model.into(),
            max_tokens: 1_500,
            client,
        }
    }

    /// Set the base URL (useful for testing with mock servers).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    #[must_use]
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// Build an Anthropic Messages API request body.
pub fn build_messages_request(
    model: &str,
    prompt: &str,
    corpus_text: &str,
    max_tokens: u32,
) -> Value {
    json!({
        "model": model,
        "max_tokens": max_tokens,
        "system": prompt,
        "temperature": TEMPERATURE,
        "messages": [
            {"role": "user", "content": [{"type": "text", "text": corpus_text}]},
        ],
    })
}

/// Concatenated `text` blocks of a Messages API response.
pub fn parse_message(provider: &str, body: &Value) -> Result<String, ProviderError> {
    let blocks = body
        .get("content")
        .and_then(Value::as_array)
        .ok_or_else(|| ProviderError::MalformedResponse(format!("{provider}: missing `content`")))?;
    let text: String = blocks
        .iter()
        .filter(|b| b.get("type").and_then(Value::as_str) == Some("text"))
        .filter_map(|b| b.get("text").and_then(Value::as_str))
        .collect::<Vec<_>>()
        .join("");
    non_empty(provider, text)
}

#[async_trait]
impl SummarizeProvider for AnthropicProvider {
    fn id(&self) -> &str {
        &self.id
    }

    async fn summarize(&self, prompt: &str, corpus_text: &str) -> Result<String, ProviderError> {
        tracing::debug!(provider = %self.id, model = %self.model, "requesting message");
        let request = self
            .client
            .post(join_url(&self.base_url, "v1/messages"))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION);
        let body = build_messages_request(&self.model, prompt, corpus_text, self.max_tokens);
        let response = post_json(&self.id, request, &body).await?;
        parse_message(&self.id, &response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_prompt_is_top_level() {
        let body = build_messages_request("claude-3-5-haiku-latest", "instructions", "corpus", 1000);
        assert_eq!(body["system"], "instructions");
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"][0]["text"], "corpus");
        assert_eq!(body["max_tokens"], 1000);
    }

    #[test]
    fn joins_text_blocks_and_skips_others() {
        let body = json!({"content": [
            {"type": "thinking", "thinking": "hmm"},
            {"type": "text", "text": "## Overview\n"},
            {"type": "text", "text": "Body"}
        ]});
        assert_eq!(parse_message("anthropic", &body).expect("text"), "## Overview\nBody");
    }

    #[test]
    fn error_body_is_malformed() {
        let body = json!({"type": "error", "error": {"type": "overloaded_error"}});
        assert!(parse_message("anthropic", &body).is_err());
    }
}
