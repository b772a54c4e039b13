//! OpenAI-compatible Chat Completions adapter.
//!
//! Works with any service exposing `POST {base_url}/chat/completions` with
//! bearer authentication: OpenAI, Perplexity, Together, Groq and most
//! self-hosted gateways.

use async_trait::async_trait;
use serde_json::{Value, json};
use sift_search::ProviderError;

use super::{TEMPERATURE, join_url, non_empty, post_json};
use crate::summarize::provider::SummarizeProvider;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Chat Completions adapter.
pub struct OpenAiCompatibleProvider {
    id: String,
    base_url: String,
    api_key: Option<String>,
    model: String,
    max_tokens: u32,
    client: reqwest::Client,
}

impl OpenAiCompatibleProvider {
    /// Create an adapter for `model` at the OpenAI base URL.
    pub fn new(
        id: impl Into<String>,
        api_key: Option<String>,
        model: impl Into<String>,
        client: reqwest::Client,
    ) -> Self {
        Self {
            id: id.into(),
            base_url: DEFAULT_BASE_URL.into(),
            api_key,
            model: model.into(),
            max_tokens: 1_500,
            client,
        }
    }

    /// Set the base URL (another compatible service, or a mock server).
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

/// Build the Chat Completions request body.
pub fn build_request(model: &str, prompt: &str, corpus_text: &str, max_tokens: u32) -> Value {
    json!({
        "model": model,
        "messages": [
            {"role": "system", "content": prompt},
            {"role": "user", "content": corpus_text},
        ],
        "max_tokens": max_tokens,
        "temperature": TEMPERATURE,
        "stream": false,
    })
}

/// Text of the first choice.
pub fn parse_completion(provider: &str, body: &Value) -> Result<String, ProviderError> {
    let content = body
        .pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .ok_or_else(|| {
            ProviderError::MalformedResponse(format!(
                "{provider}: missing choices[0].message.content"
            ))
        })?;
    non_empty(provider, content.to_string())
}

#[async_trait]
impl SummarizeProvider for OpenAiCompatibleProvider {
    fn id(&self) -> &str {
        &self.id
    }

    async fn summarize(&self, prompt: &str, corpus_text: &str) -> Result<String, ProviderError> {
        tracing::debug!(provider = %self.id, model = %self.model, "requesting chat completion");
        let mut request = self
            .client
            .post(join_url(&self.base_url, "chat/completions"));
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }
        let body = build_request(&self.model, prompt, corpus_text, self.max_tokens);
        let response = post_json(&self.id, request, &body).await?;
        parse_completion(&self.id, &response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_has_system_and_user_messages() {
        let body = build_request("gpt-4o-mini", "instructions", "[1] source", 800);
        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][0]["content"], "instructions");
        assert_eq!(body["messages"][1]["content"], "[1] source");
        assert_eq!(body["max_tokens"], 800);
        assert_eq!(body["stream"], false);
    }

    #[test]
    fn parses_first_choice() {
        let body = json!({"choices": [{"message": {"role": "assistant", "content": "## Overview\nText"}}]});
        assert_eq!(parse_completion("openai", &body).expect("text"), "## Overview\nText");
    }

    #[test]
    fn missing_or_empty_content_is_malformed() {
        let err = parse_completion("openai", &json!({"choices": []})).unwrap_err();
        assert_eq!(err.code(), "PROVIDER_MALFORMED_RESPONSE");
        let body = json!({"choices": [{"message": {"content": ""}}]});
        assert!(parse_completion("openai", &body).is_err());
    }
}
