//! Ollama `/api/generate` adapter for locally served models. No key.

use async_trait::async_trait;
use serde_json::{Value, json};
use sift_search::ProviderError;

use super::{TEMPERATURE, join_url, non_empty, post_json};
use crate::summarize::provider::SummarizeProvider;

pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";

pub struct OllamaProvider {
    id: String,
    base_url: String,
    model: String,
    max_tokens: u32,
    client: reqwest::Client,
}

impl OllamaProvider {
    pub fn new(id: impl Into<String>, model: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            id: id.into(),
            base_url: DEFAULT_BASE_URL.into(),
            model: model.into(),
            max_tokens: 1_500,
            client,
        }
    }

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

pub fn build_request(model: &str, prompt: &str, corpus_text: &str, max_tokens: u32) -> Value {
    json!({
        "model": model,
        "system": prompt,
        "prompt": corpus_text,
        "stream": false,
        "options": {
            "num_predict": max_tokens,
            "temperature": TEMPERATURE,
        },
    })
}

pub fn parse_generate(provider: &str, body: &Value) -> Result<String, ProviderError> {
    if let Some(error) = body.get("error").and_then(Value::as_str) {
        return Err(ProviderError::MalformedResponse(format!("{provider}: {error}")));
    }
    let text = body
        .get("response")
        .and_then(Value::as_str)
        .ok_or_else(|| ProviderError::MalformedResponse(format!("{provider}: missing `response`")))?;
    non_empty(provider, text.to_string())
}

#[async_trait]
impl SummarizeProvider for OllamaProvider {
    fn id(&self) -> &str {
        &self.id
    }

    async fn summarize(&self, prompt: &str, corpus_text: &str) -> Result<String, ProviderError> {
        tracing::debug!(provider = %self.id, model = %self.model, "requesting local generation");
        let request = self.client.post(join_url(&self.base_url, "api/generate"));
        let body = build_request(&self.model, prompt, corpus_text, self.max_tokens);
        let response = post_json(&self.id, request, &body).await?;
        parse_generate(&self.id, &response)
    }
}
