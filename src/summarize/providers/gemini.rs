//! Google Gemini `generateContent` adapter.

use async_trait::async_trait;
use serde_json::{Value, json};
use sift_search::ProviderError;

use super::{TEMPERATURE, join_url, non_empty, post_json};
use crate::summarize::provider::SummarizeProvider;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

pub struct GeminiProvider {
    id: String,
    base_url: String,
    api_key: String,
    model: String,
    max_tokens: u32,
    client: reqwest::Client,
}

impl GeminiProvider {
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

pub fn build_request(prompt: &str, corpus_text: &str, max_tokens: u32) -> Value {
    json!({
        "systemInstruction": {"parts": [{"text": prompt}]},
        "contents": [{"role": "user", "parts": [{"text": corpus_text}]}],
        "generationConfig": {
            "maxOutputTokens": max_tokens,
            "temperature": TEMPERATURE,
        },
    })
}

/// Text parts of the first candidate. A prompt blocked by safety filters
/// has no candidates and is reported as malformed.
pub fn parse_candidates(provider: &str, body: &Value) -> Result<String, ProviderError> {
    let parts = body
        .pointer("/candidates/0/content/parts")
        .and_then(Value::as_array)
        .ok_or_else(|| {
            let reason = body
                .pointer("/promptFeedback/blockReason")
                .and_then(Value::as_str)
                .unwrap_or("missing candidates[0].content.parts");
            ProviderError::MalformedResponse(format!("{provider}: {reason}"))
        })?;
    let text = parts
        .iter()
        .filter_map(|p| p.get("text").and_then(Value::as_str))
        .collect::<Vec<_>>()
        .join("");
    non_empty(provider, text)
}

#[async_trait]
impl SummarizeProvider for GeminiProvider {
    fn id(&self) -> &str {
        &self.id
    }

    async fn summarize(&self, prompt: &str, corpus_text: &str) -> Result<String, ProviderError> {
        tracing::debug!(provider = %self.id, model = %self.model, "requesting generateContent");
        let url = join_url(
            &self.base_url,
            &format!("models/{}:generateContent", self.model),
        );
        let request = self
            .client
            .post(url)
            .header("x-goog-api-key", &self.api_key);
        let body = build_request(prompt, corpus_text, self.max_tokens);
        let response = post_json(&self.id, request, &body).await?;
        parse_candidates(&self.id, &response)
    }
}
