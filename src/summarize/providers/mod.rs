//! HTTP adapters for AI summarization backends.
//!
//! - [`OpenAiCompatibleProvider`]: `POST {base}/chat/completions` (OpenAI,
//!   Perplexity, Together, Groq and other compatible services)
//! - [`AnthropicProvider`]: `POST {base}/v1/messages`
//! - [`GeminiProvider`]: `POST {base}/models/{model}:generateContent`
//! - [`OllamaProvider`]: `POST {base}/api/generate`, no key

pub mod anthropic;
pub mod gemini;
pub mod ollama;
pub mod openai;

pub use anthropic::AnthropicProvider;
pub use gemini::GeminiProvider;
pub use ollama::OllamaProvider;
pub use openai::OpenAiCompatibleProvider;

use serde_json::Value;
use sift_search::ProviderError;

/// Sampling temperature sent to every backend.
pub(crate) const TEMPERATURE: f64 = 0.3;

/// Send a JSON request, require a success status and parse the JSON body.
pub(crate) async fn post_json(
    provider: &str,
    request: reqwest::RequestBuilder,
    body: &Value,
) -> Result<Value, ProviderError> {
    let response = request
        .json(body)
        .send()
        .await
        .map_err(|e| ProviderError::from_reqwest(provider, &e))?;
    let response = sift_search::http::ensure_success(provider, response).await?;
    let text = response
        .text()
        .await
        .map_err(|e| ProviderError::from_reqwest(provider, &e))?;
    tracing::trace!(provider, bytes = text.len(), "AI response received");
    serde_json::from_str(&text)
        .map_err(|e| ProviderError::MalformedResponse(format!("{provider}: invalid JSON: {e}")))
}

/// Join base URL and path with exactly one slash.
pub(crate) fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Non-empty text or a malformed-response error.
pub(crate) fn non_empty(provider: &str, text: String) -> Result<String, ProviderError> {
    if text.trim().is_empty() {
        Err(ProviderError::MalformedResponse(format!(
            "{provider}: response contained no text"
        )))
    } else {
        Ok(text)
    }
}
