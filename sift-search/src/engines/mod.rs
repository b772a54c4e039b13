//! Search provider implementations.
//!
//! Each module provides a struct implementing
//! [`crate::engine::SearchProvider`]. Tavily, Exa, SerpAPI and Brave speak
//! JSON over HTTP and need an API key; DuckDuckGo scrapes the HTML-only
//! results page and needs nothing.

pub mod brave;
pub mod duckduckgo;
pub mod exa;
pub mod serpapi;
pub mod tavily;

pub use brave::BraveProvider;
pub use duckduckgo::DuckDuckGoProvider;
pub use exa::ExaProvider;
pub use serpapi::SerpApiProvider;
pub use tavily::TavilyProvider;

use crate::error::ProviderError;
use crate::http;
use serde_json::Value;

/// Send `request`, require a success status and parse the body as JSON.
pub(crate) async fn send_for_json(
    provider: &str,
    request: reqwest::RequestBuilder,
) -> Result<Value, ProviderError> {
    let response = request
        .send()
        .await
        .map_err(|e| ProviderError::from_reqwest(provider, &e))?;
    let response = http::ensure_success(provider, response).await?;
    let body = response
        .text()
        .await
        .map_err(|e| ProviderError::from_reqwest(provider, &e))?;
    tracing::trace!(provider, bytes = body.len(), "provider response received");
    parse_json(provider, &body)
}

pub(crate) fn parse_json(provider: &str, body: &str) -> Result<Value, ProviderError> {
    if body.trim().is_empty() {
        return Err(ProviderError::MalformedResponse(format!(
            "{provider}: empty body"
        )));
    }
    serde_json::from_str(body)
        .map_err(|e| ProviderError::MalformedResponse(format!("{provider}: invalid JSON: {e}")))
}

/// The array at `key`, or a malformed-response error naming it.
pub(crate) fn required_array<'a>(
    provider: &str,
    value: &'a Value,
    key: &str,
) -> Result<&'a Vec<Value>, ProviderError> {
    value
        .get(key)
        .and_then(Value::as_array)
        .ok_or_else(|| ProviderError::MalformedResponse(format!("{provider}: missing `{key}` array")))
}

pub(crate) fn str_field(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Strip inline markup (`<strong>`, `<b>`...) and the common entities some
/// APIs leave in snippets, then collapse whitespace.
pub(crate) fn clean_snippet(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut in_tag = false;
    for ch in raw.chars() {
        match ch {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    let decoded = out
        .replace("&amp;", "&")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&nbsp;", " ");
    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}
