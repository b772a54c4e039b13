//! Shared HTTP plumbing for providers and the page fetcher.
//!
//! Provides a configured [`reqwest::Client`] with rotating browser-like
//! User-Agent strings, plus helpers that turn HTTP-level failures into
//! [`ProviderError`] values.

use crate::error::{ProviderError, SearchError};
use rand::seq::SliceRandom;
use std::time::Duration;

/// Realistic browser User-Agent strings, rotated per client.
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:133.0) Gecko/20100101 Firefox/133.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:133.0) Gecko/20100101 Firefox/133.0",
];

/// Maximum number of redirects followed for any request.
pub const MAX_REDIRECTS: usize = 10;

/// Longest error-body excerpt kept in a transport error message.
const ERROR_EXCERPT_CHARS: usize = 200;

/// Build a [`reqwest::Client`] with cookies, gzip/brotli, a redirect limit
/// and the given timeout. Uses `user_agent` if set, otherwise a random
/// entry from the built-in rotation list.
///
/// # Errors
///
/// Returns [`SearchError::Http`] if the client cannot be constructed.
pub fn build_client(
    user_agent: Option<&str>,
    timeout: Duration,
) -> Result<reqwest::Client, SearchError> {
    let ua = user_agent.unwrap_or_else(|| random_user_agent());

    reqwest::Client::builder()
        .cookie_store(true)
        .timeout(timeout)
        .user_agent(ua)
        .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
        .build()
        .map_err(|e| SearchError::Http(format!("failed to build HTTP client: {e}")))
}

/// Select a random User-Agent string from the rotation list.
pub fn random_user_agent() -> &'static str {
    let mut rng = rand::thread_rng();
    USER_AGENTS
        .choose(&mut rng)
        .copied()
        // SAFETY: USER_AGENTS is a non-empty const array, choose only returns None on empty slices
        .unwrap_or(USER_AGENTS[0])
}

/// Pass successful responses through; turn anything else into
/// [`ProviderError::Transport`] carrying the status code and a short body
/// excerpt.
pub async fn ensure_success(
    provider: &str,
    response: reqwest::Response,
) -> Result<reqwest::Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let excerpt: String = body.trim().chars().take(ERROR_EXCERPT_CHARS).collect();
    let message = if excerpt.is_empty() {
        format!("{provider}: HTTP {}", status.as_u16())
    } else {
        format!("{provider}: HTTP {}: {excerpt}", status.as_u16())
    };
    Err(ProviderError::Transport(message))
}

/// Read a response body, stopping once `max_bytes` have been received.
/// Returns the bytes and whether the body was cut off.
pub async fn read_capped(
    provider: &str,
    mut response: reqwest::Response,
    max_bytes: usize,
) -> Result<(Vec<u8>, bool), ProviderError> {
    let mut body = Vec::new();
    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(|e| ProviderError::from_reqwest(provider, &e))?
    {
        let room = max_bytes.saturating_sub(body.len());
        if chunk.len() >= room {
            body.extend_from_slice(&chunk[..room]);
            return Ok((body, true));
        }
        body.extend_from_slice(&chunk);
    }
    Ok((body, false))
}
