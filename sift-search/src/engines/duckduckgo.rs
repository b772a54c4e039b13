//! DuckDuckGo HTML search: keyless, scraper-friendly.
//!
//! Uses the HTML-only version at `https://html.duckduckgo.com/html/`, which
//! requires no JavaScript and no API key. This keeps the pipeline useful
//! when no keyed provider is configured.

use crate::engine::SearchProvider;
use crate::error::ProviderError;
use crate::types::RawHit;
use async_trait::async_trait;
use scraper::{Html, Selector};
use url::Url;

use super::clean_snippet;

pub const DEFAULT_ENDPOINT: &str = "https://html.duckduckgo.com/html/";

/// DuckDuckGo HTML results page scraper.
pub struct DuckDuckGoProvider {
    id: String,
    endpoint: String,
    safe_search: bool,
    client: reqwest::Client,
}

impl DuckDuckGoProvider {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            id: "duckduckgo".into(),
            endpoint: DEFAULT_ENDPOINT.into(),
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

/// Extract the target URL from DuckDuckGo's redirect wrapper.
///
/// DDG wraps URLs like `//duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.com&rut=...`;
/// the `uddg` parameter holds the destination.
fn unwrap_redirect(href: &str) -> Option<String> {
    let full = if href.starts_with("//") {
        format!("https:{href}")
    } else {
        href.to_string()
    };
    let parsed = Url::parse(&full).ok()?;

    let is_redirect = parsed
        .host_str()
        .is_some_and(|h| h.ends_with("duckduckgo.com"))
        && parsed.path().starts_with("/l/");
    if is_redirect {
        parsed
            .query_pairs()
            .find(|(key, _)| key == "uddg")
            .map(|(_, value)| value.into_owned())
    } else {
        Some(full)
    }
}

#[async_trait]
impl SearchProvider for DuckDuckGoProvider {
    fn id(&self) -> &str {
        &self.id
    }

    async fn query(&self, text: &str, limit: usize) -> Result<Vec<RawHit>, ProviderError> {
        tracing::trace!(provider = %self.id, query = text, "DuckDuckGo search");

        let mut params = vec![("q", text)];
        if self.safe_search {
            params.push(("kp", "1"));
        }

        let response = self
            .client
            .post(&self.endpoint)
            .form(&params)
            .header("Accept-Language", "en-US,en;q=0.9")
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(&self.id, &e))?;
        let response = crate::http::ensure_success(&self.id, response).await?;
        let html = response
            .text()
            .await
            .map_err(|e| ProviderError::from_reqwest(&self.id, &e))?;

        tracing::trace!(provider = %self.id, bytes = html.len(), "DuckDuckGo response received");
        parse_duckduckgo_html(&self.id, &html, limit)
    }
}

/// Parse a DuckDuckGo HTML results page. Ads are skipped. A bot-challenge
/// page is reported as a transport failure so the registry counts it.
pub(crate) fn parse_duckduckgo_html(
    provider: &str,
    html: &str,
    limit: usize,
) -> Result<Vec<RawHit>, ProviderError> {
    let selector = |css: &str| {
        Selector::parse(css).map_err(|e| {
            ProviderError::MalformedResponse(format!("{provider}: invalid selector {css}: {e:?}"))
        })
    };
    let result_sel = selector(
        ".result.results_links.results_links_deep:not(.result--ad), .web-result:not(.result--ad)",
    )?;
    let title_sel = selector(".result__a")?;
    let snippet_sel = selector(".result__snippet")?;
    let challenge_sel = selector(".anomaly-modal, #challenge-form")?;

    let document = Html::parse_document(html);
    let mut hits = Vec::new();

    for element in document.select(&result_sel) {
        let Some(title_el) = element.select(&title_sel).next() else {
            continue;
        };
        let title = clean_snippet(&title_el.text().collect::<String>());
        if title.is_empty() {
            continue;
        }
        let Some(url) = title_el.value().attr("href").and_then(unwrap_redirect) else {
            continue;
        };
        let snippet = element
            .select(&snippet_sel)
            .next()
            .map(|el| clean_snippet(&el.text().collect::<String>()))
            .unwrap_or_default();

        hits.push(RawHit {
            url,
            title,
            snippet,
            score: None,
        });
        if hits.len() >= limit {
            break;
        }
    }

    if hits.is_empty() && document.select(&challenge_sel).next().is_some() {
        return Err(ProviderError::Transport(format!(
            "{provider}: bot challenge page returned"
        )));
    }

    tracing::debug!(provider, count = hits.len(), "DuckDuckGo results parsed");
    Ok(hits)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MOCK_DDG_HTML: &str = r#"<!DOCTYPE html>
<html>
<body>
<div class="result results_links results_links_deep web-result result--ad">
    <a class="result__a" href="https://ads.example.com/">Solar panels cheap (Ad)</a>
    <div class="result__snippet">Buy now</div>
</div>
<div class="result results_links results_links_deep web-result">
    <a class="result__a" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fwww.iea.org%2Freports%2Frenewables-2024&amp;rut=abc123">
        Renewables 2024 - Analysis
    </a>
    <div class="result__snippet">
        Global renewable capacity additions rose by almost <b>50%</b> in 2023.
    </div>
</div>
<div class="result results_links results_links_deep web-result">
    <a class="result__a" href="https://www.irena.org/Energy-Transition">
        Energy Transition
    </a>
    <div class="result__snippet">
        IRENA tracks the global energy transition.
    </div>
</div>
<div class="result results_links results_links_deep web-result">
    <a class="result__a" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fen.wikipedia.org%2Fwiki%2FRenewable_energy&amp;rut=def456">
        Renewable energy - Wikipedia
    </a>
    <div class="result__snippet">
        Renewable energy is energy from renewable resources.
    </div>
</div>
</body>
</html>"#;

    #[test]
    fn unwrap_redirect_decodes_uddg() {
        let href = "//duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.com%2Fpage&rut=abc";
        assert_eq!(
            unwrap_redirect(href),
            Some("https://example.com/page".to_string())
        );
    }

    #[test]
    fn unwrap_redirect_keeps_direct_links() {
        assert_eq!(
            unwrap_redirect("https://example.com/direct"),
            Some("https://example.com/direct".to_string())
        );
        assert!(unwrap_redirect("not-a-url").is_none());
    }

    #[test]
    fn parses_organic_results_and_skips_ads() {
        let hits = parse_duckduckgo_html("duckduckgo", MOCK_DDG_HTML, 10).expect("should parse");
        assert_eq!(hits.len(), 3);
        assert_eq!(hits[0].title, "Renewables 2024 - Analysis");
        assert_eq!(hits[0].url, "https://www.iea.org/reports/renewables-2024");
        assert!(hits[0].snippet.contains("almost 50% in 2023"));
        assert_eq!(hits[1].url, "https://www.irena.org/Energy-Transition");
        assert!(hits.iter().all(|h| !h.title.contains("(Ad)")));
        assert!(hits.iter().all(|h| !h.url.contains("duckduckgo.com/l/")));
    }

    #[test]
    fn respects_limit() {
        let hits = parse_duckduckgo_html("duckduckgo", MOCK_DDG_HTML, 2).expect("should parse");
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn empty_page_is_empty_result() {
        let hits = parse_duckduckgo_html("duckduckgo", "<html><body></body></html>", 10)
            .expect("should parse");
        assert!(hits.is_empty());
    }

    #[test]
    fn challenge_page_is_transport_error() {
        let html = r#"<html><body><div class="anomaly-modal">Unfortunately, bots use DuckDuckGo too.</div></body></html>"#;
        let err = parse_duckduckgo_html("duckduckgo", html, 10).unwrap_err();
        assert_eq!(err.code(), "PROVIDER_TRANSPORT");
    }
}
