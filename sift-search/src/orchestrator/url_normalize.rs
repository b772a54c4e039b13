//! URL normalisation for hit deduplication.
//!
//! Two hits are the same page when their normalised URLs are equal. The
//! normalised form ignores scheme/host case, default ports, fragments,
//! trailing slashes, query-parameter order and tracking parameters. Path
//! case is preserved.

use url::form_urlencoded;
use url::Url;

/// Query parameters dropped during normalisation (compared lowercase).
const TRACKING_PARAMS: &[&str] = &[
    "fbclid", "gclid", "dclid", "msclkid", "yclid", "igshid", "mc_cid", "mc_eid", "_ga", "_gl",
    "ref", "ref_src", "si", "feature", "spm",
];

/// Any parameter starting with one of these prefixes is tracking.
const TRACKING_PREFIXES: &[&str] = &["utm_", "pk_", "hsa_"];

fn is_tracking_param(key: &str) -> bool {
    let key = key.to_ascii_lowercase();
    TRACKING_PARAMS.contains(&key.as_str()) || TRACKING_PREFIXES.iter().any(|p| key.starts_with(p))
}

/// Normalise a URL into its deduplication key.
///
/// Unparseable input is returned trimmed but otherwise unchanged, so it
/// still deduplicates against identical strings.
///
/// # Examples
///
/// ```
/// use sift_search::orchestrator::url_normalize::normalize_url;
///
/// let a = normalize_url("https://Example.COM/path/?b=2&a=1&utm_source=x#section");
/// let b = normalize_url("https://example.com/path?a=1&b=2");
/// assert_eq!(a, b);
/// ```
pub fn normalize_url(raw: &str) -> String {
    let raw = raw.trim();
    let Ok(mut parsed) = Url::parse(raw) else {
        return raw.to_string();
    };

    parsed.set_fragment(None);
    if matches!(
        (parsed.scheme(), parsed.port()),
        ("http", Some(80)) | ("https", Some(443))
    ) {
        let _ = parsed.set_port(None);
    }

    let mut params: Vec<(String, String)> = parsed
        .query_pairs()
        .filter(|(key, _)| !is_tracking_param(key))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    params.sort();
    if params.is_empty() {
        parsed.set_query(None);
    } else {
        let query = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(params.iter())
            .finish();
        parsed.set_query(Some(&query));
    }

    let trimmed = parsed.path().trim_end_matches('/').to_string();
    if trimmed.is_empty() {
        parsed.set_path("/");
    } else if trimmed.len() != parsed.path().len() {
        parsed.set_path(&trimmed);
    }

    parsed.to_string()
}
