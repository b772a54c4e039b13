//! Relevance scoring for merged hits.
//!
//! Providers that report a relevance score keep it (clamped to `0.0..=1.0`).
//! Hits without one get a computed score that blends list position with
//! how well the hit matches the query:
//!
//! ```text
//! decay     = 1.0 / (1.0 + position_index * 0.1)
//! overlap   = (2 * title_matches + snippet_matches) / (3 * query_terms)
//! relevance = min(1.0, 0.8 * overlap + authority)
//! score     = decay * (0.5 + 0.5 * relevance)
//! ```
//!
//! `authority` is 0.2 for hosts under an `edu`, `gov` or `org` label and 0
//! otherwise. An off-topic first hit scores 0.5, well below a matching hit
//! a few places further down.

use std::collections::HashSet;

use url::Url;

use crate::types::RawHit;

const TITLE_WEIGHT: f64 = 2.0;
const SNIPPET_WEIGHT: f64 = 1.0;
const OVERLAP_WEIGHT: f64 = 0.8;
const AUTHORITY_BONUS: f64 = 0.2;
const AUTHORITY_LABELS: &[&str] = &["edu", "gov", "org"];

/// Lower-cased, de-duplicated query words.
#[derive(Debug, Clone, Default)]
pub struct QueryTerms(HashSet<String>);

impl QueryTerms {
    pub fn new(query: &str) -> Self {
        Self(words(query).collect())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn matches(&self, text: &str) -> usize {
        let seen: HashSet<String> = words(text).collect();
        self.0.iter().filter(|t| seen.contains(*t)).count()
    }
}

fn words(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
}

/// Position-decay factor for the 0-based `position`.
pub fn position_decay(position: usize) -> f64 {
    1.0 / (1.0 + position as f64 * 0.1)
}

/// Weighted share of query terms found in the title and snippet, in
/// `0.0..=1.0`. Title matches count double.
pub fn term_overlap(terms: &QueryTerms, title: &str, snippet: &str) -> f64 {
    if terms.is_empty() {
        return 0.0;
    }
    let weighted = TITLE_WEIGHT * terms.matches(title) as f64
        + SNIPPET_WEIGHT * terms.matches(snippet) as f64;
    weighted / ((TITLE_WEIGHT + SNIPPET_WEIGHT) * terms.len() as f64)
}

/// Bonus for institutional hosts such as `energy.gov` or `ofgem.gov.uk`.
/// Unparseable URLs get none.
pub fn authority_bonus(url: &str) -> f64 {
    let Ok(parsed) = Url::parse(url.trim()) else {
        return 0.0;
    };
    let Some(host) = parsed.host_str() else {
        return 0.0;
    };
    let labels: Vec<&str> = host.trim_end_matches('.').split('.').collect();
    // Only the public suffix part: the last label, or the one before a
    // two-letter country code.
    let suffix = match labels.as_slice() {
        [.., second, last] if last.len() == 2 => [*second, *last],
        [.., last] => [*last, ""],
        [] => return 0.0,
    };
    if suffix.iter().any(|label| AUTHORITY_LABELS.contains(label)) {
        AUTHORITY_BONUS
    } else {
        0.0
    }
}

/// Score for an unscored hit at `position` in its provider's list.
pub fn computed_score(terms: &QueryTerms, raw: &RawHit, position: usize) -> f64 {
    let relevance = (OVERLAP_WEIGHT * term_overlap(terms, &raw.title, &raw.snippet)
        + authority_bonus(&raw.url))
    .min(1.0);
    position_decay(position) * (0.5 + 0.5 * relevance)
}

/// Score for `raw` at `position` in its provider's list. Non-finite or
/// negative reported scores are treated as missing.
pub fn hit_score(terms: &QueryTerms, raw: &RawHit, position: usize) -> f64 {
    match raw.score {
        Some(score) if score.is_finite() && score >= 0.0 => score.min(1.0),
        _ => computed_score(terms, raw, position),
    }
}
