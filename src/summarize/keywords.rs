//! Frequency-ranked keyword extraction.

use std::cmp::Reverse;
use std::collections::HashMap;

use super::text::{content_tokens, query_terms};

/// Rank corpus tokens by (appears in query, frequency, token) and take at
/// most `target`. Tokens come from the corpus only, so an empty corpus
/// yields no keywords. Fewer than `floor` is logged, never padded.
pub fn extract_keywords<'a>(
    query: &str,
    texts: impl IntoIterator<Item = &'a str>,
    target: usize,
    floor: usize,
) -> Vec<String> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for text in texts {
        for token in content_tokens(text) {
            *counts.entry(token).or_default() += 1;
        }
    }

    let boosted = query_terms(query);
    let mut ranked: Vec<(String, usize)> = counts.into_iter().collect();
    ranked.sort_by(|(a, a_count), (b, b_count)| {
        (Reverse(boosted.contains(a)), Reverse(*a_count), a)
            .cmp(&(Reverse(boosted.contains(b)), Reverse(*b_count), b))
    });
    ranked.truncate(target);

    if ranked.len() < floor {
        tracing::debug!(
            found = ranked.len(),
            floor,
            "corpus too small for the keyword floor"
        );
    }
    ranked.into_iter().map(|(token, _)| token).collect()
}
