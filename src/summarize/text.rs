//! Tokenizing and sentence splitting for the heuristic summarizer.

use std::collections::HashSet;

/// Sentences shorter or longer than this (in chars) are not selectable.
pub const MIN_SENTENCE_CHARS: usize = 30;
pub const MAX_SENTENCE_CHARS: usize = 300;

/// Common English function words plus web boilerplate.
const STOP_WORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "also", "am", "an", "and", "any",
    "are", "around", "as", "at", "be", "because", "been", "before", "being", "below", "between",
    "both", "but", "by", "can", "could", "did", "do", "does", "doing", "down", "during", "each",
    "even", "few", "for", "from", "further", "get", "got", "had", "has", "have", "having", "he",
    "her", "here", "hers", "herself", "him", "himself", "his", "how", "however", "i", "if", "in",
    "into", "is", "it", "its", "itself", "just", "last", "like", "made", "make", "many", "may",
    "me", "might", "more", "most", "much", "must", "my", "myself", "new", "no", "nor", "not",
    "now", "of", "off", "on", "once", "one", "only", "or", "other", "our", "ours", "ourselves",
    "out", "over", "own", "per", "said", "same", "says", "see", "she", "should", "since", "so",
    "some", "still", "such", "than", "that", "the", "their", "theirs", "them", "themselves",
    "then", "there", "these", "they", "this", "those", "through", "to", "too", "two", "under",
    "until", "up", "upon", "us", "use", "used", "using", "very", "via", "was", "way", "we",
    "well", "were", "what", "when", "where", "whether", "which", "while", "who", "whom", "why",
    "will", "with", "within", "without", "would", "year", "years", "yet", "you", "your", "yours",
    "yourself", "yourselves", "according", "across", "already", "another", "back", "become",
    "cookie", "cookies", "click", "copyright", "every", "first", "http", "https", "www",
    "com", "html", "read", "privacy", "subscribe", "newsletter", "today", "want", "able",
];

pub fn is_stop_word(token: &str) -> bool {
    STOP_WORDS.contains(&token)
}

/// Lowercased alphanumeric tokens, in order.
pub fn tokens(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Tokens worth counting: not stop words, not numeric, at least 3 chars.
pub fn content_tokens(text: &str) -> Vec<String> {
    tokens(text)
        .into_iter()
        .filter(|t| is_content_token(t))
        .collect()
}

pub fn is_content_token(token: &str) -> bool {
    token.chars().count() >= 3
        && !token.chars().all(|c| c.is_ascii_digit())
        && !is_stop_word(token)
}

/// Distinct content tokens of the query.
pub fn query_terms(query: &str) -> HashSet<String> {
    content_tokens(query).into_iter().collect()
}

/// Split text into trimmed sentences. Boundaries are `.`, `!` or `?`
/// followed by whitespace, and line breaks. Sentences outside
/// [`MIN_SENTENCE_CHARS`]..=[`MAX_SENTENCE_CHARS`] are dropped.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    for line in text.lines() {
        let mut current = String::new();
        let mut chars = line.chars().peekable();
        while let Some(c) = chars.next() {
            current.push(c);
            let at_boundary = matches!(c, '.' | '!' | '?')
                && chars.peek().is_none_or(|next| next.is_whitespace());
            if at_boundary {
                push_sentence(&mut sentences, &current);
                current.clear();
            }
        }
        push_sentence(&mut sentences, &current);
    }
    sentences
}

fn push_sentence(out: &mut Vec<String>, raw: &str) {
    let sentence = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    let len = sentence.chars().count();
    if (MIN_SENTENCE_CHARS..=MAX_SENTENCE_CHARS).contains(&len) {
        out.push(sentence);
    }
}

/// Lowercased tokens joined by single spaces, for duplicate detection.
pub fn normalized(text: &str) -> String {
    tokens(text).join(" ")
}

/// Jaccard similarity of the token sets of two texts.
pub fn jaccard(a: &str, b: &str) -> f64 {
    let a: HashSet<String> = tokens(a).into_iter().collect();
    let b: HashSet<String> = tokens(b).into_iter().collect();
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    let shared = a.intersection(&b).count();
    shared as f64 / a.union(&b).count() as f64
}

/// `1 / (1 + i * 0.1)`.
pub fn rank_decay(index: usize) -> f64 {
    1.0 / (1.0 + index as f64 * 0.1)
}
