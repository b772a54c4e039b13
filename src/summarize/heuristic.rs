//! Deterministic extractive summarization.
//!
//! Sentences are scored by query-term overlap, document rank and position
//! within the document, then deduplicated and distributed across the four
//! narrative sections. No randomness and no external calls: identical input
//! gives identical output.

use std::collections::HashSet;

use crate::corpus::CorpusEntry;
use crate::report::Narrative;

use super::questions::infer_subject;
use super::text::{jaccard, normalized, query_terms, rank_decay, split_sentences, tokens};

/// Sentences per section.
const OVERVIEW_SENTENCES: usize = 2;
const KEY_FINDING_SENTENCES: usize = 5;
const ANALYSIS_SENTENCES: usize = 4;
const IMPLICATION_SENTENCES: usize = 2;

/// Token-set similarity at or above which two sentences are duplicates.
const NEAR_DUPLICATE_JACCARD: f64 = 0.8;

/// Added to sentences that look like they report a result.
const FINDING_BONUS: f64 = 0.25;

const FINDING_WORDS: &[&str] = &[
    "study", "studies", "found", "finds", "research", "report", "reported", "survey", "data",
    "analysis", "increase", "increased", "decrease", "decreased", "growth", "grew", "rose",
    "fell", "record", "percent", "million", "billion",
];

const FORWARD_WORDS: &[&str] = &[
    "will", "future", "expected", "expects", "could", "should", "likely", "projected",
    "projection", "forecast", "forecasts", "outlook", "next", "upcoming", "plan", "plans",
    "potential", "implications", "must",
];

/// A candidate sentence with its provenance.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredSentence {
    pub text: String,
    /// Rank of the corpus entry it came from.
    pub doc_rank: usize,
    /// Position within that entry's text.
    pub index: usize,
    pub score: f64,
}

fn has_finding_indicator(sentence: &str) -> bool {
    sentence.chars().any(|c| c.is_ascii_digit() || c == '%')
        || tokens(sentence)
            .iter()
            .any(|t| FINDING_WORDS.contains(&t.as_str()))
}

fn is_forward_looking(sentence: &str) -> bool {
    tokens(sentence)
        .iter()
        .any(|t| FORWARD_WORDS.contains(&t.as_str()))
}

/// Every selectable sentence of the corpus, best first. Ties break on
/// document rank, then sentence position.
pub fn rank_sentences(query: &str, corpus: &[CorpusEntry]) -> Vec<ScoredSentence> {
    let terms = query_terms(query);
    let mut scored: Vec<ScoredSentence> = corpus
        .iter()
        .enumerate()
        .flat_map(|(doc_rank, entry)| {
            split_sentences(entry.text())
                .into_iter()
                .enumerate()
                .map(move |(index, text)| (doc_rank, index, text))
        })
        .map(|(doc_rank, index, text)| {
            let sentence_tokens: HashSet<String> = tokens(&text).into_iter().collect();
            let overlap = terms.intersection(&sentence_tokens).count();
            let mut score = (1.0 + overlap as f64) * rank_decay(doc_rank) * rank_decay(index);
            if has_finding_indicator(&text) {
                score += FINDING_BONUS;
            }
            ScoredSentence {
                text,
                doc_rank,
                index,
                score,
            }
        })
        .collect();

    scored.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then(a.doc_rank.cmp(&b.doc_rank))
            .then(a.index.cmp(&b.index))
    });
    scored
}

/// Drop sentences whose normalized text equals, or nearly matches, one
/// already kept. Order is preserved.
pub fn remove_near_duplicates(sentences: Vec<ScoredSentence>) -> Vec<ScoredSentence> {
    let mut kept: Vec<ScoredSentence> = Vec::new();
    let mut seen = HashSet::new();
    for sentence in sentences {
        let key = normalized(&sentence.text);
        if !seen.insert(key) {
            continue;
        }
        if kept
            .iter()
            .any(|k| jaccard(&k.text, &sentence.text) >= NEAR_DUPLICATE_JACCARD)
        {
            continue;
        }
        kept.push(sentence);
    }
    kept
}

/// The heuristic narrative for `corpus`. Every section is non-empty: a
/// section the corpus cannot fill gets one generated sentence.
pub fn heuristic_narrative(query: &str, corpus: &[CorpusEntry]) -> Narrative {
    let sentences = remove_near_duplicates(rank_sentences(query, corpus));
    let subject = infer_subject(query);

    let mut implications: Vec<String> = Vec::new();
    let mut rest: Vec<String> = Vec::new();
    for sentence in sentences {
        if implications.len() < IMPLICATION_SENTENCES && is_forward_looking(&sentence.text) {
            implications.push(sentence.text);
        } else {
            rest.push(sentence.text);
        }
    }

    let mut rest = rest.into_iter();
    let overview: Vec<String> = rest.by_ref().take(OVERVIEW_SENTENCES).collect();
    let findings: Vec<String> = rest.by_ref().take(KEY_FINDING_SENTENCES).collect();
    let analysis: Vec<String> = rest.by_ref().take(ANALYSIS_SENTENCES).collect();
    implications.extend(rest.take(IMPLICATION_SENTENCES - implications.len()));

    let overview = if overview.is_empty() {
        if corpus.is_empty() {
            format!("No sources were found for \"{}\".", query.trim())
        } else {
            format!(
                "{} sources on {subject} were found, but they contained too little readable text to summarize.",
                corpus.len()
            )
        }
    } else {
        overview.join(" ")
    };

    let key_findings = if findings.is_empty() {
        "No specific findings could be extracted from the available sources.".to_string()
    } else {
        findings
            .iter()
            .map(|s| format!("- {s}"))
            .collect::<Vec<_>>()
            .join("\n")
    };

    let detailed_analysis = if analysis.is_empty() {
        "A detailed analysis was not possible with the available material.".to_string()
    } else {
        analysis.join(" ")
    };

    let implications = if implications.is_empty() {
        format!("Further research is needed to assess the implications of {subject}.")
    } else {
        implications.join(" ")
    };

    Narrative {
        overview,
        key_findings,
        detailed_analysis,
        implications,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::build_corpus;
    use chrono::Utc;
    use sift_search::SearchHit;

    fn corpus(snippets: &[&str]) -> Vec<CorpusEntry> {
        let hits = snippets
            .iter()
            .enumerate()
            .map(|(i, snippet)| SearchHit {
                url: format!("https://example.org/{i}"),
                title: format!("Doc {i}"),
                snippet: snippet.to_string(),
                provider: "mock".into(),
                score: 1.0,
                fetched_at: Utc::now(),
            })
            .collect();
        build_corpus(hits, Vec::new())
    }

    const DOCS: [&str; 3] = [
        "Solar power capacity rose by 30% worldwide last year. The weather was mild in most places. Analysts expect solar growth will continue next decade.",
        "Wind farms supplied a growing share of electricity in Europe. Solar power capacity rose by 30% worldwide last year.",
        "Battery storage costs fell sharply as production scaled up. Grid operators could face new balancing challenges in the future.",
    ];

    #[test]
    fn query_overlap_and_rank_order_sentences() {
        let ranked = rank_sentences("solar capacity", &corpus(&DOCS));
        assert_eq!(ranked[0].text, "Solar power capacity rose by 30% worldwide last year.");
        assert_eq!(ranked[0].doc_rank, 0);
        for pair in ranked.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }

    #[test]
    fn duplicates_are_removed() {
        let ranked = remove_near_duplicates(rank_sentences("solar", &corpus(&DOCS)));
        let count = ranked
            .iter()
            .filter(|s| s.text.starts_with("Solar power capacity rose"))
            .count();
        assert_eq!(count, 1);
    }

    #[test]
    fn forward_looking_sentences_go_to_implications() {
        let narrative = heuristic_narrative("solar capacity", &corpus(&DOCS));
        assert!(narrative.implications.contains("expect solar growth will continue"));
        assert!(narrative.implications.contains("could face new balancing challenges"));
        assert!(narrative.overview.starts_with("Solar power capacity rose"));
        assert!(narrative.is_complete());
    }

    #[test]
    fn empty_corpus_states_no_sources() {
        let narrative = heuristic_narrative("renewable energy trends", &[]);
        assert_eq!(narrative.overview, "No sources were found for \"renewable energy trends\".");
        assert!(narrative.is_complete());
    }

    #[test]
    fn unreadable_corpus_is_still_complete() {
        let narrative = heuristic_narrative("solar", &corpus(&["too short", ""]));
        assert!(narrative.overview.contains("too little readable text"));
        assert!(narrative.is_complete());
    }

    #[test]
    fn output_is_deterministic() {
        let docs = corpus(&DOCS);
        assert_eq!(
            heuristic_narrative("solar capacity", &docs),
            heuristic_narrative("solar capacity", &docs)
        );
    }
}
