//! The structured research report produced by every run.

use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::corpus::CorpusEntry;

/// Attribution used when no AI provider produced the narrative.
pub const HEURISTIC_FALLBACK: &str = "heuristic-fallback";

/// Who wrote the narrative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Attribution {
    /// An AI provider, by id.
    Provider(String),
    /// The deterministic extractive summarizer.
    HeuristicFallback,
}

impl Attribution {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Provider(id) => id,
            Self::HeuristicFallback => HEURISTIC_FALLBACK,
        }
    }

    pub fn is_heuristic(&self) -> bool {
        matches!(self, Self::HeuristicFallback)
    }
}

impl From<String> for Attribution {
    fn from(value: String) -> Self {
        if value == HEURISTIC_FALLBACK {
            Self::HeuristicFallback
        } else {
            Self::Provider(value)
        }
    }
}

impl From<Attribution> for String {
    fn from(value: Attribution) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for Attribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The four narrative sections. Each is always non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Narrative {
    pub overview: String,
    pub key_findings: String,
    pub detailed_analysis: String,
    pub implications: String,
}

impl Narrative {
    /// `(heading, body)` pairs in report order.
    pub fn sections(&self) -> [(&'static str, &str); 4] {
        [
            ("Overview", &self.overview),
            ("Key Findings", &self.key_findings),
            ("Detailed Analysis", &self.detailed_analysis),
            ("Implications", &self.implications),
        ]
    }

    pub fn is_complete(&self) -> bool {
        self.sections()
            .iter()
            .all(|(_, body)| !body.trim().is_empty())
    }
}

/// A cited source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub url: String,
    pub title: String,
    /// Search provider the hit came from.
    pub provider: String,
}

impl Source {
    /// Citations for a corpus, in rank order, one per URL.
    pub fn from_corpus(corpus: &[CorpusEntry]) -> Vec<Self> {
        let mut seen = HashSet::new();
        corpus
            .iter()
            .filter(|entry| seen.insert(entry.url().to_string()))
            .map(|entry| Self {
                url: entry.url().to_string(),
                title: entry.title().to_string(),
                provider: entry.hit.provider.clone(),
            })
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportStats {
    /// Unique hits returned by the search fan-out.
    pub sources_found: usize,
    /// Corpus entries with successfully extracted text.
    pub documents_extracted: usize,
    /// Words across the corpus text.
    pub words_analyzed: usize,
}

/// Output of one research run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryReport {
    pub query: String,
    pub narrative: Narrative,
    /// Ordered by relevance, no duplicates.
    pub keywords: Vec<String>,
    /// Never empty.
    pub follow_up_questions: Vec<String>,
    pub attribution: Attribution,
    pub sources: Vec<Source>,
    pub stats: ReportStats,
    /// Degraded-operation messages.
    pub notices: Vec<String>,
    pub generated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::build_corpus;
    use sift_search::SearchHit;

    fn hit(url: &str, title: &str) -> SearchHit {
        SearchHit {
            url: url.into(),
            title: title.into(),
            snippet: String::new(),
            provider: "brave".into(),
            score: 0.5,
            fetched_at: Utc::now(),
        }
    }

    #[test]
    fn attribution_serializes_as_plain_string() {
        let json = serde_json::to_string(&Attribution::HeuristicFallback).expect("serialize");
        assert_eq!(json, "\"heuristic-fallback\"");
        let json = serde_json::to_string(&Attribution::Provider("openai".into())).expect("serialize");
        assert_eq!(json, "\"openai\"");

        let back: Attribution = serde_json::from_str("\"heuristic-fallback\"").expect("parse");
        assert!(back.is_heuristic());
        let back: Attribution = serde_json::from_str("\"gemini\"").expect("parse");
        assert_eq!(back, Attribution::Provider("gemini".into()));
    }

    #[test]
    fn sources_are_deduplicated_in_order() {
        let corpus = build_corpus(
            vec![hit("https://a", "A"), hit("https://b", "B"), hit("https://a", "A again")],
            vec![],
        );
        let sources = Source::from_corpus(&corpus);
        let urls: Vec<&str> = sources.iter().map(|s| s.url.as_str()).collect();
        assert_eq!(urls, ["https://a", "https://b"]);
        assert_eq!(sources[0].title, "A");
    }

    #[test]
    fn narrative_completeness() {
        let mut narrative = Narrative {
            overview: "o".into(),
            key_findings: "k".into(),
            detailed_analysis: "d".into(),
            implications: "i".into(),
        };
        assert!(narrative.is_complete());
        narrative.implications = "  ".into();
        assert!(!narrative.is_complete());
    }
}
