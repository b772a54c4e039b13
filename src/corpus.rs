//! The ordered corpus handed to summarization.

use serde::Serialize;
use sift_search::{ExtractedDocument, SearchHit};

/// A ranked hit with its extracted document, if extraction succeeded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorpusEntry {
    pub hit: SearchHit,
    /// `None` when extraction failed or was not reached before the deadline;
    /// the hit's snippet stands in for the body text.
    pub document: Option<ExtractedDocument>,
}

impl CorpusEntry {
    /// Body text: the extracted text, else the snippet.
    pub fn text(&self) -> &str {
        match &self.document {
            Some(doc) if !doc.text.trim().is_empty() => &doc.text,
            _ => &self.hit.snippet,
        }
    }

    /// Page title if extraction found one, else the hit title.
    pub fn title(&self) -> &str {
        match &self.document {
            Some(doc) if !doc.title.trim().is_empty() => &doc.title,
            _ => &self.hit.title,
        }
    }

    pub fn url(&self) -> &str {
        &self.hit.url
    }

    pub fn is_extracted(&self) -> bool {
        self.document.is_some()
    }
}

/// Pair hits with extraction results, keeping hit order. Snippet fallbacks
/// become `None`; missing trailing results count as not reached.
pub fn build_corpus(
    hits: Vec<SearchHit>,
    documents: Vec<Option<ExtractedDocument>>,
) -> Vec<CorpusEntry> {
    let mut documents = documents.into_iter();
    hits.into_iter()
        .map(|hit| CorpusEntry {
            hit,
            document: documents.next().flatten().filter(|doc| doc.success),
        })
        .collect()
}

/// Total words across the corpus body texts.
pub fn word_total(corpus: &[CorpusEntry]) -> usize {
    corpus
        .iter()
        .map(|entry| entry.text().split_whitespace().count())
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sift_search::ExtractionStrategy;

    fn hit(url: &str) -> SearchHit {
        SearchHit {
            url: url.into(),
            title: format!("Hit {url}"),
            snippet: format!("snippet for {url}"),
            provider: "mock".into(),
            score: 1.0,
            fetched_at: Utc::now(),
        }
    }

    fn doc(url: &str, success: bool) -> ExtractedDocument {
        ExtractedDocument {
            url: url.into(),
            title: "Extracted title".into(),
            text: "extracted body text here".into(),
            strategy: if success {
                ExtractionStrategy::Article
            } else {
                ExtractionStrategy::SnippetFallback
            },
            word_count: 4,
            quality: 0.5,
            success,
        }
    }

    #[test]
    fn pairs_in_order_and_drops_fallbacks() {
        let corpus = build_corpus(
            vec![hit("a"), hit("b"), hit("c")],
            vec![Some(doc("a", true)), Some(doc("b", false))],
        );
        assert_eq!(corpus.len(), 3);
        assert_eq!(corpus[0].url(), "a");
        assert!(corpus[0].is_extracted());
        assert_eq!(corpus[0].text(), "extracted body text here");
        assert_eq!(corpus[0].title(), "Extracted title");

        assert!(!corpus[1].is_extracted());
        assert_eq!(corpus[1].text(), "snippet for b");
        assert_eq!(corpus[1].title(), "Hit b");

        assert!(corpus[2].document.is_none());
    }

    #[test]
    fn counts_words() {
        let corpus = build_corpus(vec![hit("a"), hit("b")], vec![Some(doc("a", true)), None]);
        assert_eq!(word_total(&corpus), 4 + 3);
    }
}
