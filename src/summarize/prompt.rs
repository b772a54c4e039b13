//! Prompt construction and input-size truncation for AI providers.

use crate::corpus::CorpusEntry;

/// Section headings requested from AI providers, in order.
pub const SECTION_HEADINGS: [&str; 5] = [
    "Overview",
    "Key Findings",
    "Detailed Analysis",
    "Implications",
    "Follow-up Questions",
];

/// System prompt for a research query.
pub fn build_prompt(query: &str) -> String {
    format!(
        "You are a research analyst. Using only the numbered sources provided, write a \
         research summary answering: \"{query}\".\n\n\
         Format the answer in markdown with exactly these level-2 headings, in order:\n\
         ## {}\n## {}\n## {}\n## {}\n## {}\n\n\
         Under Key Findings use bullet points. Under Follow-up Questions list three to five \
         questions, one per line, each ending with a question mark. Cite sources inline as \
         [n]. Do not invent facts that are not in the sources.",
        SECTION_HEADINGS[0],
        SECTION_HEADINGS[1],
        SECTION_HEADINGS[2],
        SECTION_HEADINGS[3],
        SECTION_HEADINGS[4],
    )
}

fn render_entry(rank: usize, entry: &CorpusEntry) -> String {
    format!(
        "[{}] {}\nURL: {}\n{}\n",
        rank + 1,
        entry.title(),
        entry.url(),
        entry.text().trim()
    )
}

/// Corpus text prepared for one provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedCorpus {
    pub text: String,
    /// How many leading corpus entries made it in.
    pub included: usize,
}

/// Render whole entries in rank order while the prompt plus corpus stays
/// within `max_chars`. Stops at the first entry that does not fit, so only
/// the tail is ever dropped. `None` when not even the first entry fits.
pub fn render_corpus(
    prompt: &str,
    corpus: &[CorpusEntry],
    max_chars: Option<usize>,
) -> Option<RenderedCorpus> {
    let budget = match max_chars {
        Some(max) => max.checked_sub(prompt.chars().count())?,
        None => usize::MAX,
    };

    let mut text = String::new();
    let mut used = 0usize;
    let mut included = 0usize;
    for (rank, entry) in corpus.iter().enumerate() {
        let block = render_entry(rank, entry);
        let separator = usize::from(!text.is_empty());
        let cost = block.chars().count() + separator;
        if used.saturating_add(cost) > budget {
            break;
        }
        if separator == 1 {
            text.push('\n');
        }
        text.push_str(&block);
        used += cost;
        included += 1;
    }

    if included == 0 && !corpus.is_empty() {
        return None;
    }
    Some(RenderedCorpus { text, included })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::build_corpus;
    use chrono::Utc;
    use sift_search::SearchHit;

    fn corpus(n: usize, snippet_len: usize) -> Vec<CorpusEntry> {
        let hits = (0..n)
            .map(|i| SearchHit {
                url: format!("https://s{i}.org"),
                title: format!("Source {i}"),
                snippet: "x".repeat(snippet_len),
                provider: "mock".into(),
                score: 1.0,
                fetched_at: Utc::now(),
            })
            .collect();
        build_corpus(hits, Vec::new())
    }

    #[test]
    fn prompt_names_every_section() {
        let prompt = build_prompt("solar trends");
        assert!(prompt.contains("\"solar trends\""));
        for heading in SECTION_HEADINGS {
            assert!(prompt.contains(&format!("## {heading}")));
        }
    }

    #[test]
    fn unlimited_includes_everything() {
        let rendered = render_corpus("p", &corpus(4, 50), None).expect("fits");
        assert_eq!(rendered.included, 4);
        assert!(rendered.text.starts_with("[1] Source 0\nURL: https://s0.org\n"));
        assert!(rendered.text.contains("[4] Source 3"));
    }

    #[test]
    fn truncation_drops_only_the_tail() {
        let entries = corpus(5, 100);
        let one = render_entry(0, &entries[0]).chars().count();
        let prompt = "prompt";
        let limit = prompt.len() + one * 3 + 2;
        let rendered = render_corpus(prompt, &entries, Some(limit)).expect("fits");
        assert_eq!(rendered.included, 3);
        assert!(rendered.text.contains("[1] Source 0"));
        assert!(rendered.text.contains("[3] Source 2"));
        assert!(!rendered.text.contains("Source 3"));
    }

    #[test]
    fn first_entry_too_large_is_none() {
        assert!(render_corpus("prompt", &corpus(2, 500), Some(200)).is_none());
        assert!(render_corpus("a long prompt", &corpus(1, 1), Some(3)).is_none());
    }

    #[test]
    fn empty_corpus_renders_empty() {
        let rendered = render_corpus("p", &[], Some(10)).expect("empty fits");
        assert_eq!(rendered.included, 0);
        assert!(rendered.text.is_empty());
    }
}
