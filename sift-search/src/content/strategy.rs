//! Extraction strategies and the quality gate they must pass.
//!
//! Strategies are synchronous and CPU-bound; the extractor runs them on the
//! blocking pool under a timeout.

use std::collections::HashSet;

use scraper::{ElementRef, Html, Selector};

use crate::error::ProviderError;
use crate::types::ExtractionStrategy;

use super::clean::{extract_title, normalise_whitespace, strip_boilerplate_tags, word_count};

/// Class/id words marking navigation and other non-content containers.
const BOILERPLATE_HINTS: &[&str] = &[
    "nav", "menu", "sidebar", "footer", "header", "banner", "cookie", "consent", "advert",
    "promo", "subscribe", "newsletter", "comment", "share", "related",
];

/// Class/id words marking likely content containers.
const CONTENT_HINTS: &[&str] = &["article", "content", "post", "entry", "story", "body", "text"];

/// Blocks with less visible text than this are never candidates.
const MIN_BLOCK_CHARS: usize = 20;

/// Characters that rarely appear in prose but dominate leaked markup/code.
const MARKUP_CHARS: &[char] = &['<', '>', '{', '}', '=', ';'];

/// Title and text produced by one strategy.
#[derive(Debug, Clone, PartialEq)]
pub struct Extracted {
    pub title: String,
    pub text: String,
}

/// Run `strategy` over a page body. `None` when it finds no text.
pub fn run(strategy: ExtractionStrategy, body: &str, is_html: bool) -> Option<Extracted> {
    match strategy {
        ExtractionStrategy::Article if is_html => article(body),
        ExtractionStrategy::Article => None,
        ExtractionStrategy::MarkupStrip => markup_strip(body, is_html),
        ExtractionStrategy::SnippetFallback => None,
    }
}

fn class_and_id(el: &ElementRef) -> String {
    let value = el.value();
    let mut s = value.attr("class").unwrap_or_default().to_ascii_lowercase();
    s.push(' ');
    s.push_str(&value.attr("id").unwrap_or_default().to_ascii_lowercase());
    s
}

fn text_chars(el: &ElementRef) -> usize {
    el.text().map(|t| t.chars().count()).sum()
}

fn link_text_chars(el: &ElementRef, links: &Selector) -> usize {
    el.select(links).map(|a| text_chars(&a)).sum()
}

/// Paragraph-structured text of a block: one line per paragraph-like
/// child, falling back to the block's whole text.
fn block_text(el: &ElementRef, paragraphs: &Selector) -> String {
    let lines: Vec<String> = el
        .select(paragraphs)
        .map(|p| p.text().collect::<Vec<_>>().join(" "))
        .collect();
    let joined = if lines.is_empty() {
        el.text().collect::<Vec<_>>().join(" ")
    } else {
        lines.join("\n")
    };
    normalise_whitespace(&joined)
}

/// Readability-style main-content detection.
///
/// Scores `article`, `main`, `section` and `div` blocks by visible text
/// length minus twice their link text, with bonuses for `article`/`main`
/// tags and content-like class names. Link-heavy blocks and blocks whose
/// class or id names navigation are skipped.
pub fn article(html: &str) -> Option<Extracted> {
    let cleaned = strip_boilerplate_tags(html);
    let document = Html::parse_document(&cleaned);
    let blocks = Selector::parse("article, main, section, div").ok()?;
    let links = Selector::parse("a").ok()?;
    let paragraphs = Selector::parse("p, h1, h2, h3, h4, li, blockquote, pre").ok()?;

    let mut best: Option<(i64, ElementRef)> = None;
    for el in document.select(&blocks) {
        let hints = class_and_id(&el);
        if BOILERPLATE_HINTS.iter().any(|bad| hints.contains(bad)) {
            continue;
        }
        let chars = text_chars(&el);
        if chars < MIN_BLOCK_CHARS {
            continue;
        }
        let link_chars = link_text_chars(&el, &links);
        if link_chars > chars / 2 {
            continue;
        }

        let mut score = chars as i64 - 2 * link_chars as i64;
        score += match el.value().name() {
            "article" => 500,
            "main" => 300,
            _ => 0,
        };
        if CONTENT_HINTS.iter().any(|good| hints.contains(good)) {
            score += 200;
        }
        if best.as_ref().is_none_or(|(top, _)| score > *top) {
            best = Some((score, el));
        }
    }

    let (_, el) = best?;
    let text = block_text(&el, &paragraphs);
    if text.is_empty() {
        return None;
    }
    Some(Extracted {
        title: extract_title(&document),
        text,
    })
}

/// Generic markup stripping: drop boilerplate elements and read the text
/// of the first non-empty `article`, `main`, `[role="main"]` or `body`.
/// Plain-text bodies are only whitespace-normalised.
pub fn markup_strip(body: &str, is_html: bool) -> Option<Extracted> {
    if !is_html {
        let text = normalise_whitespace(body);
        return (!text.is_empty()).then(|| Extracted {
            title: String::new(),
            text,
        });
    }

    let cleaned = strip_boilerplate_tags(body);
    let document = Html::parse_document(&cleaned);
    let text = ["article", "main", "[role=\"main\"]", "body"]
        .iter()
        .filter_map(|css| Selector::parse(css).ok())
        .find_map(|selector| {
            let el = document.select(&selector).next()?;
            let text = normalise_whitespace(&el.text().collect::<Vec<_>>().join(" "));
            (!text.is_empty()).then_some(text)
        })?;
    Some(Extracted {
        title: extract_title(&document),
        text,
    })
}

/// Ratio of distinct (lowercased) words to total words.
pub fn lexical_diversity(text: &str) -> f64 {
    let words: Vec<String> = text.split_whitespace().map(str::to_lowercase).collect();
    if words.is_empty() {
        return 0.0;
    }
    let unique: HashSet<&str> = words.iter().map(String::as_str).collect();
    unique.len() as f64 / words.len() as f64
}

/// Minimum standard extracted text must meet.
#[derive(Debug, Clone, Copy)]
pub struct QualityGate {
    pub min_words: usize,
    pub min_diversity: f64,
}

impl QualityGate {
    /// Reject text that is too short, too repetitive or mostly markup.
    pub fn check(&self, text: &str) -> Result<(), ProviderError> {
        let words = word_count(text);
        if words < self.min_words {
            return Err(ProviderError::BelowQualityThreshold(format!(
                "{words} words, need {}",
                self.min_words
            )));
        }
        let diversity = lexical_diversity(text);
        if diversity < self.min_diversity {
            return Err(ProviderError::BelowQualityThreshold(format!(
                "lexical diversity {diversity:.2} below {:.2}",
                self.min_diversity
            )));
        }
        let total = text.chars().count();
        let markup = text.chars().filter(|c| MARKUP_CHARS.contains(c)).count();
        if markup * 20 > total {
            return Err(ProviderError::BelowQualityThreshold(
                "text is mostly markup".into(),
            ));
        }
        Ok(())
    }
}

/// Content quality in `0.0..=1.0`: length band, title presence, lexical
/// diversity and a bonus for structured-article extraction.
pub fn quality_score(text: &str, title: &str, strategy: ExtractionStrategy) -> f64 {
    let words = word_count(text);
    if words == 0 {
        return 0.0;
    }
    let mut score: f64 = match words {
        200..=5000 => 0.3,
        5001.. => 0.2,
        100..=199 => 0.1,
        _ => 0.0,
    };
    if title.chars().count() > 10 {
        score += 0.2;
    }
    let diversity = lexical_diversity(text);
    score += if diversity > 0.4 {
        0.3
    } else if diversity > 0.2 {
        0.2
    } else {
        0.1
    };
    if strategy == ExtractionStrategy::Article {
        score += 0.2;
    }
    score.min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARTICLE_PAGE: &str = r#"<html><head><title>Solar Outlook 2024</title></head><body>
        <header>Site header</header>
        <div class="navbar"><a href="/">Home</a> <a href="/news">News</a> <a href="/about">About us and more links</a></div>
        <div class="wrapper">
            <div class="sidebar-widget"><a href="/x">Popular posts you might enjoy reading today</a></div>
            <article class="post">
                <h1>Solar capacity surges</h1>
                <p>Global solar capacity grew by a record amount last year, according to the agency.</p>
                <p>Analysts expect installations to keep rising as module prices fall further.</p>
            </article>
        </div>
        <footer>Copyright</footer>
    </body></html>"#;

    fn gate() -> QualityGate {
        QualityGate {
            min_words: 5,
            min_diversity: 0.2,
        }
    }

    #[test]
    fn article_picks_main_block() {
        let out = article(ARTICLE_PAGE).expect("article found");
        assert_eq!(out.title, "Solar Outlook 2024");
        assert!(out.text.contains("record amount last year"));
        assert!(out.text.contains("module prices fall"));
        assert!(!out.text.contains("Popular posts"));
        assert!(!out.text.contains("Home"));
        assert!(!out.text.contains("Copyright"));
    }

    #[test]
    fn article_keeps_paragraph_lines() {
        let out = article(ARTICLE_PAGE).expect("article found");
        assert_eq!(out.text.lines().count(), 3);
    }

    #[test]
    fn article_rejects_link_farms() {
        let html = r#"<html><body><div><a href="/1">First link with some words</a> <a href="/2">Second link with more words</a></div></body></html>"#;
        assert!(article(html).is_none());
    }

    #[test]
    fn article_is_not_run_on_plain_text() {
        assert!(run(ExtractionStrategy::Article, "plain words here", false).is_none());
        assert!(run(ExtractionStrategy::SnippetFallback, ARTICLE_PAGE, true).is_none());
    }

    #[test]
    fn markup_strip_prefers_main() {
        let html = r#"<html><body><div>Outer text</div><main>Main content area</main><script>alert(1)</script></body></html>"#;
        let out = markup_strip(html, true).expect("text found");
        assert_eq!(out.text, "Main content area");
    }

    #[test]
    fn markup_strip_falls_back_to_body() {
        let out = markup_strip("<html><body><p>Body only</p></body></html>", true).expect("text");
        assert_eq!(out.text, "Body only");
    }

    #[test]
    fn markup_strip_handles_plain_text() {
        let out = markup_strip("  plain\n\n\n text  ", false).expect("text");
        assert_eq!(out.text, "plain\n\ntext");
        assert!(out.title.is_empty());
    }

    #[test]
    fn scripts_only_page_has_no_text() {
        let html = "<html><head><style>body{}</style></head><body><script>x()</script></body></html>";
        assert!(markup_strip(html, true).is_none());
    }

    #[test]
    fn gate_rejects_short_text() {
        let err = gate().check("too short").unwrap_err();
        assert_eq!(err.code(), "EXTRACTION_BELOW_QUALITY_THRESHOLD");
    }

    #[test]
    fn gate_rejects_repetitive_text() {
        let err = gate().check(&"spam ".repeat(50)).unwrap_err();
        assert!(err.message().contains("diversity"));
    }

    #[test]
    fn gate_rejects_markup() {
        let text = "function a() { x = 1; } var b = { c: 2 }; if (x) { y = 3; } done now";
        let err = gate().check(text).unwrap_err();
        assert!(err.message().contains("markup"));
    }

    #[test]
    fn gate_accepts_prose() {
        assert!(gate()
            .check("Solar capacity grew by a record amount last year worldwide.")
            .is_ok());
    }

    #[test]
    fn quality_score_bands() {
        let prose: String = (0..250).map(|i| format!("word{i} ")).collect();
        let score = quality_score(&prose, "A descriptive title", ExtractionStrategy::Article);
        assert!((score - 1.0).abs() < f64::EPSILON);

        let score = quality_score("a b c", "", ExtractionStrategy::MarkupStrip);
        assert!((score - 0.3).abs() < 1e-9);

        assert_eq!(quality_score("", "title here!", ExtractionStrategy::Article), 0.0);
    }
}
