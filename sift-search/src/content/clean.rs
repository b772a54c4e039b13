//! Text-cleaning helpers shared by the extraction strategies.

use scraper::{Html, Selector};

/// Elements removed, with their content, before any text is read.
const BOILERPLATE_TAGS: &[&str] = &[
    "script", "style", "nav", "footer", "header", "aside", "noscript", "svg", "iframe", "form",
    "template",
];

/// Remove boilerplate elements (scripts, styles, navigation, footers...)
/// and their content from raw HTML.
pub fn strip_boilerplate_tags(html: &str) -> String {
    BOILERPLATE_TAGS
        .iter()
        .fold(html.to_owned(), |acc, tag| strip_tag(&acc, tag))
}

/// Remove every `<tag ...>...</tag>` span, matching the tag name
/// case-insensitively. An unclosed element loses only its opening tag.
fn strip_tag(html: &str, tag: &str) -> String {
    // ASCII lowercasing keeps byte offsets aligned with `html`.
    let lower = html.to_ascii_lowercase();
    let open = format!("<{tag}");
    let close = format!("</{tag}>");
    let mut out = String::with_capacity(html.len());
    let mut pos = 0;

    while let Some(offset) = lower[pos..].find(&open) {
        let start = pos + offset;
        let after = start + open.len();

        // `<nav` must not match `<navigate`.
        let is_tag = lower
            .as_bytes()
            .get(after)
            .is_none_or(|b| matches!(b, b' ' | b'>' | b'/' | b'\n' | b'\r' | b'\t'));
        if !is_tag {
            out.push_str(&html[pos..after]);
            pos = after;
            continue;
        }

        out.push_str(&html[pos..start]);
        pos = match lower[start..].find(&close) {
            Some(end) => start + end + close.len(),
            None => lower[start..]
                .find('>')
                .map_or(html.len(), |end| start + end + 1),
        };
    }
    out.push_str(&html[pos..]);
    out
}

/// The trimmed `<title>` text, or an empty string.
pub fn extract_title(document: &Html) -> String {
    let Ok(selector) = Selector::parse("title") else {
        return String::new();
    };
    document
        .select(&selector)
        .next()
        .map(|el| normalise_whitespace(&el.text().collect::<String>()))
        .unwrap_or_default()
}

/// Collapse runs of spaces to one, keep at most one blank line between
/// paragraphs and trim every line.
pub fn normalise_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut blank_run = 0usize;
    for line in text.lines() {
        let line = line.split_whitespace().collect::<Vec<_>>().join(" ");
        if line.is_empty() {
            blank_run += 1;
            continue;
        }
        if !out.is_empty() {
            out.push_str(if blank_run > 0 { "\n\n" } else { "\n" });
        }
        out.push_str(&line);
        blank_run = 0;
    }
    out
}

/// Truncate to at most `max_chars` characters, on a char boundary.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte, _)) => text[..byte].trim_end().to_owned(),
        None => text.to_owned(),
    }
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_scripts_and_styles() {
        let html = "<p>Real</p><script>var x = 1;</script><STYLE>.a{}</STYLE><p>content</p>";
        let out = strip_boilerplate_tags(html);
        assert!(out.contains("Real"));
        assert!(out.contains("content"));
        assert!(!out.contains("var x"));
        assert!(!out.contains(".a{}"));
    }

    #[test]
    fn nav_not_confused_with_similar_tags() {
        let out = strip_boilerplate_tags("<nav>Skip</nav><navigate>Keep</navigate>");
        assert!(!out.contains("Skip"));
        assert!(out.contains("Keep"));
    }

    #[test]
    fn unclosed_tag_drops_only_opening() {
        let out = strip_tag("<p>before<iframe src=x>after</p>", "iframe");
        assert_eq!(out, "<p>beforeafter</p>");
    }

    #[test]
    fn non_ascii_text_survives_stripping() {
        let out = strip_boilerplate_tags("<p>Énergie İstanbul</p><script>x</script><p>ok</p>");
        assert!(out.contains("Énergie İstanbul"));
        assert!(out.contains("ok"));
    }

    #[test]
    fn title_is_extracted() {
        let doc = Html::parse_document("<html><head><title>  My\n Page </title></head></html>");
        assert_eq!(extract_title(&doc), "My Page");
        let doc = Html::parse_document("<html><body>none</body></html>");
        assert!(extract_title(&doc).is_empty());
    }

    #[test]
    fn whitespace_is_normalised() {
        let out = normalise_whitespace("  Word1    Word2\n\n\n\n   Word3\nWord4  ");
        assert_eq!(out, "Word1 Word2\n\nWord3\nWord4");
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let text = "é".repeat(10);
        assert_eq!(truncate_chars(&text, 4), "éééé");
        assert_eq!(truncate_chars("short", 100), "short");
    }
}
