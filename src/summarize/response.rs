//! Parsing structured AI responses into narrative sections.

use sift_search::ProviderError;

/// Minimum recognised narrative sections for a response to count as
/// well-formed.
pub const MIN_NARRATIVE_SECTIONS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Heading {
    Overview,
    KeyFindings,
    DetailedAnalysis,
    Implications,
    Questions,
}

/// Narrative sections recognised in an AI response. Missing sections are
/// `None` and get filled from the heuristic summarizer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedResponse {
    pub overview: Option<String>,
    pub key_findings: Option<String>,
    pub detailed_analysis: Option<String>,
    pub implications: Option<String>,
    pub questions: Vec<String>,
}

impl ParsedResponse {
    pub fn narrative_sections(&self) -> usize {
        [
            &self.overview,
            &self.key_findings,
            &self.detailed_analysis,
            &self.implications,
        ]
        .iter()
        .filter(|s| s.is_some())
        .count()
    }
}

/// Longest unmarked `Label: text` line still read as a heading.
const MAX_INLINE_HEADING_CHARS: usize = 48;

/// Recognise a heading line (`## Overview`, `**Key Findings**`,
/// `Implications:`), returning the heading and any text after a colon.
///
/// Unmarked colon labels only count when nothing follows the colon or the
/// whole line is short, so prose such as `Analysis: the data shows ...`
/// stays in the current section.
fn parse_heading(line: &str) -> Option<(Heading, &str)> {
    let trimmed = line.trim();
    let is_marked = trimmed.starts_with('#') || trimmed.starts_with("**");
    let (label, rest) = match trimmed.split_once(':') {
        Some((label, rest)) => (label, rest.trim()),
        None if is_marked => (trimmed, ""),
        None => return None,
    };
    if !is_marked && !rest.is_empty() && trimmed.chars().count() > MAX_INLINE_HEADING_CHARS {
        return None;
    }
    let label = label
        .trim_matches(|c: char| c == '#' || c == '*' || c.is_whitespace())
        .trim_start_matches(|c: char| c.is_ascii_digit() || c == '.' || c.is_whitespace())
        .to_lowercase();
    let rest = rest.trim_start_matches('*').trim();

    let heading = match label.as_str() {
        "overview" | "summary" | "executive summary" => Heading::Overview,
        "key findings" | "findings" | "key points" => Heading::KeyFindings,
        "detailed analysis" | "analysis" => Heading::DetailedAnalysis,
        "implications" | "future implications" | "conclusion" | "conclusions" => {
            Heading::Implications
        }
        "follow-up questions" | "follow up questions" | "further questions" => Heading::Questions,
        _ => return None,
    };
    Some((heading, rest))
}

fn question_line(line: &str) -> Option<String> {
    let stripped = line
        .trim()
        .trim_start_matches(|c: char| {
            c == '-' || c == '*' || c == '•' || c == '.' || c == ')' || c.is_ascii_digit()
        })
        .trim();
    (stripped.ends_with('?') && stripped.len() > 1).then(|| stripped.to_string())
}

/// Split an AI response into sections.
///
/// # Errors
///
/// [`ProviderError::MalformedResponse`] when the response is empty or has
/// fewer than [`MIN_NARRATIVE_SECTIONS`] recognisable, non-empty narrative
/// sections.
pub fn parse_response(provider: &str, text: &str) -> Result<ParsedResponse, ProviderError> {
    if text.trim().is_empty() {
        return Err(ProviderError::MalformedResponse(format!(
            "{provider}: empty response"
        )));
    }

    let mut sections: Vec<(Heading, Vec<&str>)> = Vec::new();
    for line in text.lines() {
        if let Some((heading, rest)) = parse_heading(line) {
            sections.push((heading, Vec::new()));
            if !rest.is_empty()
                && let Some((_, body)) = sections.last_mut()
            {
                body.push(rest);
            }
        } else if let Some((_, body)) = sections.last_mut() {
            body.push(line);
        }
    }

    let mut parsed = ParsedResponse::default();
    for (heading, lines) in sections {
        let body = lines.join("\n").trim().to_string();
        if body.is_empty() {
            continue;
        }
        let slot = match heading {
            Heading::Overview => &mut parsed.overview,
            Heading::KeyFindings => &mut parsed.key_findings,
            Heading::DetailedAnalysis => &mut parsed.detailed_analysis,
            Heading::Implications => &mut parsed.implications,
            Heading::Questions => {
                parsed
                    .questions
                    .extend(body.lines().filter_map(question_line));
                continue;
            }
        };
        if slot.is_none() {
            *slot = Some(body);
        }
    }

    let found = parsed.narrative_sections();
    if found < MIN_NARRATIVE_SECTIONS {
        return Err(ProviderError::MalformedResponse(format!(
            "{provider}: only {found} of 4 report sections recognised"
        )));
    }
    Ok(parsed)
}
