//! Template-based follow-up questions.
//!
//! Questions are built from the query's inferred subject and the top
//! keywords. No external calls are made, and the result always holds at
//! least one generic question.

use std::collections::HashSet;

/// Leading words stripped when inferring the subject of a query.
const QUESTION_PREFIXES: &[&str] = &[
    "what", "how", "why", "when", "where", "who", "which", "is", "are", "does", "do", "can",
    "should", "will", "tell", "me", "about", "explain", "describe", "the", "latest", "current",
];

struct Topic {
    triggers: &'static [&'static str],
    templates: &'static [&'static str],
}

/// Domain templates. `{}` is replaced with the subject.
const TOPICS: &[Topic] = &[
    Topic {
        triggers: &["technology", "ai", "artificial intelligence", "machine learning", "software"],
        templates: &[
            "What are the latest breakthrough developments in {}?",
            "How is {} being implemented across different industries?",
            "What are the technical challenges in implementing {}?",
        ],
    },
    Topic {
        triggers: &["market", "business", "economy", "finance", "investment"],
        templates: &[
            "What is the current market size and growth potential for {}?",
            "Who are the key players in the {} market?",
            "What are the regulatory considerations for {}?",
        ],
    },
    Topic {
        triggers: &["health", "medical", "medicine", "treatment", "disease"],
        templates: &[
            "What are the latest clinical trial results for {}?",
            "How does {} compare to existing treatments?",
            "What are the side effects or limitations of {}?",
        ],
    },
    Topic {
        triggers: &["climate", "environment", "sustainability", "green", "renewable", "energy"],
        templates: &[
            "What solutions are being developed to address {}?",
            "What policies are being implemented regarding {}?",
            "What are the long-term projections for {}?",
        ],
    },
];

const GENERIC_TEMPLATES: &[&str] = &[
    "What are the most recent developments in {}?",
    "What are the main challenges and open problems in {}?",
    "What do experts expect for the future of {}?",
];

/// How many top keywords get their own questions.
const KEYWORD_QUESTIONS: usize = 3;

/// The query minus leading question words and trailing punctuation. Falls
/// back to the trimmed query, then to "this topic".
pub fn infer_subject(query: &str) -> String {
    let trimmed = query.trim().trim_end_matches(['?', '.', '!']).trim();
    let words: Vec<&str> = trimmed.split_whitespace().collect();
    let start = words
        .iter()
        .position(|w| !QUESTION_PREFIXES.contains(&w.to_lowercase().as_str()))
        .unwrap_or(words.len());
    let subject = words[start..].join(" ");
    if !subject.is_empty() {
        subject
    } else if !trimmed.is_empty() {
        trimmed.to_string()
    } else {
        "this topic".to_string()
    }
}

fn fill(template: &str, subject: &str) -> String {
    template.replace("{}", subject)
}

fn contains_trigger(query: &str, trigger: &str) -> bool {
    if trigger.contains(' ') {
        query.contains(trigger)
    } else {
        query
            .split(|c: char| !c.is_alphanumeric())
            .any(|word| word == trigger)
    }
}

/// Build up to `max` questions: topic templates, keyword templates, then
/// generic ones. The first generic question is always kept.
pub fn generate_questions(query: &str, keywords: &[String], max: usize) -> Vec<String> {
    let subject = infer_subject(query);
    let lowered = query.to_lowercase();
    let subject_lower = subject.to_lowercase();

    let mut specific: Vec<String> = TOPICS
        .iter()
        .filter(|topic| topic.triggers.iter().any(|t| contains_trigger(&lowered, t)))
        .flat_map(|topic| topic.templates.iter().map(|t| fill(t, &subject)))
        .collect();
    for keyword in keywords
        .iter()
        .filter(|k| !subject_lower.contains(k.as_str()))
        .take(KEYWORD_QUESTIONS)
    {
        specific.push(format!("How does {keyword} relate to {subject}?"));
    }

    let mut generic = GENERIC_TEMPLATES.iter().map(|t| fill(t, &subject));
    let first_generic = generic.next();

    let max = max.max(1);
    let mut questions = dedup(specific);
    questions.truncate(max - 1);
    questions.extend(first_generic);
    questions.extend(generic);
    let mut questions = dedup(questions);
    questions.truncate(max);
    questions
}

/// Merge AI-suggested questions (first) with generated ones, deduplicated
/// case-insensitively and capped at `max`. Never empty when `generated` is
/// non-empty.
pub fn merge_questions(suggested: Vec<String>, generated: Vec<String>, max: usize) -> Vec<String> {
    let mut merged = dedup(suggested.into_iter().chain(generated).collect());
    merged.truncate(max.max(1));
    merged
}

fn dedup(questions: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    questions
        .into_iter()
        .map(|q| q.trim().to_string())
        .filter(|q| !q.is_empty() && seen.insert(q.to_lowercase()))
        .collect()
}
