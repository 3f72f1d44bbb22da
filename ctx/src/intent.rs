//! Keyword-based intent classification
//!
//! Deterministic, rule-based tagging of work item text. The rule table
//! is immutable static data; keywords match on word boundaries only, so
//! "fixture" does not trigger "fix".

use regex::Regex;
use std::sync::LazyLock;

/// Intent tags and the keywords that trigger them, in emission order
const INTENT_RULES: &[(&str, &[&str])] = &[
    (
        "bugfix",
        &["fix", "error", "broken", "failure", "bug", "regression", "crash"],
    ),
    (
        "frontend",
        &["ui", "react", "component", "console", "browser", "css", "html"],
    ),
    (
        "backend",
        &[
            "api", "timeout", "service", "database", "db", "server", "latency", "test",
        ],
    ),
    (
        "design",
        &["architecture", "refactor", "design", "pattern", "structure"],
    ),
];

static COMPILED_RULES: LazyLock<Vec<(&'static str, Vec<Regex>)>> = LazyLock::new(|| {
    INTENT_RULES
        .iter()
        .map(|(intent, keywords)| {
            let patterns = keywords
                .iter()
                .map(|kw| Regex::new(&format!(r"\b{}\b", regex::escape(kw))).unwrap())
                .collect();
            (*intent, patterns)
        })
        .collect()
});

/// Classify free text into intent tags; `general` when nothing matches
pub fn classify_intent(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    let mut intents = Vec::new();
    for (intent, patterns) in COMPILED_RULES.iter() {
        if patterns.iter().any(|p| p.is_match(&lower)) {
            intents.push(intent.to_string());
        }
    }
    if intents.is_empty() {
        intents.push("general".to_string());
    }
    intents
}
