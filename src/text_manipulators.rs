use std::sync::LazyLock;

use regex::Regex;
use scraper::ElementRef;

static URL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"https?://[^"']+"#).expect("url regex is valid"));

static WHITESPACE_RUN_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s\s+").expect("whitespace regex is valid"));

/// Text of a node with every text fragment trimmed, empty fragments dropped,
/// and the rest concatenated.
pub fn extract_stripped_text(node: ElementRef) -> String {
    node.text()
        .map(str::trim)
        .filter(|fragment| !fragment.is_empty())
        .collect::<String>()
}

pub fn strip_nbsp(text: &str) -> String {
    text.replace('\u{a0}', "")
}

/// First http(s) url in a chunk of markup, or an empty string.
pub fn first_url(markup: &str) -> String {
    URL_REGEX
        .find(markup)
        .map(|found| found.as_str().to_string())
        .unwrap_or_default()
}

pub fn number_steps<I, S>(steps: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    steps
        .into_iter()
        .enumerate()
        .map(|(i, step)| format!("{}. {}", i + 1, step.as_ref()))
        .collect()
}

/// Collapses every run of 2+ whitespace chars into ", " and drops trailing commas.
pub fn normalize_steps_text(steps: &str) -> String {
    WHITESPACE_RUN_REGEX
        .replace_all(steps, ", ")
        .trim_end()
        .trim_end_matches(',')
        .to_string()
}
