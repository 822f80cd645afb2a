//! Locating JSON payloads inside free-form model text.
//!
//! Models wrap JSON in prose, code fences, or both, and occasionally leave
//! trailing commas or typographic quotes behind. Extraction tries, in order:
//!
//! 1. the whole (trimmed) text
//! 2. the contents of each ```` ``` ```` / ```` ```json ```` fence
//! 3. each balanced `{...}` / `[...]` span, outermost first
//!
//! Each candidate is parsed as-is and then once more after light cleanup.

use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

static FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```[A-Za-z]*[ \t]*\r?\n?(.*?)```").expect("valid regex")
});

static TRAILING_COMMA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",(\s*[}\]])").expect("valid regex"));

/// Find the first JSON object embedded in `text`.
pub fn extract_object(text: &str) -> Option<Value> {
    extract_with(text, '{', '}').filter(Value::is_object)
}

/// Find the first JSON array embedded in `text`.
pub fn extract_array(text: &str) -> Option<Vec<Value>> {
    match extract_with(text, '[', ']') {
        Some(Value::Array(items)) => Some(items),
        _ => None,
    }
}

fn extract_with(text: &str, open: char, close: char) -> Option<Value> {
    let wanted = |v: &Value| match open {
        '{' => v.is_object(),
        _ => v.is_array(),
    };

    let mut candidates: Vec<&str> = vec![text.trim()];
    candidates.extend(FENCE.captures_iter(text).filter_map(|c| c.get(1)).map(|m| m.as_str()));
    candidates.extend(balanced_spans(text, open, close));

    candidates
        .into_iter()
        .find_map(|candidate| parse_candidate(candidate).filter(wanted))
        .or_else(|| {
            // Fences may hold prose around the payload too.
            FENCE
                .captures_iter(text)
                .filter_map(|c| c.get(1))
                .flat_map(|m| balanced_spans(m.as_str(), open, close))
                .find_map(|span| parse_candidate(span).filter(wanted))
        })
}

fn parse_candidate(candidate: &str) -> Option<Value> {
    let candidate = candidate.trim();
    if candidate.is_empty() {
        return None;
    }
    serde_json::from_str(candidate)
        .ok()
        .or_else(|| serde_json::from_str(&clean_noise(candidate)).ok())
}

/// Replace typographic quotes and drop trailing commas.
fn clean_noise(candidate: &str) -> String {
    let normalized: String = candidate
        .chars()
        .map(|c| match c {
            '\u{201C}' | '\u{201D}' => '"',
            '\u{2018}' | '\u{2019}' => '\'',
            other => other,
        })
        .collect();
    TRAILING_COMMA.replace_all(&normalized, "$1").into_owned()
}

/// Top-level balanced `open ... close` spans, ignoring delimiters inside
/// JSON strings.
///
/// An opener that is never closed is skipped and the scan resumes just
/// after it, so stray prose braces or a truncated attempt cannot hide a
/// complete object further on.
fn balanced_spans(text: &str, open: char, close: char) -> Vec<&str> {
    let mut spans = Vec::new();
    let mut from = 0;

    while from < text.len() {
        let mut depth = 0usize;
        let mut start = None;
        let mut in_string = false;
        let mut escaped = false;

        for (i, c) in text[from..].char_indices() {
            let i = from + i;
            if in_string {
                match c {
                    _ if escaped => escaped = false,
                    '\\' => escaped = true,
                    '"' => in_string = false,
                    _ => {}
                }
                continue;
            }
            match c {
                '"' if depth > 0 => in_string = true,
                c if c == open => {
                    if depth == 0 {
                        start = Some(i);
                    }
                    depth += 1;
                }
                c if c == close && depth > 0 => {
                    depth -= 1;
                    if depth == 0
                        && let Some(s) = start.take()
                    {
                        spans.push(&text[s..i + c.len_utf8()]);
                    }
                }
                _ => {}
            }
        }

        match start {
            Some(s) if depth > 0 => from = s + open.len_utf8(),
            _ => break,
        }
    }
    spans
}
