//! Marketing-paragraph stripper
//!
//! Dealer pages interleave a fixed promotional paragraph with the real
//! vehicle description. This module removes that paragraph from extracted
//! text before it is handed to the isolation model.

use regex::Regex;
use std::sync::OnceLock;

/// Opening phrase of the known marketing paragraph
const MARKETING_OPENER: &str = "Introducing the All New Greg Hubler Promise:";

fn opener_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!("(?i){}", regex::escape(MARKETING_OPENER))).expect("valid opener pattern")
    })
}

fn break_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)<br\s*/?>|\n").expect("valid break pattern")
    })
}

fn whitespace_run_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\s{2,}").expect("valid whitespace pattern")
    })
}

/// Removes the dealership marketing paragraph from extracted text
///
/// Searches case-insensitively for the known opening phrase. The removed
/// span runs from the phrase's start to the first line break or HTML
/// `<br>` marker after it; if none exists, to the first sentence-ending
/// period; if neither exists, to the end of the text. Afterwards, runs of
/// two or more whitespace characters collapse to a single space and the
/// result is trimmed.
///
/// Only the FIRST occurrence is removed. Repeat occurrences are left in
/// place on the assumption that the boilerplate appears once near the
/// top of a listing; see the unit tests for a record of that behavior.
pub fn strip_marketing_paragraph(text: &str) -> String {
    let Some(opener) = opener_regex().find(text) else {
        return text.to_string();
    };

    let start = opener.start();
    let tail = &text[start..];

    let end = if let Some(break_marker) = break_regex().find(tail) {
        start + break_marker.end()
    } else if let Some(period) = tail.find('.') {
        start + period + 1
    } else {
        text.len()
    };

    tracing::debug!(start, end, "removing marketing paragraph span");

    let cleaned = format!("{}{}", &text[..start], &text[end..]);
    whitespace_run_regex()
        .replace_all(&cleaned, " ")
        .trim()
        .to_string()
}
