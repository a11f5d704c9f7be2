//! Documentation string cleanup for generated artifacts
//!
//! Titles and descriptions come straight from the API document. Before they
//! are attached to an artifact they are normalized so a code printer can drop
//! them into a doc comment without further escaping decisions.

use once_cell::sync::Lazy;
use regex::Regex;

/// Column at which long documentation lines are wrapped.
pub const DOC_WRAP_WIDTH: usize = 100;

static UNICODE_PUNCTUATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\u{2018}\u{2019}\u{201C}\u{201D}\u{2013}\u{2014}]").unwrap());
static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]+").unwrap());

/// Normalizes a documentation string.
///
/// - Replaces smart quotes and dashes with their ASCII counterparts
/// - Collapses runs of spaces and tabs inside each line
/// - Trims every line and drops leading/trailing blank lines
/// - Collapses consecutive blank lines into a single paragraph break
///
/// # Examples
/// ```
/// use sdkforge::generation::sanitizers::sanitize_doc;
///
/// let output = sanitize_doc("  A \u{201C}quoted\u{201D}   word  ");
/// assert_eq!(output, "A \"quoted\" word");
/// ```
pub fn sanitize_doc(input: &str) -> String {
    let mut lines: Vec<String> = Vec::new();

    for line in input.lines() {
        let replaced = UNICODE_PUNCTUATION.replace_all(line, |caps: &regex::Captures| {
            match &caps[0] {
                "\u{2018}" | "\u{2019}" => "'",
                "\u{201C}" | "\u{201D}" => "\"",
                _ => "-",
            }
        });
        let collapsed = WHITESPACE_RUN.replace_all(replaced.trim(), " ").to_string();

        if collapsed.is_empty() && lines.last().is_none_or(|l| l.is_empty()) {
            continue;
        }
        lines.push(collapsed);
    }

    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }

    lines.join("\n")
}

/// Wraps each line of `input` at `width` columns on word boundaries.
///
/// Words longer than `width` are kept intact on their own line.
pub fn wrap_long_lines(input: &str, width: usize) -> String {
    input
        .lines()
        .map(|line| wrap_line(line, width))
        .collect::<Vec<_>>()
        .join("\n")
}

fn wrap_line(line: &str, width: usize) -> String {
    let mut wrapped = Vec::new();
    let mut current = String::new();

    for word in line.split_whitespace() {
        if !current.is_empty() && current.len() + 1 + word.len() > width {
            wrapped.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    wrapped.push(current);

    wrapped.join("\n")
}

/// Sanitizes and wraps an optional documentation string.
///
/// Returns `None` when nothing is left after sanitizing.
pub fn doc_text(input: Option<&str>) -> Option<String> {
    let cleaned = sanitize_doc(input?);
    if cleaned.is_empty() {
        None
    } else {
        Some(wrap_long_lines(&cleaned, DOC_WRAP_WIDTH))
    }
}
