//! HTML content extraction
//!
//! `extract` is the whole pipeline: raw HTML is parsed into an immutable
//! [`Document`], non-content subtrees are removed by [`sanitize`], the rest is
//! written out by [`linearize`] and the result is passed through
//! [`normalize_whitespace`]. Every step is pure and infallible; input that is
//! not markup at all degrades to an empty string.

mod document;
mod linearize;
mod sanitize;

pub use document::{Document, Element, NodeData, NodeId};
pub use linearize::linearize;
pub use sanitize::sanitize;

use crate::types::OutputMode;

/// Share of control/replacement characters above which input is treated as binary
const BINARY_CHAR_RATIO: f64 = 0.1;

/// Extract content from raw HTML in the requested output mode
///
/// [`OutputMode::Html`] returns the input byte for byte.
pub fn extract(raw_html: &str, mode: OutputMode) -> String {
    match mode {
        OutputMode::Html => raw_html.to_string(),
        OutputMode::Text | OutputMode::Markdown => {
            if !looks_like_markup(raw_html) {
                return String::new();
            }
            let doc = sanitize(&Document::parse(raw_html));
            normalize_whitespace(&linearize(&doc, mode))
        }
    }
}

/// Convert HTML to Markdown
pub fn html_to_markdown(html: &str) -> String {
    extract(html, OutputMode::Markdown)
}

/// Convert HTML to plain text
pub fn html_to_text(html: &str) -> String {
    extract(html, OutputMode::Text)
}

/// Text of the first `<title>` element, whitespace collapsed
pub fn page_title(raw_html: &str) -> Option<String> {
    if !looks_like_markup(raw_html) {
        return None;
    }
    let doc = Document::parse(raw_html);
    let title = doc.find("title").map(|id| doc.text_content(id))?;
    let title = title.split_whitespace().collect::<Vec<_>>().join(" ");
    (!title.is_empty()).then_some(title)
}

/// Final whitespace pass
///
/// Trims trailing whitespace on every line, collapses runs of blank lines to
/// one and strips the whole result. Applying it twice changes nothing.
pub fn normalize_whitespace(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut blank_run = false;

    for line in s.lines() {
        let line = line.trim_end();
        if line.is_empty() {
            blank_run = true;
            continue;
        }
        if result.is_empty() {
            result.push_str(line.trim_start());
        } else {
            result.push_str(if blank_run { "\n\n" } else { "\n" });
            result.push_str(line);
        }
        blank_run = false;
    }

    result
}

/// False for empty input and for binary payloads
fn looks_like_markup(raw: &str) -> bool {
    if raw.trim().is_empty() || raw.contains('\0') {
        return false;
    }

    let mut total = 0usize;
    let mut suspicious = 0usize;
    for c in raw.chars() {
        total += 1;
        if c == char::REPLACEMENT_CHARACTER || (c.is_control() && !c.is_whitespace()) {
            suspicious += 1;
        }
    }

    (suspicious as f64) / (total as f64) <= BINARY_CHAR_RATIO
}
