//! Page classifiers.
//!
//! All detectors are pure functions over a [`PageSnapshot`] so that they can
//! be exercised without a live session.

pub mod article;
pub mod blocked;
pub mod challenge;

pub use article::{article_signals, looks_like_article, ARTICLE_SIGNAL_THRESHOLD};
pub use blocked::detect_blocked;
pub use challenge::is_challenge;

use dom_query::Document;

use crate::dom;

/// What the detectors see of a page at one instant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageSnapshot {
    /// Current URL.
    pub url: String,
    /// Document title.
    pub title: String,
    /// Rendered text of `<body>`.
    pub body_text: String,
    /// Rendered DOM serialization.
    pub html: String,
}

impl PageSnapshot {
    /// Parse the rendered HTML for selector checks.
    #[must_use]
    pub fn document(&self) -> Document {
        dom::parse(&self.html)
    }
}

/// True when at least one element matches `selector`.
pub(crate) fn any_match(doc: &Document, selector: &str) -> bool {
    doc.select(selector).length() > 0
}

/// Prefix of `text` holding at most `max_chars` characters.
pub(crate) fn char_prefix(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_char_prefix_respects_boundaries() {
        assert_eq!(char_prefix("héllo", 2), "hé");
        assert_eq!(char_prefix("abc", 10), "abc");
    }
}
