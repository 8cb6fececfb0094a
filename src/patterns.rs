//! Compiled regex patterns for content extraction.
//!
//! All patterns are compiled once at first use via `LazyLock`. They are
//! grouped by the stage of the pipeline that consumes them.

#![allow(clippy::expect_used)]

use std::sync::LazyLock;

use regex::Regex;

// =============================================================================
// Class / id patterns
// =============================================================================

/// Class/id names likely to hold main content.
pub static POSITIVE_CLASS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)article|body|content|entry|hentry|h-entry|main|page|pagination|post|text|blog|story|paragraph|prose",
    )
    .expect("POSITIVE_CLASS regex")
});

/// Class/id names indicating boilerplate.
///
/// `nav` and `menu` are word-bounded so that `navigate` or `menuitem-content`
/// do not trip it.
pub static NEGATIVE_CLASS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)combx|comment|contact|foot|footer|footnote|masthead|outbrain|promo|related|shoutbox|sidebar|sponsor|shopping|\bnav\b|\bmenu\b|breadcrumb|crumb|pagination|pager|popup|modal|overlay|cookie|consent|newsletter|subscribe|signup",
    )
    .expect("NEGATIVE_CLASS regex")
});

/// Advertising and tracking class/id names, whole words only.
///
/// `loading` and `heading` must not match `ad`.
pub static AD_CLASS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:ad|ads|advert|advertisement|adsense|ad-slot|ad-wrapper|banner-ad|sponsored|sponsor|tracking|tracker|social-share|share-buttons|cookie-banner|cookie-notice|newsletter-signup|popup-overlay)\b",
    )
    .expect("AD_CLASS regex")
});

// =============================================================================
// URL patterns
// =============================================================================

/// Date-like path segment such as `/2024/05`.
pub static DATE_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/\d{4}/\d{1,2}").expect("DATE_PATH regex"));

/// Long slug path segment such as `/how-we-rebuilt-the-index`.
pub static SLUG_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/[a-z0-9-]{15,}").expect("SLUG_PATH regex"));

// =============================================================================
// Whitespace patterns
// =============================================================================

/// Any whitespace run.
pub static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("WHITESPACE regex"));

/// Whitespace runs that do not contain a newline.
pub static INLINE_WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\S\n]+").expect("INLINE_WHITESPACE regex"));

/// Spaces and tabs only.
pub static SPACES_TABS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t]+").expect("SPACES_TABS regex"));

/// Three or more consecutive newlines.
pub static EXCESS_NEWLINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("EXCESS_NEWLINES regex"));

// =============================================================================
// Markup patterns
// =============================================================================

/// Code language hint in a class list (`language-rust`, `lang-py`).
pub static CODE_LANGUAGE_CLASS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|\s)(?:language|lang)-([^\s]+)").expect("CODE_LANGUAGE_CLASS regex")
});

/// Collapse whitespace runs to single spaces and trim.
#[must_use]
pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text, " ").trim().to_string()
}
