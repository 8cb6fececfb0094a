//! Bot-verification interstitials.

use dom_query::Document;

use super::{any_match, char_prefix, PageSnapshot};

/// Lowercased title fragments of verification pages.
pub const CHALLENGE_TITLES: &[&str] = &["just a moment", "attention required"];

/// Elements present only while a challenge runs.
pub const CHALLENGE_SELECTOR: &str = "#challenge-running, #cf-challenge-running, .cf-browser-verification, #challenge-stage, #turnstile-wrapper, [id*=\"challenge\"]";

/// Body phrases of verification pages (case-sensitive).
pub const CHALLENGE_TEXTS: &[&str] = &[
    "Checking your browser",
    "Just a moment",
    "Verify you are human",
    "Enable JavaScript and cookies",
];

/// Only the start of the body text is searched.
pub const CHALLENGE_TEXT_WINDOW: usize = 2000;

/// Whether the page is a bot-verification interstitial.
#[must_use]
pub fn is_challenge(page: &PageSnapshot) -> bool {
    challenge_in(page, &page.document())
}

/// [`is_challenge`] with an already parsed document.
#[must_use]
pub fn challenge_in(page: &PageSnapshot, doc: &Document) -> bool {
    let title = page.title.to_lowercase();
    if CHALLENGE_TITLES.iter().any(|t| title.contains(t)) {
        return true;
    }
    if any_match(doc, CHALLENGE_SELECTOR) {
        return true;
    }
    let head = char_prefix(&page.body_text, CHALLENGE_TEXT_WINDOW);
    CHALLENGE_TEXTS.iter().any(|t| head.contains(t))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(title: &str, body_text: &str, html: &str) -> PageSnapshot {
        PageSnapshot {
            url: "https://site.example/".into(),
            title: title.into(),
            body_text: body_text.into(),
            html: html.into(),
        }
    }

    #[test]
    fn test_title_signal() {
        assert!(is_challenge(&page("Just a moment...", "", "")));
        assert!(is_challenge(&page("Attention Required! | Cloudflare", "", "")));
    }

    #[test]
    fn test_selector_signal() {
        assert!(is_challenge(&page("Site", "", r#"<div id="turnstile-wrapper"></div>"#)));
        assert!(is_challenge(&page("Site", "", r#"<div id="my-challenge-box"></div>"#)));
    }

    #[test]
    fn test_text_signal_only_near_top() {
        assert!(is_challenge(&page("Site", "Verify you are human by completing", "")));
        let late = format!("{}Verify you are human", "x".repeat(CHALLENGE_TEXT_WINDOW));
        assert!(!is_challenge(&page("Site", &late, "")));
    }

    #[test]
    fn test_normal_page() {
        assert!(!is_challenge(&page("Weather today", "Sunny with light wind", "<p>Sunny</p>")));
    }
}
