//! Metadata fallbacks read from the document body and head elements.

use std::sync::LazyLock;

use dom_query::{Document, Selection};
use regex::Regex;

use crate::dom;

/// Byline prefixes stripped from author text.
#[allow(clippy::expect_used)]
static BYLINE_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*(written\s+)?by[:\s]+").expect("valid regex"));

/// Author fallbacks in priority order.
const AUTHOR_SELECTORS: &[&str] = &["[rel=\"author\"]", "[itemprop=\"author\"]", ".author"];

/// Bylines longer than this are prose, not a name.
const MAX_AUTHOR_CHARS: usize = 100;

fn first_text(doc: &Document, selector: &str) -> Option<String> {
    doc.select(selector).nodes().iter().find_map(|node| {
        let text = dom::collapsed_text(&Selection::from(*node));
        (!text.is_empty()).then_some(text)
    })
}

/// Text of the `<title>` element.
#[must_use]
pub fn title_element(doc: &Document) -> Option<String> {
    first_text(doc, "head title").or_else(|| first_text(doc, "title"))
}

/// Byline from `rel=author`, `itemprop=author` or `.author`.
#[must_use]
pub fn dom_author(doc: &Document) -> Option<String> {
    AUTHOR_SELECTORS.iter().find_map(|selector| {
        let sel = doc.select(selector);
        let node = sel.nodes().first()?;
        let node_sel = Selection::from(*node);
        // itemprop=author may sit on a <meta> or wrap a name element
        let text = dom::get_attribute(&node_sel, "content")
            .unwrap_or_else(|| dom::collapsed_text(&node_sel));
        let name = BYLINE_PREFIX.replace(text.trim(), "").trim().to_string();
        (!name.is_empty() && name.chars().count() <= MAX_AUTHOR_CHARS).then_some(name)
    })
}

/// Raw publication date from `time[datetime]` or `itemprop=datePublished`.
#[must_use]
pub fn dom_date(doc: &Document) -> Option<String> {
    let from_time = doc.select("time[datetime]").nodes().iter().find_map(|node| {
        dom::get_attribute(&Selection::from(*node), "datetime").filter(|d| !d.trim().is_empty())
    });
    from_time.or_else(|| {
        let sel = doc.select("[itemprop=\"datePublished\"]");
        let node = Selection::from(*sel.nodes().first()?);
        dom::get_attribute(&node, "datetime")
            .or_else(|| dom::get_attribute(&node, "content"))
            .or_else(|| Some(dom::collapsed_text(&node)))
            .filter(|d| !d.trim().is_empty())
    })
}

/// `href` of `link[rel=canonical]`.
#[must_use]
pub fn canonical_link(doc: &Document) -> Option<String> {
    let sel = doc.select("link[rel=\"canonical\"]");
    dom::get_attribute(&sel, "href")
        .map(|href| href.trim().to_string())
        .filter(|href| !href.is_empty())
}

/// `lang` attribute of the root element.
#[must_use]
pub fn document_language(doc: &Document) -> Option<String> {
    dom::get_attribute(&doc.select("html"), "lang")
        .map(|lang| lang.trim().to_string())
        .filter(|lang| !lang.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_author_fallback_order() {
        let doc = dom::parse(
            r#"<body><span class="author">By Someone Else</span><a rel="author" href="/p">Jane Roe</a></body>"#,
        );
        assert_eq!(dom_author(&doc).as_deref(), Some("Jane Roe"));

        let doc = dom::parse(r#"<body><div class="author">Written by  Sam Lee</div></body>"#);
        assert_eq!(dom_author(&doc).as_deref(), Some("Sam Lee"));
    }

    #[test]
    fn test_date_sources() {
        let doc = dom::parse(r#"<body><time datetime="2023-07-01">July</time></body>"#);
        assert_eq!(dom_date(&doc).as_deref(), Some("2023-07-01"));

        let doc = dom::parse(r#"<body><span itemprop="datePublished" content="2022-02-02">Feb</span></body>"#);
        assert_eq!(dom_date(&doc).as_deref(), Some("2022-02-02"));
    }

    #[test]
    fn test_title_canonical_language() {
        let doc = dom::parse(
            r#"<html lang="en-GB"><head><title> A  Title </title><link rel="canonical" href="https://x.example/a"></head></html>"#,
        );
        assert_eq!(title_element(&doc).as_deref(), Some("A Title"));
        assert_eq!(canonical_link(&doc).as_deref(), Some("https://x.example/a"));
        assert_eq!(document_language(&doc).as_deref(), Some("en-GB"));
    }
}
