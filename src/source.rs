//! Original-source detection for aggregator pages.

use dom_query::{Document, Selection};
use url::Url;

use crate::dom;
use crate::url_utils;

/// Attribution links, most specific first.
pub const SOURCE_SELECTORS: &[&str] = &[
    "a[data-t=\"source\"]",
    "a[class*=\"source\"]",
    "a[class*=\"provider\"]",
    "a[class*=\"origin\"]",
    "a[rel=\"author\"][href^=\"http\"]",
];

/// Lowercased link-text fragments pointing at the original.
pub const SOURCE_LINK_TEXTS: &[&str] = &["view original", "read on", "original article", "full article", "source:"];

/// Hint attached to responses that carry an original source.
#[must_use]
pub fn aggregator_hint(source: &str) -> String {
    format!(
        "This page appears to be a news aggregator showing a summary. The original article may be at: {source}. Navigate there for the full content."
    )
}

/// Find the URL of the original article an aggregator page summarizes.
///
/// Checked in order: a canonical link or `og:url` on another host, an
/// attribution link on another non-platform host, then a link whose text
/// reads like "view original" on another host.
#[must_use]
pub fn find_original_source(doc: &Document, page_url: &str) -> Option<String> {
    let page = url_utils::parse_url(page_url)?;
    let elsewhere = |href: &str| -> Option<Url> {
        url_utils::resolve(href, Some(page_url)).filter(|url| url_utils::is_different_host(url, &page))
    };

    let canonical = dom::get_attribute(&doc.select("link[rel=\"canonical\"]"), "href");
    let og_url = dom::get_attribute(&doc.select("meta[property=\"og:url\"]"), "content");
    if let Some(url) = canonical.iter().chain(og_url.iter()).find_map(|href| elsewhere(href)) {
        return Some(url.to_string());
    }

    for selector in SOURCE_SELECTORS {
        let found = doc.select(selector);
        let Some(node) = found.nodes().first() else { continue };
        let Some(href) = dom::get_attribute(&Selection::from(*node), "href") else { continue };
        if let Some(url) = elsewhere(&href).filter(|url| !url_utils::is_platform_host(url)) {
            return Some(url.to_string());
        }
    }

    doc.select("a[href]").nodes().iter().find_map(|node| {
        let link = Selection::from(*node);
        let text = link.text().trim().to_lowercase();
        if !SOURCE_LINK_TEXTS.iter().any(|t| text.contains(t)) {
            return None;
        }
        let href = dom::get_attribute(&link, "href")?;
        elsewhere(&href).map(|url| url.to_string())
    })
}
