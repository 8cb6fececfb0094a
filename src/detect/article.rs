//! "Looks like an article" heuristic.
//!
//! Gates the borderline retry: forms, dashboards and search results should
//! not pay for an extra scroll pass.

use dom_query::Document;

use crate::metadata::json_ld;
use crate::patterns::{DATE_PATH, SLUG_PATH};
use crate::url_utils;

use super::any_match;

/// Signals needed before a page is treated as an article.
pub const ARTICLE_SIGNAL_THRESHOLD: usize = 2;

const SCHEMA_SELECTOR: &str = "[itemprop=\"articleBody\"], [itemtype*=\"Article\"], [itemtype*=\"NewsArticle\"], [itemtype*=\"BlogPosting\"]";
const BYLINE_SELECTOR: &str = "meta[name=\"author\"], meta[property=\"article:published_time\"], time[datetime], [itemprop=\"author\"], [itemprop=\"datePublished\"]";

/// Count the article signals present (0 to 5).
///
/// 1. an `<article>` element;
/// 2. Schema.org article microdata or JSON-LD;
/// 3. `og:type=article`;
/// 4. author or publication-date markup;
/// 5. a date-like or long-slug URL path.
#[must_use]
pub fn article_signals(doc: &Document, url: &str) -> usize {
    let og_article = doc
        .select("meta[property=\"og:type\"]")
        .attr("content")
        .is_some_and(|t| t.trim().eq_ignore_ascii_case("article"));
    let path = url_utils::parse_url(url).map(|u| u.path().to_string()).unwrap_or_default();

    [
        any_match(doc, "article"),
        any_match(doc, SCHEMA_SELECTOR) || json_ld::extract_json_ld(doc).has_article,
        og_article,
        any_match(doc, BYLINE_SELECTOR),
        DATE_PATH.is_match(&path) || SLUG_PATH.is_match(&path),
    ]
    .into_iter()
    .filter(|present| *present)
    .count()
}

/// Whether the page carries at least [`ARTICLE_SIGNAL_THRESHOLD`] signals.
#[must_use]
pub fn looks_like_article(doc: &Document, url: &str) -> bool {
    article_signals(doc, url) >= ARTICLE_SIGNAL_THRESHOLD
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom;

    #[test]
    fn test_each_signal_counts_once() {
        let doc = dom::parse(
            r#"<html><head><meta property="og:type" content="Article"><meta name="author" content="A">
            <script type="application/ld+json">{"@type":"NewsArticle"}</script></head>
            <body><article><time datetime="2024-01-01">x</time></article></body></html>"#,
        );
        assert_eq!(article_signals(&doc, "https://n.example/2024/01/rain"), 5);
    }

    #[test]
    fn test_slug_url_and_article_tag() {
        let doc = dom::parse("<body><article><p>x</p></article></body>");
        assert!(looks_like_article(&doc, "https://blog.example/how-we-rebuilt-search"));
        assert!(!looks_like_article(&doc, "https://blog.example/about"));
    }

    #[test]
    fn test_dashboard_is_not_article() {
        let doc = dom::parse("<body><div id=\"app\"><form><input></form></div></body>");
        assert_eq!(article_signals(&doc, "https://app.example/dashboard"), 0);
    }
}
