//! Best-effort page metadata.
//!
//! Each field is taken from the first source that has it:
//!
//! | field | sources |
//! |---|---|
//! | title | `og:title`, `<title>`, JSON-LD headline |
//! | description | meta description, `og:description`, JSON-LD |
//! | author | meta author, `rel=author`, `itemprop=author`, `.author`, JSON-LD person |
//! | published date | `article:published_time`, `time[datetime]`, `itemprop=datePublished`, JSON-LD |
//! | canonical URL | `link[rel=canonical]`, `og:url`, page URL |
//! | language | `html[lang]` |
//! | site name | `og:site_name`, JSON-LD organization |

pub mod dom_extraction;
pub mod json_ld;
pub mod meta_tags;

use dom_query::Document;

use crate::result::Metadata;
use crate::url_utils;

pub use json_ld::{extract_json_ld, LinkedData};
pub use meta_tags::{normalize_date, parse_date, MetaTags};

/// Extract metadata from a parsed page.
///
/// Must run before noise removal, which drops `<script>` and `<aside>`
/// elements that carry JSON-LD and bylines. `page_url` resolves a relative
/// canonical link and is the last canonical fallback.
#[must_use]
pub fn extract_metadata(doc: &Document, page_url: Option<&str>) -> Metadata {
    let meta = MetaTags::collect(doc);
    let linked = extract_json_ld(doc);

    let title = meta
        .get("og:title")
        .or_else(|| dom_extraction::title_element(doc))
        .or(linked.headline);
    let description = meta
        .first_of(&["description", "og:description"])
        .or(linked.description);
    let author = meta
        .get("author")
        .or_else(|| dom_extraction::dom_author(doc))
        .or(linked.author);
    let published_date = meta
        .get("article:published_time")
        .or_else(|| dom_extraction::dom_date(doc))
        .or(linked.date_published)
        .map(|raw| normalize_date(&raw));
    let canonical_url = dom_extraction::canonical_link(doc)
        .or_else(|| meta.get("og:url"))
        .map(|href| {
            url_utils::resolve(&href, page_url).map_or(href, |url| url.to_string())
        })
        .or_else(|| page_url.map(str::to_string));
    let site_name = meta.get("og:site_name").or(linked.site_name);

    Metadata {
        title,
        description,
        author,
        published_date,
        canonical_url,
        language: dom_extraction::document_language(doc),
        site_name,
    }
}
