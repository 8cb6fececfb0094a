//! DOM Operations Adapter
//!
//! Thin helpers over `dom_query` that both scoring strategies, the noise
//! filter and the formatters share. Everything that measures an element
//! (text length, link density, content density, paragraph count) lives here
//! so the two strategies cannot drift apart.

pub use dom_query::{Document, NodeRef, Selection};
pub use tendril::StrTendril;

/// Tags whose text-bearing descendants count as paragraphs.
pub const PARAGRAPH_SELECTOR: &str = "p, li, td, th, dd, dt, blockquote";

/// Minimum trimmed length for a block to count as a paragraph.
pub const MIN_PARAGRAPH_CHARS: usize = 15;

// === Attribute Operations ===

/// Get any attribute value
#[inline]
#[must_use]
pub fn get_attribute(sel: &Selection, name: &str) -> Option<String> {
    sel.attr(name).map(|s| s.to_string())
}

/// Class and id joined by a space, for pattern matching.
#[must_use]
pub fn class_id(sel: &Selection) -> String {
    let class = sel.attr("class").map(|s| s.to_string()).unwrap_or_default();
    let id = sel.attr("id").map(|s| s.to_string()).unwrap_or_default();
    format!("{class} {id}").trim().to_string()
}

/// Lowercased attribute value, empty when absent.
#[must_use]
pub fn attr_lower(sel: &Selection, name: &str) -> String {
    sel.attr(name)
        .map(|s| s.trim().to_ascii_lowercase())
        .unwrap_or_default()
}

// === Tag/Node Information ===

/// Lowercase tag name of an element node.
#[must_use]
pub fn node_tag(node: &NodeRef) -> Option<String> {
    if !node.is_element() {
        return None;
    }
    node.node_name().map(|t| t.to_ascii_lowercase())
}

/// True for `body`, `html` and non-element parents (the document root).
#[must_use]
pub fn is_boundary(node: &NodeRef) -> bool {
    match node_tag(node) {
        Some(tag) => tag == "body" || tag == "html",
        None => true,
    }
}

/// Nearest element parent of a node.
#[must_use]
pub fn parent_element<'a>(node: &NodeRef<'a>) -> Option<NodeRef<'a>> {
    node.parent().filter(NodeRef::is_element)
}

/// True when any ancestor has one of the given tags.
#[must_use]
pub fn has_ancestor_tag(node: &NodeRef, tags: &[&str]) -> bool {
    let mut current = node.parent();
    while let Some(parent) = current {
        if let Some(tag) = node_tag(&parent) {
            if tags.contains(&tag.as_str()) {
                return true;
            }
        }
        current = parent.parent();
    }
    false
}

// === Text Content ===

/// Get all text content of node and descendants
///
/// Returns `StrTendril` for zero-copy passing. Use `.to_string()` only when
/// you need owned storage.
#[inline]
#[must_use]
pub fn text_content(sel: &Selection) -> StrTendril {
    sel.text()
}

/// Trimmed character count of an element's text.
#[must_use]
pub fn text_len(sel: &Selection) -> usize {
    sel.text().trim().chars().count()
}

/// Text with whitespace runs collapsed.
#[must_use]
pub fn collapsed_text(sel: &Selection) -> String {
    crate::patterns::collapse_whitespace(&sel.text())
}

/// Get inner HTML content
#[inline]
#[must_use]
pub fn inner_html(sel: &Selection) -> StrTendril {
    sel.inner_html()
}

/// Get outer HTML content
#[inline]
#[must_use]
pub fn outer_html(sel: &Selection) -> StrTendril {
    sel.html()
}

// === Measurements ===

/// Ratio of anchor text to total text.
///
/// An element with no text has density 1.0 so that empty wrappers never
/// look like content.
#[must_use]
pub fn link_density(sel: &Selection) -> f64 {
    let total = text_len(sel);
    if total == 0 {
        return 1.0;
    }
    let link_chars: usize = sel.select("a").iter().map(|a| text_len(&a)).sum();
    link_chars as f64 / total as f64
}

/// Ratio of text length to serialized markup length.
#[must_use]
pub fn content_density(sel: &Selection) -> f64 {
    let markup = sel.html().chars().count();
    if markup == 0 {
        return 0.0;
    }
    text_len(sel) as f64 / markup as f64
}

/// Count text-bearing blocks with at least `MIN_PARAGRAPH_CHARS` characters.
#[must_use]
pub fn paragraph_count(sel: &Selection) -> usize {
    sel.select(PARAGRAPH_SELECTOR)
        .iter()
        .filter(|block| text_len(block) >= MIN_PARAGRAPH_CHARS)
        .count()
}

/// Hidden via inline style or `aria-hidden`.
#[must_use]
pub fn is_hidden(sel: &Selection) -> bool {
    if attr_lower(sel, "aria-hidden") == "true" {
        return true;
    }
    let style: String = attr_lower(sel, "style")
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    style.contains("display:none") || style.contains("visibility:hidden")
}

// === Parsing ===

/// Parse HTML string into document
#[inline]
#[must_use]
pub fn parse(html: &str) -> Document {
    Document::from(html)
}

/// The `<body>` of a document, or the whole document when absent.
#[must_use]
pub fn body(doc: &Document) -> Selection<'_> {
    let body = doc.select("body");
    if body.length() > 0 {
        body
    } else {
        doc.select("html")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_id_joins_attributes() {
        let doc = parse(r#"<div id="main" class="container wide">x</div>"#);
        assert_eq!(class_id(&doc.select("div")), "container wide main");
    }

    #[test]
    fn test_link_density() {
        let doc = parse(r#"<div><a href="/">abcde</a>fghij</div>"#);
        let density = link_density(&doc.select("div"));
        assert!((density - 0.5).abs() < 1e-9);

        let doc = parse("<div>   </div>");
        assert_eq!(link_density(&doc.select("div")), 1.0);
    }

    #[test]
    fn test_paragraph_count_requires_min_length() {
        let doc = parse(
            "<div><p>short</p><p>this one is long enough</p><li>another long list item</li></div>",
        );
        assert_eq!(paragraph_count(&doc.select("div")), 2);
    }

    #[test]
    fn test_is_hidden_variants() {
        let doc = parse(
            r#"<div id="a" style="display: none">x</div>
               <div id="b" style="VISIBILITY:hidden">x</div>
               <div id="c" aria-hidden="true">x</div>
               <div id="d" style="color:red">x</div>"#,
        );
        assert!(is_hidden(&doc.select("#a")));
        assert!(is_hidden(&doc.select("#b")));
        assert!(is_hidden(&doc.select("#c")));
        assert!(!is_hidden(&doc.select("#d")));
    }

    #[test]
    fn test_has_ancestor_tag() {
        let doc = parse("<article><div><header>t</header></div></article><header>p</header>");
        let headers = doc.select("header");
        let nodes = headers.nodes();
        assert!(has_ancestor_tag(&nodes[0], &["article", "main"]));
        assert!(!has_ancestor_tag(&nodes[1], &["article", "main"]));
    }
}
