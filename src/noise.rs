//! Noise removal shared by both scoring strategies.
//!
//! Removes elements that cannot be article content: boilerplate tags,
//! page chrome, ad/tracking containers, low-density negative containers and
//! small hidden elements. Large hidden blocks survive because collapsed
//! "read more" sections are hidden but hold the article text.

use dom_query::{Document, NodeRef, Selection};
use tracing::trace;

use crate::dom;
use crate::patterns::{AD_CLASS, NEGATIVE_CLASS};

/// Tags removed together with their content.
pub const BOILERPLATE_TAGS: &[&str] = &["script", "style", "noscript", "iframe", "svg", "form"];

/// Page chrome removed unconditionally.
pub const STRUCTURAL_TAGS: &[&str] = &["footer", "nav", "aside"];

/// Landmarks whose headers are kept.
const HEADER_KEEPERS: &[&str] = &["article", "main"];

/// Negative-class elements below this content density are removed.
pub const NEGATIVE_DENSITY_CUTOFF: f64 = 0.3;

/// Hidden elements with more text than this are kept.
pub const HIDDEN_TEXT_KEEP: usize = 80;

/// Why an element was classified as noise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoiseReason {
    /// script/style/noscript/iframe/svg/form.
    Boilerplate,
    /// footer/nav/aside, or a page-level header.
    Structural,
    /// Class or id matched the ad/tracking pattern.
    Advertising,
    /// Negative class or id with low content density.
    NegativeLowDensity,
    /// Hidden with little text.
    Hidden,
}

/// Classify a single element.
///
/// Returns `None` for elements that should stay.
#[must_use]
pub fn classify(node: &NodeRef) -> Option<NoiseReason> {
    let tag = dom::node_tag(node)?;
    if matches!(tag.as_str(), "html" | "head" | "body") {
        return None;
    }
    if BOILERPLATE_TAGS.contains(&tag.as_str()) {
        return Some(NoiseReason::Boilerplate);
    }
    if STRUCTURAL_TAGS.contains(&tag.as_str()) {
        return Some(NoiseReason::Structural);
    }
    if tag == "header" && !dom::has_ancestor_tag(node, HEADER_KEEPERS) {
        return Some(NoiseReason::Structural);
    }

    let sel = Selection::from(*node);
    let class_id = dom::class_id(&sel);
    if !class_id.is_empty() {
        if AD_CLASS.is_match(&class_id) {
            return Some(NoiseReason::Advertising);
        }
        if NEGATIVE_CLASS.is_match(&class_id) && dom::content_density(&sel) < NEGATIVE_DENSITY_CUTOFF
        {
            return Some(NoiseReason::NegativeLowDensity);
        }
    }

    if dom::is_hidden(&sel) && dom::text_len(&sel) <= HIDDEN_TEXT_KEEP {
        return Some(NoiseReason::Hidden);
    }

    None
}

/// Remove noise from a document in place.
///
/// Runs classification passes until one removes nothing, so calling it again
/// on its own output is a no-op. Returns the number of elements removed.
pub fn remove_noise(doc: &Document) -> usize {
    let mut removed = 0;
    loop {
        let doomed: Vec<NodeRef> = doc
            .select("*")
            .nodes()
            .iter()
            .filter(|node| classify(node).is_some())
            .copied()
            .collect();
        if doomed.is_empty() {
            break;
        }
        removed += doomed.len();
        for node in doomed {
            Selection::from(node).remove();
        }
    }
    trace!(target: "harvest.extract", removed, "noise removed");
    removed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cleaned(html: &str) -> Document {
        let doc = dom::parse(html);
        remove_noise(&doc);
        doc
    }

    #[test]
    fn test_boilerplate_and_structural_tags_removed() {
        let doc = cleaned(
            "<body><script>x()</script><nav>menu</nav><aside>side</aside>\
             <footer>foot</footer><form><input></form><p>KEEP</p></body>",
        );
        let text = doc.select("body").text();
        assert!(text.contains("KEEP"));
        assert_eq!(doc.select("script, nav, aside, footer, form").length(), 0);
    }

    #[test]
    fn test_header_kept_inside_article() {
        let doc = cleaned(
            "<body><header>SITE_HEADER</header><article><header>ARTICLE_HEADER</header>\
             <p>body</p></article><main><div><header>MAIN_HEADER</header></div></main></body>",
        );
        let text = doc.select("body").text();
        assert!(!text.contains("SITE_HEADER"));
        assert!(text.contains("ARTICLE_HEADER"));
        assert!(text.contains("MAIN_HEADER"));
    }

    #[test]
    fn test_ad_pattern_whole_word_only() {
        let doc = cleaned(
            r#"<body><div class="ad">AD_TEXT</div><div class="loading-box">LOADING_TEXT</div>
               <div id="heading">HEADING_TEXT</div></body>"#,
        );
        let text = doc.select("body").text();
        assert!(!text.contains("AD_TEXT"));
        assert!(text.contains("LOADING_TEXT"));
        assert!(text.contains("HEADING_TEXT"));
    }

    #[test]
    fn test_negative_class_kept_when_dense() {
        let prose = "This widget is actually the article body and it holds long prose. ".repeat(5);
        let html = format!(
            r#"<body><div class="sidebar-widget">{prose}</div>
               <div class="sidebar"><a href="/a"><span><i>x</i></span></a><a href="/b"><span><i>y</i></span></a></div></body>"#
        );
        let doc = cleaned(&html);
        assert_eq!(doc.select(".sidebar-widget").length(), 1);
        assert_eq!(doc.select(".sidebar").length(), 0);
    }

    #[test]
    fn test_hidden_kept_when_text_heavy() {
        let long = "Collapsed article continuation that is hidden until expanded. ".repeat(3);
        let html = format!(
            r#"<body><div style="display:none" id="long">{long}</div>
               <div style="display: none" id="short">Close</div>
               <span aria-hidden="true" id="icon">*</span></body>"#
        );
        let doc = cleaned(&html);
        assert_eq!(doc.select("#long").length(), 1);
        assert_eq!(doc.select("#short").length(), 0);
        assert_eq!(doc.select("#icon").length(), 0);
    }

    #[test]
    fn test_idempotent() {
        let html = r#"<body><header>h</header><div class="comments"><p>c</p></div>
            <article><header>t</header><div class="ad-wrapper">ad</div><p>Article text here.</p>
            <div class="related" style="display:none">r</div></article></body>"#;
        let doc = dom::parse(html);
        let first = remove_noise(&doc);
        assert!(first > 0);
        let snapshot = doc.html().to_string();
        assert_eq!(remove_noise(&doc), 0);
        assert_eq!(doc.html().to_string(), snapshot);
    }
}
