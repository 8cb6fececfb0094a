//! Landmark lookup, ancestor expansion and candidate arbitration.
//!
//! Inline advertising often splits one article into sibling subtrees, so the
//! best single container may be a fragment. Expansion climbs towards a
//! wrapper that holds clearly more article; the pool then prefers the
//! longest reasonable candidate so a short summary box never wins over the
//! full body elsewhere on the page.

use std::collections::HashSet;

use dom_query::{NodeId, NodeRef, Selection};

use crate::dom;
use crate::patterns::NEGATIVE_CLASS;
use crate::result::Method;
use crate::scoring::{self, WalkConfig, MIN_CONTENT_CHARS};

/// Landmark selectors in priority order.
pub const LANDMARK_SELECTORS: &[&str] = &["[itemprop=\"articleBody\"]", "article", "[role=\"main\"]", "main"];

/// Parent levels considered by expansion.
pub const MAX_EXPANSION_LEVELS: usize = 3;

/// A parent must have this many times the paragraphs to be adopted.
pub const EXPANSION_PARAGRAPH_RATIO: f64 = 1.4;

/// A parent must have this many times the text to be adopted.
pub const EXPANSION_TEXT_RATIO: f64 = 1.2;

/// Link density ceiling for expansion parents and pool members.
pub const MAX_POOL_LINK_DENSITY: f64 = 0.55;

/// Pool members need at least this much text.
pub const MIN_POOL_CHARS: usize = 100;

/// A pool member this long wins outright.
pub const ARTICLE_CHARS: usize = 800;

/// Scored candidates entering the pool.
pub const POOL_TOP_SCORED: usize = 5;

/// The scored candidate must beat the landmark by this factor.
pub const SCORED_OVER_LANDMARK: f64 = 1.3;

/// Floor for preferring either candidate on its own.
pub const SUBSTANTIAL_CHARS: usize = 200;

/// Result of walking up from a candidate.
#[derive(Debug, Clone, Copy)]
pub struct Expansion<'a> {
    /// The adopted container.
    pub node: NodeRef<'a>,
    /// Parent levels inspected.
    pub levels_walked: usize,
    /// Parent levels adopted.
    pub levels_adopted: usize,
}

/// First non-trivial landmark under `root`.
#[must_use]
pub fn semantic_landmark<'a>(root: &Selection<'a>) -> Option<NodeRef<'a>> {
    LANDMARK_SELECTORS.iter().find_map(|selector| {
        let found = root.select(selector);
        let node = *found.nodes().first()?;
        (dom::text_len(&Selection::from(node)) >= MIN_CONTENT_CHARS).then_some(node)
    })
}

/// Walk up to three parents, adopting each one that holds clearly more
/// article content. Stops at the first parent that does not qualify and never
/// crosses a `body`/`html` boundary.
#[must_use]
pub fn expand_candidate(node: NodeRef<'_>) -> Expansion<'_> {
    let sel = Selection::from(node);
    let mut best_paragraphs = dom::paragraph_count(&sel) as f64;
    let mut best_len = dom::text_len(&sel) as f64;
    let mut expansion = Expansion {
        node,
        levels_walked: 0,
        levels_adopted: 0,
    };

    let mut current = node;
    while expansion.levels_walked < MAX_EXPANSION_LEVELS {
        let Some(parent) = current.parent() else { break };
        if dom::is_boundary(&parent) {
            break;
        }
        expansion.levels_walked += 1;

        let parent_sel = Selection::from(parent);
        if NEGATIVE_CLASS.is_match(&dom::class_id(&parent_sel))
            || dom::link_density(&parent_sel) > MAX_POOL_LINK_DENSITY
        {
            break;
        }
        let paragraphs = dom::paragraph_count(&parent_sel) as f64;
        let len = dom::text_len(&parent_sel) as f64;
        if paragraphs < best_paragraphs * EXPANSION_PARAGRAPH_RATIO
            || len < best_len * EXPANSION_TEXT_RATIO
        {
            break;
        }

        expansion.node = parent;
        expansion.levels_adopted += 1;
        best_paragraphs = paragraphs;
        best_len = len;
        current = parent;
    }
    expansion
}

/// The winning container, or `None` for the body fallback.
#[derive(Debug, Clone, Copy)]
pub struct Choice<'a> {
    /// Chosen container.
    pub node: Option<NodeRef<'a>>,
    /// How it was chosen.
    pub method: Method,
}

#[derive(Debug, Clone, Copy)]
struct PoolEntry<'a> {
    node: NodeRef<'a>,
    len: usize,
    method: Method,
}

/// Choose the main-content container under `root`.
///
/// Order of preference:
/// 1. the longest pool member when it reaches 800 chars;
/// 2. the scored candidate when it beats the landmark by 30% and has 200 chars;
/// 3. the landmark when it has 200 chars;
/// 4. whichever of the two has at least 50 chars, scored first when longer;
/// 5. the body.
#[must_use]
pub fn choose<'a>(root: &Selection<'a>, walk: WalkConfig) -> Choice<'a> {
    let semantic = semantic_landmark(root).map(|node| expand_candidate(node).node);
    let semantic_len = semantic.map_or(0, |n| dom::text_len(&Selection::from(n)));

    let scored = scoring::score_candidates(root, walk);
    let scored_best = scored
        .first()
        .filter(|c| c.score > 0.0)
        .map(|c| expand_candidate(c.node).node);
    let scored_len = scored_best.map_or(0, |n| dom::text_len(&Selection::from(n)));

    let mut pool: Vec<PoolEntry<'a>> = Vec::new();
    let mut seen: HashSet<NodeId> = HashSet::new();
    let mut offer = |node: NodeRef<'a>, method: Method| {
        if !seen.insert(node.id) {
            return;
        }
        let sel = Selection::from(node);
        let len = dom::text_len(&sel);
        if len >= MIN_POOL_CHARS && dom::link_density(&sel) <= MAX_POOL_LINK_DENSITY {
            pool.push(PoolEntry { node, len, method });
        }
    };
    if let Some(node) = semantic {
        offer(node, Method::SemanticLandmark);
    }
    for candidate in scored.iter().filter(|c| c.score > 0.0).take(POOL_TOP_SCORED) {
        offer(expand_candidate(candidate.node).node, Method::Scoring);
    }

    let longest = pool
        .iter()
        .fold(None::<PoolEntry<'a>>, |best, entry| match best {
            Some(b) if b.len >= entry.len => Some(b),
            _ => Some(*entry),
        });
    if let Some(entry) = longest.filter(|e| e.len >= ARTICLE_CHARS) {
        return Choice {
            node: Some(entry.node),
            method: entry.method,
        };
    }

    let pick = |node: Option<NodeRef<'a>>, method| Choice { node, method };
    if scored_best.is_some()
        && scored_len as f64 >= semantic_len as f64 * SCORED_OVER_LANDMARK
        && scored_len >= SUBSTANTIAL_CHARS
    {
        return pick(scored_best, Method::Scoring);
    }
    if semantic.is_some() && semantic_len >= SUBSTANTIAL_CHARS {
        return pick(semantic, Method::SemanticLandmark);
    }
    if scored_best.is_some() && scored_len >= semantic_len && scored_len >= MIN_CONTENT_CHARS {
        return pick(scored_best, Method::Scoring);
    }
    if semantic.is_some() && semantic_len >= MIN_CONTENT_CHARS {
        return pick(semantic, Method::SemanticLandmark);
    }
    pick(None, Method::BodyFallback)
}

/// Table sections and rows cannot be serialized on their own; lift them to
/// the enclosing `<table>`.
#[must_use]
pub fn whole_table(node: NodeRef<'_>) -> NodeRef<'_> {
    let mut current = node;
    while matches!(
        dom::node_tag(&current).as_deref(),
        Some("tbody" | "thead" | "tfoot" | "tr")
    ) {
        match dom::parent_element(&current) {
            Some(parent) => current = parent,
            None => break,
        }
    }
    current
}

/// Containers whose children are meaningless outside them.
pub const STRUCTURAL_TAGS: &[&str] = &["table", "tbody", "thead", "tfoot", "tr", "ul", "ol", "dl"];

/// Markup of a chosen container: the outer markup for tables and lists,
/// the inner markup otherwise.
#[must_use]
pub fn container_html(sel: &Selection) -> String {
    let structural = sel
        .nodes()
        .first()
        .and_then(dom::node_tag)
        .is_some_and(|tag| STRUCTURAL_TAGS.contains(&tag.as_str()));
    if structural {
        dom::outer_html(sel).to_string()
    } else {
        dom::inner_html(sel).to_string()
    }
}

/// Collapsed-text window in which sibling merging is attempted.
pub const SIBLING_MERGE_RANGE: (usize, usize) = (600, 3500);

/// Minimum text for a sibling to be merged.
pub const MIN_SIBLING_CHARS: usize = 150;

/// Link density ceiling for merged siblings.
pub const MAX_SIBLING_LINK_DENSITY: f64 = 0.5;

/// Merged output must exceed the original by this factor.
pub const SIBLING_GAIN: f64 = 1.1;

/// Container markup and text after optional sibling merging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Merged {
    /// Markup of the container followed by merged siblings.
    pub html: String,
    /// Collapsed text of the same.
    pub text: String,
    /// Whether any sibling was kept.
    pub merged: bool,
}

/// Append article-like following siblings of a modest container.
#[must_use]
pub fn merge_siblings(node: NodeRef<'_>) -> Merged {
    let sel = Selection::from(node);
    let mut html = container_html(&sel);
    let mut text = dom::collapsed_text(&sel);
    let base_len = text.chars().count();
    let original = Merged {
        html: html.clone(),
        text: text.clone(),
        merged: false,
    };

    let (low, high) = SIBLING_MERGE_RANGE;
    if !(low..=high).contains(&base_len) || dom::parent_element(&node).is_none() {
        return original;
    }

    let mut sibling = node.next_sibling();
    while let Some(current) = sibling {
        sibling = current.next_sibling();
        if !current.is_element() {
            continue;
        }
        let sib = Selection::from(current);
        if NEGATIVE_CLASS.is_match(&dom::class_id(&sib))
            || dom::link_density(&sib) > MAX_SIBLING_LINK_DENSITY
            || dom::text_len(&sib) < MIN_SIBLING_CHARS
            || dom::paragraph_count(&sib) < 1
        {
            continue;
        }
        html.push_str(&container_html(&sib));
        text.push(' ');
        text.push_str(&dom::collapsed_text(&sib));
    }

    if text.chars().count() as f64 > base_len as f64 * SIBLING_GAIN {
        Merged {
            html,
            text: text.trim().to_string(),
            merged: true,
        }
    } else {
        original
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::MARKUP_WALK;

    fn para(tag: &str) -> String {
        format!("<p>{tag} paragraph carrying enough words to count as real prose.</p>")
    }

    #[test]
    fn test_landmark_requires_non_trivial_text() {
        let html = format!(
            "<body><article>tiny</article><main>{}</main></body>",
            para("main")
        );
        let doc = dom::parse(&html);
        let body = doc.select("body");
        let found = semantic_landmark(&body).and_then(|n| dom::node_tag(&n));
        assert_eq!(found.as_deref(), Some("main"));
    }

    #[test]
    fn test_expansion_adopts_wrapper_of_split_article() {
        let html = format!(
            r#"<body><div id="wrapper"><div id="part1">{a}{a}</div><div id="part2">{a}{a}{a}</div></div></body>"#,
            a = para("split")
        );
        let doc = dom::parse(&html);
        let part1 = doc.select("#part1");
        let node = part1.nodes()[0];
        let expansion = expand_candidate(node);
        assert_eq!(
            Selection::from(expansion.node).attr("id").map(|s| s.to_string()),
            Some("wrapper".to_string())
        );
        assert_eq!(expansion.levels_adopted, 1);
    }

    #[test]
    fn test_expansion_limited_to_three_levels_and_body() {
        let mut html = String::from("<body>");
        for i in 0..6 {
            html.push_str(&format!("<div id=\"d{i}\">"));
            html.push_str(&para("level").repeat(i + 1));
        }
        html.push_str(&"</div>".repeat(6));
        html.push_str("</body>");
        let doc = dom::parse(&html);

        let innermost = doc.select("#d5");
        let expansion = expand_candidate(innermost.nodes()[0]);
        assert!(expansion.levels_walked <= MAX_EXPANSION_LEVELS);
        assert!(expansion.levels_adopted <= MAX_EXPANSION_LEVELS);

        let outermost = doc.select("#d0");
        let expansion = expand_candidate(outermost.nodes()[0]);
        assert_eq!(expansion.levels_walked, 0);
        assert_eq!(dom::node_tag(&expansion.node).as_deref(), Some("div"));
    }

    #[test]
    fn test_expansion_stops_at_negative_parent() {
        let html = format!(
            r#"<body><div class="comments"><div id="inner">{a}</div>{a}{a}{a}</div></body>"#,
            a = para("comment")
        );
        let doc = dom::parse(&html);
        let expansion = expand_candidate(doc.select("#inner").nodes()[0]);
        assert_eq!(expansion.levels_adopted, 0);
    }

    #[test]
    fn test_pool_prefers_long_body_over_summary_landmark() {
        let summary = "Short summary sentence of the story for skimmers. ".repeat(4);
        let body = para("body").repeat(14);
        let html = format!(
            r#"<body><article><p>{summary}</p></article><div class="story-body">{body}</div></body>"#
        );
        let doc = dom::parse(&html);
        let root = doc.select("body");
        let choice = choose(&root, MARKUP_WALK);
        assert_eq!(choice.method, Method::Scoring);
        let chosen = choice.node.map(|n| dom::class_id(&Selection::from(n)));
        assert_eq!(chosen.as_deref(), Some("story-body"));
    }

    #[test]
    fn test_table_rows_lift_to_table() {
        let doc = dom::parse("<body><table id=\"t\"><tr><td>a</td></tr></table></body>");
        let tbody = doc.select("tbody");
        let lifted = whole_table(tbody.nodes()[0]);
        assert_eq!(dom::node_tag(&lifted).as_deref(), Some("table"));
    }

    #[test]
    fn test_body_fallback_when_nothing_usable() {
        let doc = dom::parse("<body><span>hi</span></body>");
        let root = doc.select("body");
        let choice = choose(&root, MARKUP_WALK);
        assert!(choice.node.is_none());
        assert_eq!(choice.method, Method::BodyFallback);
    }

    #[test]
    fn test_sibling_merge_joins_article_split_by_ad() {
        let first = para("first").repeat(10);
        let second = para("second").repeat(4);
        let html = format!(
            r#"<body><div><div id="best">{first}</div><div class="promo"><a href="/x">Buy</a></div><div id="rest">{second}</div></div></body>"#
        );
        let doc = dom::parse(&html);
        let merged = merge_siblings(doc.select("#best").nodes()[0]);
        assert!(merged.merged);
        assert!(merged.text.contains("second paragraph"));
        assert!(!merged.text.contains("Buy"));
    }
}
