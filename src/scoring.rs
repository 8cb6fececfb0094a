//! Candidate scoring shared by the DOM and markup strategies.
//!
//! Both strategies use the same constant tables and the same per-candidate
//! score; they differ only in how far text blocks propagate their
//! contribution up the tree (see [`WalkConfig`]).

use std::collections::HashMap;

use dom_query::{NodeId, NodeRef, Selection};

use crate::dom;
use crate::patterns::{NEGATIVE_CLASS, POSITIVE_CLASS};

// === Weight tables ===

/// Bonus or penalty for a matching class/id pattern.
pub const CLASS_WEIGHT: f64 = 25.0;

/// Bonus for `role=main|article`.
pub const ROLE_CONTENT_BONUS: f64 = 20.0;

/// Penalty for `role=navigation|banner|complementary|contentinfo`.
pub const ROLE_CHROME_PENALTY: f64 = 15.0;

/// Bonus for `itemprop=articleBody|text|description`.
pub const ITEMPROP_BONUS: f64 = 15.0;

/// Points per counted paragraph.
pub const PARAGRAPH_WEIGHT: f64 = 3.0;

/// Multiplier for content density.
pub const DENSITY_WEIGHT: f64 = 20.0;

/// Link density above which the link penalty applies.
pub const LINK_PENALTY_THRESHOLD: f64 = 0.5;

/// Multiplier for the link penalty.
pub const LINK_PENALTY_WEIGHT: f64 = 30.0;

/// Minimum text for a container to count as content.
pub const MIN_CONTENT_CHARS: usize = 50;

/// Flat penalty for containers under `MIN_CONTENT_CHARS`.
pub const SHORT_CONTENT_PENALTY: f64 = 20.0;

/// Multiplier for `ln(text_length)`.
pub const LENGTH_WEIGHT: f64 = 2.0;

/// Contribution decay per ancestor level.
pub const LEVEL_WEIGHTS: [f64; 5] = [1.0, 0.5, 0.3, 0.2, 0.1];

/// Minimum trimmed text for a block to contribute to its ancestors.
pub const MIN_BLOCK_CHARS: usize = 20;

/// Tag bonus.
#[must_use]
pub fn tag_bonus(tag: &str) -> f64 {
    match tag {
        "article" | "main" => 10.0,
        "section" | "blockquote" => 3.0,
        "td" => 1.0,
        _ => 0.0,
    }
}

/// Weight of a text block by its own tag.
#[must_use]
pub fn element_weight(tag: &str) -> f64 {
    match tag {
        "p" => 1.0,
        "li" => 0.7,
        "dd" | "dt" => 0.6,
        "td" | "th" => 0.5,
        _ => 0.4,
    }
}

/// Contribution of one text block before level and element weighting.
///
/// `1 + min(len / 100, 3) + commas`.
#[must_use]
pub fn block_contribution(text: &str) -> f64 {
    let len = text.chars().count();
    let commas = text.matches(',').count();
    1.0 + (len / 100).min(3) as f64 + commas as f64
}

/// How a strategy walks from text blocks to candidates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WalkConfig {
    /// Ancestor levels credited per block (at most `LEVEL_WEIGHTS.len()`).
    pub max_levels: usize,
    /// Selector of text blocks that contribute.
    pub block_selector: &'static str,
    /// Candidates with less text are discarded.
    pub min_candidate_chars: usize,
}

/// Rendered DOM: five levels, captions count.
pub const DOM_WALK: WalkConfig = WalkConfig {
    max_levels: 5,
    block_selector: "p, li, td, th, dd, dt, blockquote, figcaption",
    min_candidate_chars: 0,
};

/// Served markup: parent and grandparent only.
pub const MARKUP_WALK: WalkConfig = WalkConfig {
    max_levels: 2,
    block_selector: "p, li, td, th, dd, dt, blockquote",
    min_candidate_chars: MIN_CONTENT_CHARS,
};

/// A container under consideration.
#[derive(Debug, Clone)]
pub struct CandidateNode<'a> {
    /// The element.
    pub node: NodeRef<'a>,
    /// Lowercase tag name.
    pub tag: String,
    /// Class and id string.
    pub class_id: String,
    /// Running score.
    pub score: f64,
    /// Trimmed text length.
    pub text_length: usize,
    /// Counted paragraphs.
    pub paragraph_count: usize,
    /// Anchor text ratio.
    pub link_density: f64,
}

impl<'a> CandidateNode<'a> {
    /// Measure an element and compute its initial score.
    #[must_use]
    pub fn measure(node: NodeRef<'a>) -> Self {
        let sel = Selection::from(node);
        let tag = dom::node_tag(&node).unwrap_or_default();
        let class_id = dom::class_id(&sel);
        let text_length = dom::text_len(&sel);
        let paragraph_count = dom::paragraph_count(&sel);
        let link_density = dom::link_density(&sel);

        let mut score = attribute_score(&sel, &tag, &class_id);
        score += paragraph_count as f64 * PARAGRAPH_WEIGHT;
        score += dom::content_density(&sel) * DENSITY_WEIGHT;
        if link_density > LINK_PENALTY_THRESHOLD {
            score -= LINK_PENALTY_WEIGHT * link_density;
        }
        if text_length > MIN_CONTENT_CHARS {
            score += (text_length as f64).ln() * LENGTH_WEIGHT;
        } else if text_length < MIN_CONTENT_CHARS {
            score -= SHORT_CONTENT_PENALTY;
        }

        Self {
            node,
            tag,
            class_id,
            score,
            text_length,
            paragraph_count,
            link_density,
        }
    }

    /// Whether the class/id matches the negative pattern.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        NEGATIVE_CLASS.is_match(&self.class_id)
    }
}

/// Tag, class/id, role and itemprop part of the score.
#[must_use]
pub fn attribute_score(sel: &Selection, tag: &str, class_id: &str) -> f64 {
    let mut score = tag_bonus(tag);
    if POSITIVE_CLASS.is_match(class_id) {
        score += CLASS_WEIGHT;
    }
    if NEGATIVE_CLASS.is_match(class_id) {
        score -= CLASS_WEIGHT;
    }
    match dom::attr_lower(sel, "role").as_str() {
        "main" | "article" => score += ROLE_CONTENT_BONUS,
        "navigation" | "banner" | "complementary" | "contentinfo" => {
            score -= ROLE_CHROME_PENALTY;
        }
        _ => {}
    }
    if matches!(
        dom::attr_lower(sel, "itemprop").as_str(),
        "articlebody" | "text" | "description"
    ) {
        score += ITEMPROP_BONUS;
    }
    score
}

/// Score every ancestor of every qualifying text block under `root`.
///
/// Candidates are returned highest score first; ties keep document order of
/// first discovery. Walks never credit `body`, `html` or `root` itself.
#[must_use]
pub fn score_candidates<'a>(root: &Selection<'a>, walk: WalkConfig) -> Vec<CandidateNode<'a>> {
    let root_id = root.nodes().first().map(|n| n.id);
    let levels = walk.max_levels.min(LEVEL_WEIGHTS.len());

    let mut candidates: Vec<CandidateNode<'a>> = Vec::new();
    let mut index: HashMap<NodeId, usize> = HashMap::new();

    for block in root.select(walk.block_selector).nodes() {
        let block_sel = Selection::from(*block);
        let text = block_sel.text();
        let text = text.trim();
        if text.chars().count() < MIN_BLOCK_CHARS {
            continue;
        }
        let weight = element_weight(&dom::node_tag(block).unwrap_or_default());
        let contribution = block_contribution(text);

        let mut ancestor = dom::parent_element(block);
        for level_weight in LEVEL_WEIGHTS.iter().take(levels) {
            let Some(node) = ancestor else { break };
            if Some(node.id) == root_id || dom::is_boundary(&node) {
                break;
            }
            let slot = *index.entry(node.id).or_insert_with(|| {
                candidates.push(CandidateNode::measure(node));
                candidates.len() - 1
            });
            candidates[slot].score += contribution * level_weight * weight;
            ancestor = dom::parent_element(&node);
        }
    }

    let mut scored: Vec<CandidateNode<'a>> = candidates
        .into_iter()
        .filter(|c| c.text_length >= walk.min_candidate_chars)
        .map(|mut c| {
            c.score *= 1.0 - c.link_density;
            c
        })
        .collect();
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored
}
