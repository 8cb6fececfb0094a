//! Main content extraction.
//!
//! Two strategies score the page independently and the arbiter keeps the
//! better one:
//!
//! - `rendered`: [`DomScoringExtractor`] on the live, post-hydration DOM
//!   snapshot, five-level ancestor walk.
//! - `markup`: [`MarkupScoringExtractor`] on the served markup, parent and
//!   grandparent walk.
//! - `candidates`: landmark lookup, ancestor expansion, pool and sibling merge
//!   shared by both.
//! - `arbiter`: picks between the two results.
//!
//! # Usage
//!
//! ```rust
//! use rs_harvest::extractor::{ContentExtractor, MarkupScoringExtractor};
//!
//! let html = "<html><body><article><p>Some article text that is long enough to be chosen by the extractor.</p></article></body></html>";
//! let result = MarkupScoringExtractor.extract(html, None)?;
//! assert!(result.text.contains("article text"));
//! # Ok::<(), rs_harvest::Error>(())
//! ```

pub mod arbiter;
pub mod candidates;
pub mod markup;
pub mod rendered;

pub use arbiter::{arbitrate, ARBITRATION_FLOOR, ARBITRATION_MARGIN};
pub use markup::MarkupScoringExtractor;
pub use rendered::DomScoringExtractor;

use tracing::debug;

use crate::dom;
use crate::error::{Error, Result};
use crate::metadata;
use crate::noise;
use crate::result::{ExtractionResult, Method, Strategy};
use crate::scoring::WalkConfig;

/// A main-content extraction strategy.
///
/// Implementations only choose which document they see and how far text
/// blocks propagate; the selection pipeline itself is shared.
pub trait ContentExtractor {
    /// Which document this strategy scores.
    fn strategy(&self) -> Strategy;

    /// Ancestor walk used for scoring.
    fn walk(&self) -> WalkConfig;

    /// Extract the main content of `html`.
    ///
    /// `page_url` is used for metadata fallbacks only.
    fn extract(&self, html: &str, page_url: Option<&str>) -> Result<ExtractionResult> {
        extract_with(self.strategy(), self.walk(), html, page_url)
    }
}

/// Shared pipeline: metadata, noise removal, candidate choice, sibling merge.
pub fn extract_with(
    strategy: Strategy,
    walk: WalkConfig,
    html: &str,
    page_url: Option<&str>,
) -> Result<ExtractionResult> {
    if html.trim().is_empty() {
        return Err(Error::Extraction(format!(
            "{} snapshot is empty",
            strategy.as_str()
        )));
    }

    let doc = dom::parse(html);
    let metadata = metadata::extract_metadata(&doc, page_url);
    noise::remove_noise(&doc);

    let root = dom::body(&doc);
    let mut choice = candidates::choose(&root, walk);
    choice.node = choice.node.map(candidates::whole_table);

    let (merged, paragraph_count) = match choice.node {
        Some(node) => {
            let merged = candidates::merge_siblings(node);
            let paragraphs = dom::paragraph_count(&dom::Selection::from(node));
            (merged, paragraphs)
        }
        None => (
            candidates::Merged {
                html: dom::inner_html(&root).to_string(),
                text: dom::collapsed_text(&root),
                merged: false,
            },
            dom::paragraph_count(&root),
        ),
    };

    let text_length = merged.text.chars().count();
    debug!(
        target: "harvest.extract",
        strategy = strategy.as_str(),
        method = choice.method.as_str(),
        chars = text_length,
        merged_siblings = merged.merged,
        "candidate chosen"
    );

    Ok(ExtractionResult {
        html: merged.html,
        text: merged.text,
        text_length,
        method: choice.method,
        strategy,
        merged_siblings: merged.merged && choice.method != Method::BodyFallback,
        paragraph_count,
        metadata,
    })
}
