//! Scoring on the rendered DOM.
//!
//! The rendered snapshot reflects hydration, expanded sections and content
//! injected after load, so blocks can sit deep inside framework wrappers.
//! Contributions therefore travel five ancestor levels with decaying weight,
//! and captions count as text blocks.

use crate::result::Strategy;
use crate::scoring::{WalkConfig, DOM_WALK};

use super::ContentExtractor;

/// In-page strategy, fed with the session's rendered DOM.
#[derive(Debug, Clone, Copy, Default)]
pub struct DomScoringExtractor;

impl ContentExtractor for DomScoringExtractor {
    fn strategy(&self) -> Strategy {
        Strategy::Dom
    }

    fn walk(&self) -> WalkConfig {
        DOM_WALK
    }
}
