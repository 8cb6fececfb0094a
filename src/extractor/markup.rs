//! Scoring on the served markup.
//!
//! Without script execution or layout the markup is flatter and noisier, so
//! only the parent and grandparent of each text block are credited and
//! containers with less than 50 characters are ignored.

use crate::result::Strategy;
use crate::scoring::{WalkConfig, MARKUP_WALK};

use super::ContentExtractor;

/// Markup-only strategy, fed with the session's raw HTML.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkupScoringExtractor;

impl ContentExtractor for MarkupScoringExtractor {
    fn strategy(&self) -> Strategy {
        Strategy::Markup
    }

    fn walk(&self) -> WalkConfig {
        MARKUP_WALK
    }
}
