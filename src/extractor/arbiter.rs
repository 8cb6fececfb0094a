//! Choosing between the rendered and markup results.

use crate::result::ExtractionResult;

/// A result must be this many times longer than the other to win outright.
pub const ARBITRATION_MARGIN: f64 = 1.3;

/// Minimum text length for a result to be preferred on its own merit.
pub const ARBITRATION_FLOOR: usize = 200;

/// Pick the better of the two strategy results.
///
/// The rendered result wins ties, since it reflects what a reader sees.
#[must_use]
pub fn arbitrate(
    dom: Option<ExtractionResult>,
    markup: Option<ExtractionResult>,
) -> Option<ExtractionResult> {
    let (dom, markup) = match (dom, markup) {
        (Some(dom), Some(markup)) => (dom, markup),
        (one, None) | (None, one) => return one,
    };

    let dom_len = dom.text_length;
    let markup_len = markup.text_length;
    let clearly_longer =
        |a: usize, b: usize| a as f64 >= b as f64 * ARBITRATION_MARGIN && a >= ARBITRATION_FLOOR;

    if clearly_longer(dom_len, markup_len) {
        return Some(dom);
    }
    if clearly_longer(markup_len, dom_len) {
        return Some(markup);
    }
    if dom_len >= ARBITRATION_FLOOR {
        return Some(dom);
    }
    if markup_len >= ARBITRATION_FLOOR {
        return Some(markup);
    }
    Some(if markup_len > dom_len { markup } else { dom })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::{Method, Metadata, Strategy};

    fn result(strategy: Strategy, len: usize) -> ExtractionResult {
        ExtractionResult {
            html: String::new(),
            text: "x".repeat(len),
            text_length: len,
            method: Method::Scoring,
            strategy,
            merged_siblings: false,
            paragraph_count: 0,
            metadata: Metadata::default(),
        }
    }

    fn winner(dom: Option<usize>, markup: Option<usize>) -> Option<Strategy> {
        arbitrate(
            dom.map(|n| result(Strategy::Dom, n)),
            markup.map(|n| result(Strategy::Markup, n)),
        )
        .map(|r| r.strategy)
    }

    #[test]
    fn test_margin_decides() {
        assert_eq!(winner(Some(1300), Some(1000)), Some(Strategy::Dom));
        assert_eq!(winner(Some(1000), Some(1300)), Some(Strategy::Markup));
    }

    #[test]
    fn test_close_results_prefer_dom_above_floor() {
        assert_eq!(winner(Some(1000), Some(1200)), Some(Strategy::Dom));
        assert_eq!(winner(Some(150), Some(180)), Some(Strategy::Markup));
    }

    #[test]
    fn test_floor_applies_to_margin() {
        // markup is 1.5x longer but below the floor; neither qualifies
        assert_eq!(winner(Some(100), Some(150)), Some(Strategy::Markup));
        assert_eq!(winner(Some(120), Some(120)), Some(Strategy::Dom));
        assert_eq!(winner(Some(190), Some(250)), Some(Strategy::Markup));
    }

    #[test]
    fn test_missing_inputs() {
        assert_eq!(winner(None, Some(10)), Some(Strategy::Markup));
        assert_eq!(winner(Some(10), None), Some(Strategy::Dom));
        assert_eq!(winner(None, None), None);
    }
}
