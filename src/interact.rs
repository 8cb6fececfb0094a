//! Page interactions that reveal content: consent banners, "read more"
//! expanders and lazy-load scrolling.
//!
//! Every interaction is best effort; failures are logged and skipped.

use std::time::Duration;

use tokio::time::sleep;
use tracing::debug;

use crate::session::PageSession;

/// Consent-accept buttons, most common first.
pub const CONSENT_SELECTORS: &[&str] = &[
    "button:has-text('Accept all')",
    "button:has-text('Accept All')",
    "button:has-text('Accept cookies')",
    "button:has-text('I agree')",
    "button:has-text('Got it')",
    "button:has-text('OK')",
    "button[id*='accept']",
    "button[class*='accept']",
    "[data-testid='accept-button']",
    "button.cmp-button_button--acceptAll",
    ".qc-cmp-button:first-child",
    "button#L2AGLb",
    "button#bnp_btn_accept",
];

/// Expanders for collapsed article bodies.
pub const READ_MORE_SELECTORS: &[&str] = &[
    "button:has-text('Read more')",
    "button:has-text('Continue reading')",
    "button:has-text('Show more')",
    "a:has-text('Read more')",
    "a:has-text('Continue reading')",
    "a:has-text('Read full article')",
    "[class*='read-more']",
    "[class*='readMore']",
    "[class*='continue-reading']",
    "[class*='show-more']",
    "[class*='showMore']",
    "[data-testid='read-more']",
    "[data-testid='continue-reading']",
];

/// Timing of a click-first-visible sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClickSweep {
    /// Visibility probe per selector.
    pub probe: Duration,
    /// Click timeout.
    pub click: Duration,
    /// Pause after a successful click.
    pub settle: Duration,
}

/// Consent banners: 200ms probe, 2s click, 300ms settle.
pub const CONSENT_SWEEP: ClickSweep = ClickSweep {
    probe: Duration::from_millis(200),
    click: Duration::from_secs(2),
    settle: Duration::from_millis(300),
};

/// Read-more expanders: 200ms probe, 2s click, 800ms settle.
pub const READ_MORE_SWEEP: ClickSweep = ClickSweep {
    probe: Duration::from_millis(200),
    click: Duration::from_secs(2),
    settle: Duration::from_millis(800),
};

/// Click the first visible match among `selectors`, then pause.
///
/// Returns the selector that was clicked. The sweep stops after the first
/// successful click.
pub async fn click_first_visible<S: PageSession + ?Sized>(
    session: &S,
    selectors: &[&'static str],
    sweep: ClickSweep,
) -> Option<&'static str> {
    for &selector in selectors {
        match session.is_visible(selector, sweep.probe).await {
            Ok(true) => {}
            Ok(false) => continue,
            Err(err) => {
                debug!(target: "harvest.interact", selector, error = %err, "visibility probe failed");
                continue;
            }
        }
        match session.click(selector, sweep.click).await {
            Ok(()) => {
                sleep(sweep.settle).await;
                debug!(target: "harvest.interact", selector, "clicked");
                return Some(selector);
            }
            Err(err) => {
                debug!(target: "harvest.interact", selector, error = %err, "click failed");
            }
        }
    }
    None
}

/// Accept a cookie/GDPR banner if one is showing.
pub async fn dismiss_consent<S: PageSession + ?Sized>(session: &S) -> Option<&'static str> {
    click_first_visible(session, CONSENT_SELECTORS, CONSENT_SWEEP).await
}

/// Expand a collapsed article body if an expander is showing.
pub async fn expand_read_more<S: PageSession + ?Sized>(session: &S) -> Option<&'static str> {
    click_first_visible(session, READ_MORE_SELECTORS, READ_MORE_SWEEP).await
}

// === Lazy-load scrolling ===

/// Scroll schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollConfig {
    /// Maximum viewport-height steps.
    pub max_steps: usize,
    /// Pause after each step.
    pub step_pause: Duration,
    /// Consecutive rounds without growth before stopping.
    pub max_stale_rounds: usize,
    /// Text growth at or below this is not growth.
    pub min_text_growth: usize,
    /// Pause after returning to the top.
    pub top_pause: Duration,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            max_steps: 15,
            step_pause: Duration::from_millis(800),
            max_stale_rounds: 3,
            min_text_growth: 50,
            top_pause: Duration::from_millis(300),
        }
    }
}

/// What a scroll pass achieved.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScrollReport {
    /// Steps taken.
    pub scrolls: usize,
    /// Scroll height after the last step.
    pub final_height: f64,
    /// Body text length after returning to the top.
    pub text_length: usize,
}

async fn text_len<S: PageSession + ?Sized>(session: &S) -> usize {
    session.body_text().await.map_or(0, |text| text.chars().count())
}

/// Scroll down one viewport at a time to trigger lazy loading.
///
/// Growth is either a taller page or more than `min_text_growth` new
/// characters; some sites fill pre-sized containers without changing the
/// scroll height.
pub async fn scroll_to_load<S: PageSession + ?Sized>(session: &S, config: ScrollConfig) -> ScrollReport {
    let mut report = ScrollReport::default();
    let metrics = match session.scroll_metrics().await {
        Ok(metrics) => metrics,
        Err(err) => {
            debug!(target: "harvest.interact", error = %err, "scroll metrics unavailable");
            return report;
        }
    };
    let step = if metrics.viewport_height > 0.0 { metrics.viewport_height } else { 800.0 };
    let mut previous_height = metrics.scroll_height;
    let mut previous_text = text_len(session).await;
    let mut stale_rounds = 0;

    for _ in 0..config.max_steps {
        if let Err(err) = session.scroll_by(0.0, step).await {
            debug!(target: "harvest.interact", error = %err, "scroll failed");
            break;
        }
        report.scrolls += 1;
        sleep(config.step_pause).await;

        let height = session
            .scroll_metrics()
            .await
            .map_or(previous_height, |m| m.scroll_height);
        let text = text_len(session).await;
        let grew = height > previous_height || text > previous_text + config.min_text_growth;
        if grew {
            stale_rounds = 0;
        } else {
            stale_rounds += 1;
            if stale_rounds >= config.max_stale_rounds {
                previous_height = height;
                break;
            }
        }
        previous_height = height;
        previous_text = text;
    }

    if let Err(err) = session.scroll_to_top().await {
        debug!(target: "harvest.interact", error = %err, "scroll to top failed");
    }
    sleep(config.top_pause).await;

    report.final_height = previous_height;
    report.text_length = text_len(session).await;
    debug!(
        target: "harvest.interact",
        scrolls = report.scrolls,
        chars = report.text_length,
        "scroll pass done"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sweep_timings() {
        assert_eq!(CONSENT_SWEEP.settle, Duration::from_millis(300));
        assert_eq!(READ_MORE_SWEEP.settle, Duration::from_millis(800));
        assert_eq!(CONSENT_SELECTORS.len(), 13);
        assert_eq!(READ_MORE_SELECTORS.len(), 13);
    }

    #[test]
    fn test_scroll_defaults() {
        let config = ScrollConfig::default();
        assert_eq!(config.max_steps, 15);
        assert_eq!(config.max_stale_rounds, 3);
    }
}
