//! Polling waits: challenge resolution, content stabilization, network idle.
//!
//! None of these return an error. A wait that runs out of time reports the
//! state it last observed and the controller carries on.

use std::future::Future;
use std::time::Duration;

use dom_query::{Document, Selection};
use tokio::time::{sleep, Instant};
use tracing::{debug, info};

use crate::detect::{challenge, PageSnapshot};
use crate::dom;
use crate::error::{Error, Result};
use crate::result::ChallengeInfo;
use crate::session::{LoadState, PageSession};

/// Elements that mark the page as still loading regardless of visibility.
pub const BUSY_SELECTOR: &str = "[aria-busy=\"true\"]";

/// Elements that mark the page as still loading when visible.
pub const LOADING_SELECTOR: &str = ".loading, .spinner, .skeleton, .placeholder";

fn millis(d: Duration) -> u64 {
    d.as_millis() as u64
}

/// Run `fut` with a hard budget, mapping expiry to [`Error::StageTimeout`].
pub async fn within<T, F>(stage: &'static str, budget: Duration, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(budget, fut).await {
        Ok(result) => result,
        Err(_) => Err(Error::StageTimeout {
            stage,
            timeout_ms: millis(budget),
        }),
    }
}

// === Challenge ===

/// Polling schedule for bot-verification pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChallengeConfig {
    /// Give up after this long.
    pub max_wait: Duration,
    /// Delay between checks.
    pub poll: Duration,
}

impl Default for ChallengeConfig {
    fn default() -> Self {
        Self {
            max_wait: Duration::from_secs(20),
            poll: Duration::from_millis(500),
        }
    }
}

/// Whether the current page is a challenge. Session failures count as no.
pub async fn detect_challenge<S: PageSession + ?Sized>(session: &S) -> bool {
    match session.snapshot().await {
        Ok(page) => challenge::is_challenge(&page),
        Err(err) => {
            debug!(target: "harvest.detect", error = %err, "challenge probe failed");
            false
        }
    }
}

/// Poll until the challenge signals disappear or `max_wait` elapses.
pub async fn wait_through_challenge<S: PageSession + ?Sized>(
    session: &S,
    config: ChallengeConfig,
) -> ChallengeInfo {
    let start = Instant::now();
    while start.elapsed() < config.max_wait {
        match session.snapshot().await {
            Ok(page) if !challenge::is_challenge(&page) => {
                let waited_ms = millis(start.elapsed());
                info!(target: "harvest.wait", waited_ms, "challenge resolved");
                return ChallengeInfo {
                    was_challenged: true,
                    resolved: true,
                    waited_ms,
                    title: page.title,
                };
            }
            Ok(_) => {}
            Err(err) => debug!(target: "harvest.wait", error = %err, "challenge poll failed"),
        }
        sleep(config.poll).await;
    }

    let title = session.current_title().await.unwrap_or_default();
    info!(target: "harvest.wait", waited_ms = millis(config.max_wait), "challenge unresolved");
    ChallengeInfo {
        was_challenged: true,
        resolved: false,
        waited_ms: millis(config.max_wait),
        title,
    }
}

// === Stability ===

/// Polling schedule for content stabilization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StabilityConfig {
    /// Give up after this long.
    pub timeout: Duration,
    /// Text length must hold still this long.
    pub stable_window: Duration,
    /// Delay between polls.
    pub poll: Duration,
    /// Text shorter than this is never ready.
    pub min_chars: usize,
}

impl StabilityConfig {
    /// Default poll interval.
    pub const POLL: Duration = Duration::from_millis(300);
    /// Default minimum text length.
    pub const MIN_CHARS: usize = 100;

    /// Schedule with the given budget and window and default poll/minimum.
    #[must_use]
    pub const fn new(timeout: Duration, stable_window: Duration) -> Self {
        Self {
            timeout,
            stable_window,
            poll: Self::POLL,
            min_chars: Self::MIN_CHARS,
        }
    }
}

impl Default for StabilityConfig {
    fn default() -> Self {
        Self::new(Duration::from_millis(5000), Duration::from_millis(1500))
    }
}

/// Outcome of a stabilization wait.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StabilityReport {
    /// Content held still long enough, or was long enough at the deadline.
    pub ready: bool,
    /// Last observed text length.
    pub text_length: usize,
    /// Time spent waiting.
    pub waited_ms: u64,
    /// How long the length had held still when the wait ended.
    pub stable_for_ms: u64,
    /// The deadline was reached.
    pub timed_out: bool,
}

/// Whether a loading indicator is present.
///
/// Class-based indicators only count when neither they nor an ancestor are
/// hidden by inline style or `aria-hidden`.
#[must_use]
pub fn is_loading(doc: &Document) -> bool {
    if doc.select(BUSY_SELECTOR).length() > 0 {
        return true;
    }
    doc.select(LOADING_SELECTOR).nodes().iter().any(|node| {
        let hidden_self = dom::is_hidden(&Selection::from(*node));
        let hidden_ancestor = node
            .ancestors(None)
            .iter()
            .filter(|a| a.is_element())
            .any(|a| dom::is_hidden(&Selection::from(*a)));
        !hidden_self && !hidden_ancestor
    })
}

fn still_settling(page: &PageSnapshot) -> bool {
    let doc = page.document();
    challenge::challenge_in(page, &doc) || is_loading(&doc)
}

/// Poll rendered text length until it stops changing.
///
/// A challenge page or a loading indicator resets the stable timer.
pub async fn wait_for_stable_content<S: PageSession + ?Sized>(
    session: &S,
    config: StabilityConfig,
) -> StabilityReport {
    let start = Instant::now();
    let mut last_len = 0usize;
    let mut stable_since: Option<Instant> = None;

    while start.elapsed() < config.timeout {
        let page = match session.snapshot().await {
            Ok(page) => page,
            Err(err) => {
                debug!(target: "harvest.wait", error = %err, "stability poll failed");
                sleep(config.poll).await;
                continue;
            }
        };
        let current_len = page.body_text.chars().count();

        if still_settling(&page) {
            stable_since = None;
            last_len = current_len;
            sleep(config.poll).await;
            continue;
        }

        if current_len != last_len {
            stable_since = Some(Instant::now());
            last_len = current_len;
        } else if stable_since.is_none() {
            stable_since = Some(Instant::now());
        }

        if let Some(since) = stable_since {
            if since.elapsed() >= config.stable_window && current_len >= config.min_chars {
                let report = StabilityReport {
                    ready: true,
                    text_length: current_len,
                    waited_ms: millis(start.elapsed()),
                    stable_for_ms: millis(since.elapsed()),
                    timed_out: false,
                };
                debug!(target: "harvest.wait", chars = current_len, waited_ms = report.waited_ms, "content stable");
                return report;
            }
        }
        sleep(config.poll).await;
    }

    let final_len = session
        .body_text()
        .await
        .map(|text| text.chars().count())
        .unwrap_or(last_len);
    debug!(target: "harvest.wait", chars = final_len, "stability wait timed out");
    StabilityReport {
        ready: final_len >= config.min_chars,
        text_length: final_len,
        waited_ms: millis(config.timeout),
        stable_for_ms: stable_since.map_or(0, |since| millis(since.elapsed())),
        timed_out: true,
    }
}

// === Load states ===

/// Wait for a load milestone; a timeout or driver error only yields `false`.
pub async fn wait_for_load_state<S: PageSession + ?Sized>(
    session: &S,
    state: LoadState,
    budget: Duration,
) -> bool {
    match within("load_state", budget, session.wait_for_load_state(state, budget)).await {
        Ok(()) => true,
        Err(err) => {
            debug!(target: "harvest.wait", state = state.as_str(), error = %err, "load state not reached");
            false
        }
    }
}
