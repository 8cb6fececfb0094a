//! The retry and escalation state machine behind [`get_content`].
//!
//! A request walks [`Stage::ORDER`] front to back. Each stage runs under a
//! hard budget from [`STAGE_BUDGETS`] and either hands over to the next
//! stage whose entry condition holds ([`next_stage`]) or finishes the
//! request with a response. Stage failures are logged and skipped; only a
//! failed initial extraction surfaces as `status = error`.
//!
//! Cancellation stops the wait of the stage that is running. The request
//! then jumps to extraction if nothing has been extracted yet and returns
//! whatever it has.

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::detect::{detect_blocked, looks_like_article};
use crate::dom;
use crate::error::{Error, Result};
use crate::extractor::{
    arbitrate, ContentExtractor, DomScoringExtractor, MarkupScoringExtractor,
};
use crate::format::{format_content, html_to_text};
use crate::interact::{dismiss_consent, expand_read_more, scroll_to_load, ScrollConfig};
use crate::metadata::extract_metadata;
use crate::options::{Format, Options};
use crate::quality::{assess_quality, Quality};
use crate::result::{
    BlockInfo, BlockSignal, ChallengeInfo, ContentResponse, ExtractionResult, Metadata, Status,
};
use crate::session::{LoadState, PageSession};
use crate::source::{aggregator_hint, find_original_source};
use crate::url_utils::is_blank_page;
use crate::wait::{
    detect_challenge, wait_for_load_state, wait_for_stable_content, wait_through_challenge,
    within, ChallengeConfig, StabilityConfig,
};

/// A retry result replaces the current one only when it is this much longer.
pub const ADOPTION_RATIO: f64 = 1.1;

/// Inclusive length range in which a good article still gets a retry.
pub const BORDERLINE_MIN_CHARS: usize = 800;
/// See [`BORDERLINE_MIN_CHARS`].
pub const BORDERLINE_MAX_CHARS: usize = 2500;

/// Custom-selector markup shorter than this falls back to scoring.
pub const MIN_SELECTOR_CHARS: usize = 50;

/// How long a custom selector may take to appear.
pub const SELECTOR_WAIT: Duration = Duration::from_secs(10);

const CHALLENGE_SETTLE: Duration = Duration::from_secs(15);
const NETWORK_IDLE: Duration = Duration::from_secs(8);
const STABLE_WINDOW: Duration = Duration::from_millis(1500);
const SCROLL_SETTLE: StabilityConfig =
    StabilityConfig::new(Duration::from_secs(3), Duration::from_millis(800));
const RETRY_SETTLE: StabilityConfig =
    StabilityConfig::new(Duration::from_secs(3), Duration::from_secs(1));
const NETWORK_SETTLE: StabilityConfig =
    StabilityConfig::new(Duration::from_secs(5), Duration::from_millis(1500));

/// Slack added to the caller's `wait_timeout_ms` for the stability stage.
const STABILITY_SLACK: Duration = Duration::from_secs(2);

/// Message for `status = no_page`.
pub const NO_PAGE_MESSAGE: &str =
    "No page is loaded. Navigate to the article URL first, then request the content again.";

/// Warning attached to short or poor content.
pub const SHORT_CONTENT_WARNING: &str = "Extracted content is shorter than expected. The page may require JavaScript rendering, login, or has anti-scraping measures. Try a custom selector, or increase wait_timeout_ms.";

/// Controller states, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    /// Refuse blank sessions.
    NoPageGuard,
    /// Wait out a bot-verification interstitial.
    ChallengeWait,
    /// Accept a consent banner.
    ConsentDismiss,
    /// Stop on paywalls, login walls and similar.
    BlockCheck,
    /// Wait for the text length to settle.
    StabilityWait,
    /// Caller-requested lazy-load scroll.
    OptionalScroll,
    /// Caller-supplied container selector.
    CustomSelector,
    /// Both extractors plus arbitration.
    InitialExtraction,
    /// Good but borderline article: expand, scroll, re-extract.
    ArticleBorderlineRetry,
    /// Wait for network idle, re-extract.
    NetworkWaitRetry,
    /// Expand, scroll, re-extract.
    ScrollRetry,
    /// Look for the original article behind an aggregator page.
    OriginalSourceProbe,
    /// Build the response.
    Finish,
}

impl Stage {
    /// All stages in execution order.
    pub const ORDER: [Self; 13] = [
        Self::NoPageGuard,
        Self::ChallengeWait,
        Self::ConsentDismiss,
        Self::BlockCheck,
        Self::StabilityWait,
        Self::OptionalScroll,
        Self::CustomSelector,
        Self::InitialExtraction,
        Self::ArticleBorderlineRetry,
        Self::NetworkWaitRetry,
        Self::ScrollRetry,
        Self::OriginalSourceProbe,
        Self::Finish,
    ];

    /// Snake-case name used in logs and timeout errors.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NoPageGuard => "no_page_guard",
            Self::ChallengeWait => "challenge_wait",
            Self::ConsentDismiss => "consent_dismiss",
            Self::BlockCheck => "block_check",
            Self::StabilityWait => "stability_wait",
            Self::OptionalScroll => "optional_scroll",
            Self::CustomSelector => "custom_selector",
            Self::InitialExtraction => "initial_extraction",
            Self::ArticleBorderlineRetry => "article_borderline_retry",
            Self::NetworkWaitRetry => "network_wait_retry",
            Self::ScrollRetry => "scroll_retry",
            Self::OriginalSourceProbe => "original_source_probe",
            Self::Finish => "finish",
        }
    }

    /// Hard budget for this stage under `options`.
    #[must_use]
    pub fn budget(self, options: &Options) -> Duration {
        let limit = STAGE_BUDGETS
            .iter()
            .find(|b| b.stage == self)
            .map_or(Duration::from_secs(30), |b| b.limit);
        if self == Self::StabilityWait {
            limit.max(Duration::from_millis(options.wait_timeout_ms) + STABILITY_SLACK)
        } else {
            limit
        }
    }

    /// Whether cancellation interrupts this stage.
    ///
    /// The guard and the initial extraction always run to completion so
    /// that a cancelled request still has something to return.
    #[must_use]
    pub const fn cancellable(self) -> bool {
        !matches!(self, Self::NoPageGuard | Self::InitialExtraction | Self::Finish)
    }
}

/// Hard limit for one stage, on top of the stage's own inner timeouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageBudget {
    /// Stage the limit applies to.
    pub stage: Stage,
    /// Wall-clock limit.
    pub limit: Duration,
}

const fn budget(stage: Stage, secs: u64) -> StageBudget {
    StageBudget {
        stage,
        limit: Duration::from_secs(secs),
    }
}

/// Per-stage budgets. The stability entry is a floor; the caller's
/// `wait_timeout_ms` plus two seconds applies when larger.
pub const STAGE_BUDGETS: [StageBudget; 13] = [
    budget(Stage::NoPageGuard, 5),
    budget(Stage::ChallengeWait, 40),
    budget(Stage::ConsentDismiss, 35),
    budget(Stage::BlockCheck, 45),
    budget(Stage::StabilityWait, 7),
    budget(Stage::OptionalScroll, 25),
    budget(Stage::CustomSelector, 15),
    budget(Stage::InitialExtraction, 30),
    budget(Stage::ArticleBorderlineRetry, 50),
    budget(Stage::NetworkWaitRetry, 20),
    budget(Stage::ScrollRetry, 50),
    budget(Stage::OriginalSourceProbe, 10),
    budget(Stage::Finish, 5),
];

/// What the transition table looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Progress {
    /// The request was cancelled.
    pub cancelled: bool,
    /// A custom selector was supplied.
    pub has_selector: bool,
    /// The caller asked for a stability wait.
    pub wait_for_content: bool,
    /// The caller asked for a lazy-load scroll.
    pub scroll_to_load: bool,
    /// Quality and text length of the current extraction.
    pub extracted: Option<(Quality, usize)>,
}

impl Progress {
    fn below_good(&self) -> bool {
        matches!(self.extracted, Some((quality, _)) if quality != Quality::Good)
    }
}

/// Entry condition of each stage.
#[must_use]
pub fn enters(stage: Stage, progress: &Progress) -> bool {
    if progress.cancelled {
        return match stage {
            Stage::InitialExtraction => progress.extracted.is_none(),
            Stage::Finish => true,
            _ => false,
        };
    }
    match stage {
        Stage::NoPageGuard => false,
        Stage::ChallengeWait
        | Stage::ConsentDismiss
        | Stage::BlockCheck
        | Stage::InitialExtraction
        | Stage::Finish => true,
        Stage::StabilityWait => progress.wait_for_content,
        Stage::OptionalScroll => progress.scroll_to_load,
        Stage::CustomSelector => progress.has_selector,
        Stage::ArticleBorderlineRetry => {
            !progress.has_selector
                && matches!(
                    progress.extracted,
                    Some((Quality::Good, len))
                        if (BORDERLINE_MIN_CHARS..=BORDERLINE_MAX_CHARS).contains(&len)
                )
        }
        Stage::NetworkWaitRetry | Stage::ScrollRetry => {
            !progress.has_selector && progress.below_good()
        }
        Stage::OriginalSourceProbe => progress.below_good(),
    }
}

/// First stage after `current` whose entry condition holds.
#[must_use]
pub fn next_stage(current: Stage, progress: &Progress) -> Stage {
    Stage::ORDER
        .iter()
        .copied()
        .skip_while(|stage| *stage != current)
        .skip(1)
        .find(|stage| enters(*stage, progress))
        .unwrap_or(Stage::Finish)
}

/// Whether a retry result of `candidate` chars beats `current` chars.
#[must_use]
pub fn improves(current: usize, candidate: usize) -> bool {
    candidate as f64 > current as f64 * ADOPTION_RATIO
}

/// An arbitrated extraction rendered for the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    /// Arbitration winner.
    pub result: ExtractionResult,
    /// `result.html` in the requested format.
    pub content: String,
    /// Method string, including retry suffixes.
    pub method: String,
    /// Tier of the extracted text.
    pub quality: Quality,
}

impl Extraction {
    /// Format `result` and grade its text.
    #[must_use]
    pub fn new(result: ExtractionResult, format: Format) -> Self {
        let content = format_content(&result.html, format);
        let quality = assess_quality(&result.text);
        let method = result.method_tag();
        Self {
            result,
            content,
            method,
            quality,
        }
    }

    /// Length used for quality tiers and retry adoption.
    #[must_use]
    pub fn length(&self) -> usize {
        self.result.text_length
    }

    fn with_suffix(mut self, suffix: &str) -> Self {
        self.method.push_str(suffix);
        self
    }
}

fn run_extractor(
    extractor: &dyn ContentExtractor,
    snapshot: Result<String>,
    page_url: &str,
) -> Option<ExtractionResult> {
    let strategy = extractor.strategy().as_str();
    let html = snapshot
        .map_err(|err| debug!(target: "harvest.extract", strategy, error = %err, "snapshot unavailable"))
        .ok()?;
    extractor
        .extract(&html, Some(page_url))
        .map_err(|err| debug!(target: "harvest.extract", strategy, error = %err, "extractor failed"))
        .ok()
}

/// Run both extractors against the live page and arbitrate.
pub async fn dual_extract<S: PageSession + ?Sized>(
    session: &S,
    page_url: &str,
    format: Format,
) -> Result<Extraction> {
    let rendered = session.rendered_html().await;
    let dom = run_extractor(&DomScoringExtractor, rendered, page_url);
    let raw = session.raw_html().await;
    let markup = run_extractor(&MarkupScoringExtractor, raw, page_url);

    arbitrate(dom, markup)
        .map(|result| Extraction::new(result, format))
        .ok_or_else(|| Error::Extraction("neither page snapshot produced content".into()))
}

enum Flow {
    Next,
    Finish(ContentResponse),
}

struct Run<'a, S: PageSession + ?Sized> {
    session: &'a S,
    options: &'a Options,
    cancel: CancellationToken,
    url: String,
    challenge: Option<ChallengeInfo>,
    best: Option<Extraction>,
    failure: Option<Error>,
    original_source: Option<String>,
}

impl<'a, S: PageSession + ?Sized> Run<'a, S> {
    fn new(session: &'a S, options: &'a Options, cancel: CancellationToken) -> Self {
        Self {
            session,
            options,
            cancel,
            url: String::new(),
            challenge: None,
            best: None,
            failure: None,
            original_source: None,
        }
    }

    fn progress(&self) -> Progress {
        Progress {
            cancelled: self.cancel.is_cancelled(),
            has_selector: self.options.custom_selector().is_some(),
            wait_for_content: self.options.wait_for_content,
            scroll_to_load: self.options.scroll_to_load,
            extracted: self.best.as_ref().map(|b| (b.quality, b.length())),
        }
    }

    async fn drive(mut self) -> ContentResponse {
        let mut stage = Stage::NoPageGuard;
        loop {
            info!(target: "harvest.controller", stage = stage.as_str(), "entering stage");
            if let Flow::Finish(response) = self.step(stage).await {
                info!(
                    target: "harvest.controller",
                    stage = stage.as_str(),
                    status = ?response.status,
                    chars = response.content_length,
                    "request finished"
                );
                return response;
            }
            stage = next_stage(stage, &self.progress());
        }
    }

    /// Run `fut` under the stage budget, racing cancellation when allowed.
    async fn guarded<T, F>(&self, stage: Stage, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        let bounded = within(stage.as_str(), stage.budget(self.options), fut);
        let result = if stage.cancellable() {
            tokio::select! {
                biased;
                () = self.cancel.cancelled() => Err(Error::Cancelled { stage: stage.as_str() }),
                result = bounded => result,
            }
        } else {
            bounded.await
        };
        match &result {
            Err(Error::Cancelled { .. }) => {
                info!(target: "harvest.controller", stage = stage.as_str(), "stage cancelled");
            }
            Err(err) => {
                warn!(target: "harvest.controller", stage = stage.as_str(), error = %err, "stage failed");
            }
            Ok(_) => {}
        }
        result
    }

    async fn step(&mut self, stage: Stage) -> Flow {
        let session = self.session;
        let url = self.url.clone();
        let format = self.options.format;

        match stage {
            Stage::NoPageGuard => self.guard_page().await,

            Stage::ChallengeWait => {
                let outcome = self
                    .guarded(stage, async move {
                        if !detect_challenge(session).await {
                            return Ok(None);
                        }
                        info!(target: "harvest.controller", "challenge page detected");
                        let info = wait_through_challenge(session, ChallengeConfig::default()).await;
                        if info.resolved {
                            wait_for_load_state(session, LoadState::DomContentLoaded, CHALLENGE_SETTLE)
                                .await;
                        }
                        Ok(Some(info))
                    })
                    .await;
                self.challenge = outcome.ok().flatten();
                if self.challenge.is_some() {
                    self.refresh_url().await;
                }
                Flow::Next
            }

            Stage::ConsentDismiss => {
                let clicked = self
                    .guarded(stage, async move { Ok(dismiss_consent(session).await) })
                    .await;
                if let Ok(Some(selector)) = clicked {
                    info!(target: "harvest.controller", selector, "consent banner dismissed");
                }
                Flow::Next
            }

            Stage::BlockCheck => {
                let verdict = self
                    .guarded(stage, async move {
                        let mut info = detect_blocked(&session.snapshot().await?);
                        if info.is_blocked && info.signals.contains(&BlockSignal::ConsentWall) {
                            debug!(target: "harvest.controller", "consent wall, retrying dismissal");
                            dismiss_consent(session).await;
                            info = detect_blocked(&session.snapshot().await?);
                        }
                        Ok(info)
                    })
                    .await;
                match verdict {
                    Ok(info) if info.is_blocked => Flow::Finish(self.blocked_response(info).await),
                    _ => Flow::Next,
                }
            }

            Stage::StabilityWait => {
                let config = StabilityConfig::new(
                    Duration::from_millis(self.options.wait_timeout_ms),
                    STABLE_WINDOW,
                );
                let report = self
                    .guarded(stage, async move { Ok(wait_for_stable_content(session, config).await) })
                    .await;
                if let Ok(report) = report {
                    debug!(
                        target: "harvest.controller",
                        ready = report.ready,
                        chars = report.text_length,
                        waited_ms = report.waited_ms,
                        "content settled"
                    );
                }
                Flow::Next
            }

            Stage::OptionalScroll => {
                let report = self
                    .guarded(stage, async move {
                        let report = scroll_to_load(session, ScrollConfig::default()).await;
                        wait_for_stable_content(session, SCROLL_SETTLE).await;
                        Ok(report)
                    })
                    .await;
                if let Ok(report) = report {
                    debug!(target: "harvest.controller", scrolls = report.scrolls, chars = report.text_length, "scrolled");
                }
                Flow::Next
            }

            Stage::CustomSelector => self.custom_selector(url).await,

            Stage::InitialExtraction => {
                match self
                    .guarded(stage, async move { dual_extract(session, &url, format).await })
                    .await
                {
                    Ok(extraction) => {
                        info!(
                            target: "harvest.controller",
                            method = %extraction.method,
                            chars = extraction.length(),
                            quality = extraction.quality.as_str(),
                            "extracted"
                        );
                        self.best = Some(extraction);
                    }
                    Err(err) => self.failure = Some(err),
                }
                Flow::Next
            }

            Stage::ArticleBorderlineRetry => {
                let candidate = self
                    .guarded(stage, async move {
                        let html = session.rendered_html().await?;
                        if !looks_like_article(&dom::parse(&html), &url) {
                            debug!(target: "harvest.controller", "not an article, no retry");
                            return Ok(None);
                        }
                        expand_read_more(session).await;
                        scroll_to_load(session, ScrollConfig::default()).await;
                        wait_for_stable_content(session, RETRY_SETTLE).await;
                        dual_extract(session, &url, format).await.map(Some)
                    })
                    .await;
                if let Ok(Some(candidate)) = candidate {
                    self.adopt(candidate, " (retry-scroll-article)");
                }
                Flow::Next
            }

            Stage::NetworkWaitRetry => {
                let candidate = self
                    .guarded(stage, async move {
                        wait_for_load_state(session, LoadState::NetworkIdle, NETWORK_IDLE).await;
                        wait_for_stable_content(session, NETWORK_SETTLE).await;
                        dual_extract(session, &url, format).await
                    })
                    .await;
                if let Ok(candidate) = candidate {
                    self.adopt(candidate, " (retry-network)");
                }
                Flow::Next
            }

            Stage::ScrollRetry => {
                let candidate = self
                    .guarded(stage, async move {
                        expand_read_more(session).await;
                        scroll_to_load(session, ScrollConfig::default()).await;
                        wait_for_stable_content(session, RETRY_SETTLE).await;
                        dual_extract(session, &url, format).await
                    })
                    .await;
                if let Ok(candidate) = candidate {
                    self.adopt(candidate, " (retry-scroll)");
                }
                Flow::Next
            }

            Stage::OriginalSourceProbe => {
                let source = self
                    .guarded(stage, async move {
                        let html = session.rendered_html().await?;
                        Ok(find_original_source(&dom::parse(&html), &url))
                    })
                    .await;
                self.original_source = source.ok().flatten();
                if let Some(source) = &self.original_source {
                    info!(target: "harvest.controller", source = %source, "original source found");
                }
                Flow::Next
            }

            Stage::Finish => Flow::Finish(self.finish().await),
        }
    }

    async fn guard_page(&mut self) -> Flow {
        let session = self.session;
        match self.guarded(Stage::NoPageGuard, session.current_url()).await {
            Ok(url) if is_blank_page(&url) => {
                let err = Error::SessionNotReady { url: url.clone() };
                info!(target: "harvest.controller", error = %err, "refusing blank session");
                let url = if url.trim().is_empty() { "about:blank".to_string() } else { url };
                let mut response = ContentResponse::new(Status::NoPage, url, "");
                response.message = Some(NO_PAGE_MESSAGE.to_string());
                Flow::Finish(response)
            }
            Ok(url) => {
                self.url = url;
                Flow::Next
            }
            Err(err) => Flow::Finish(error_response(&err, String::new(), String::new())),
        }
    }

    async fn custom_selector(&mut self, url: String) -> Flow {
        let Some(selector) = self.options.custom_selector().map(str::to_string) else {
            return Flow::Next;
        };
        let session = self.session;
        let include_metadata = self.options.include_metadata;
        let wanted = selector.clone();

        let found = self
            .guarded(Stage::CustomSelector, async move {
                session
                    .wait_for_selector(&wanted, SELECTOR_WAIT)
                    .await
                    .map_err(|err| {
                        debug!(target: "harvest.controller", error = %err, "selector wait failed");
                        Error::SelectorTimeout {
                            selector: wanted.clone(),
                            timeout_ms: SELECTOR_WAIT.as_millis() as u64,
                        }
                    })?;
                let Some(html) = session.inner_html(&wanted).await? else {
                    return Ok(None);
                };
                if html.trim().chars().count() < MIN_SELECTOR_CHARS {
                    return Ok(None);
                }
                let metadata = if include_metadata {
                    session
                        .rendered_html()
                        .await
                        .ok()
                        .map(|page| extract_metadata(&dom::parse(&page), Some(url.as_str())))
                } else {
                    None
                };
                Ok(Some((html, metadata)))
            })
            .await;

        match found {
            Ok(Some((html, metadata))) => {
                let content = format_content(&html, self.options.format);
                let quality = assess_quality(&html_to_text(&html));
                let method = format!("custom_selector({selector})");
                Flow::Finish(self.success_response(content, method, quality, metadata).await)
            }
            Ok(None) => {
                info!(target: "harvest.controller", selector = %selector, "selector content too short, scoring instead");
                Flow::Next
            }
            Err(_) => Flow::Next,
        }
    }

    fn adopt(&mut self, candidate: Extraction, suffix: &str) {
        let current = self.best.as_ref().map_or(0, Extraction::length);
        let length = candidate.length();
        if self.best.is_none() || improves(current, length) {
            info!(target: "harvest.controller", current, chars = length, suffix, "retry adopted");
            self.best = Some(candidate.with_suffix(suffix));
        } else {
            debug!(target: "harvest.controller", current, chars = length, suffix, "retry not adopted");
        }
    }

    /// Re-read the page URL after a redirect may have happened.
    async fn refresh_url(&mut self) {
        match within("finish", Stage::Finish.budget(self.options), self.session.current_url()).await {
            Ok(url) if !is_blank_page(&url) => self.url = url,
            Ok(_) => {}
            Err(err) => debug!(target: "harvest.controller", error = %err, "url re-read failed"),
        }
    }

    async fn title(&self) -> String {
        within("finish", Stage::Finish.budget(self.options), self.session.current_title())
            .await
            .unwrap_or_default()
    }

    async fn success_response(
        &mut self,
        content: String,
        method: String,
        quality: Quality,
        metadata: Option<Metadata>,
    ) -> ContentResponse {
        self.refresh_url().await;
        let title = self.title().await;
        let mut response =
            success_record(self.url.clone(), title, self.options, content, method, quality, metadata);
        response.challenge_info = self.challenge.clone();
        if let Some(source) = &self.original_source {
            response.hint = Some(aggregator_hint(source));
            response.original_source_url = Some(source.clone());
        }
        response
    }

    async fn blocked_response(&mut self, info: BlockInfo) -> ContentResponse {
        self.refresh_url().await;
        let signals = info.block_type();
        info!(target: "harvest.controller", signals = %signals, chars = info.page_text_length, "page blocked");
        let mut response = ContentResponse::new(Status::Blocked, self.url.clone(), info.title);
        response.message = Some(format!(
            "Page is blocked by: {signals}. The site requires manual intervention (disable ad-blocker, accept cookies, login, or subscribe). The full article content is not accessible to automated extraction."
        ));
        response.block_type = Some(signals);
        response.challenge_info = self.challenge.clone();
        response
    }

    async fn finish(&mut self) -> ContentResponse {
        match self.best.take() {
            Some(best) => {
                let metadata = Some(best.result.metadata);
                self.success_response(best.content, best.method, best.quality, metadata)
                    .await
            }
            None => {
                let err = self
                    .failure
                    .take()
                    .unwrap_or_else(|| Error::Extraction("no content was extracted".into()));
                error_response(&err, self.url.clone(), self.title().await)
            }
        }
    }
}

fn success_record(
    url: String,
    title: String,
    options: &Options,
    content: String,
    method: String,
    quality: Quality,
    metadata: Option<Metadata>,
) -> ContentResponse {
    let mut response = ContentResponse::new(Status::Success, url, title);
    response.format = Some(options.format);
    response.extraction_method = Some(method);
    response.content_quality = Some(quality);
    response.content_length = content.chars().count();
    response.content = content;
    if quality.needs_warning() {
        response.warning = Some(SHORT_CONTENT_WARNING.to_string());
    }
    if options.include_metadata {
        response.metadata = metadata.filter(|m| !m.is_empty());
    }
    response
}

/// Success record for an extraction made without a live page.
///
/// The title comes from the extracted metadata and the URL from
/// `options.url`.
#[must_use]
pub fn offline_response(extraction: Extraction, options: &Options) -> ContentResponse {
    let url = options.url.clone().unwrap_or_default();
    let title = extraction.result.metadata.title.clone().unwrap_or_default();
    let Extraction {
        result,
        content,
        method,
        quality,
    } = extraction;
    success_record(url, title, options, content, method, quality, Some(result.metadata))
}

fn error_response(err: &Error, url: String, title: String) -> ContentResponse {
    let mut response = ContentResponse::new(Status::Error, url, title);
    response.message = Some(err.to_string());
    response.suggestion = Some(err.suggestion().to_string());
    response
}

/// Extract the main content of the page `session` is showing.
///
/// Never fails: problems are reported through [`ContentResponse::status`].
pub async fn get_content<S: PageSession + ?Sized>(session: &S, options: &Options) -> ContentResponse {
    get_content_cancellable(session, options, CancellationToken::new()).await
}

/// [`get_content`] with cooperative cancellation.
///
/// Cancelling `cancel` interrupts the running stage's wait. If nothing was
/// extracted yet, one extraction still runs; the best result so far is
/// returned.
pub async fn get_content_cancellable<S: PageSession + ?Sized>(
    session: &S,
    options: &Options,
    cancel: CancellationToken,
) -> ContentResponse {
    Run::new(session, options, cancel).drive().await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn progress(extracted: Option<(Quality, usize)>) -> Progress {
        Progress {
            wait_for_content: true,
            extracted,
            ..Progress::default()
        }
    }

    #[test]
    fn test_adoption_threshold() {
        assert!(!improves(1000, 1050));
        assert!(!improves(1000, 1100));
        assert!(improves(1000, 1120));
        assert!(improves(0, 1));
    }

    #[test]
    fn test_budget_table_covers_every_stage_in_order() {
        let stages: Vec<Stage> = STAGE_BUDGETS.iter().map(|b| b.stage).collect();
        assert_eq!(stages, Stage::ORDER.to_vec());
    }

    #[test]
    fn test_stability_budget_follows_caller_timeout() {
        let mut options = Options::default();
        assert_eq!(Stage::StabilityWait.budget(&options), Duration::from_secs(7));
        options.wait_timeout_ms = 20_000;
        assert_eq!(Stage::StabilityWait.budget(&options), Duration::from_secs(22));
    }

    #[test]
    fn test_front_half_transitions() {
        let p = progress(None);
        assert_eq!(next_stage(Stage::NoPageGuard, &p), Stage::ChallengeWait);
        assert_eq!(next_stage(Stage::BlockCheck, &p), Stage::StabilityWait);
        assert_eq!(next_stage(Stage::StabilityWait, &p), Stage::InitialExtraction);

        let p = Progress { wait_for_content: false, scroll_to_load: true, has_selector: true, ..p };
        assert_eq!(next_stage(Stage::BlockCheck, &p), Stage::OptionalScroll);
        assert_eq!(next_stage(Stage::OptionalScroll, &p), Stage::CustomSelector);
    }

    #[test]
    fn test_good_content_finishes_without_retries() {
        let p = progress(Some((Quality::Good, 3000)));
        assert_eq!(next_stage(Stage::InitialExtraction, &p), Stage::Finish);
    }

    #[test]
    fn test_borderline_article_gets_one_retry() {
        let p = progress(Some((Quality::Good, 1200)));
        assert_eq!(next_stage(Stage::InitialExtraction, &p), Stage::ArticleBorderlineRetry);
        assert_eq!(next_stage(Stage::ArticleBorderlineRetry, &p), Stage::Finish);
    }

    #[test]
    fn test_short_content_escalates() {
        let p = progress(Some((Quality::Short, 300)));
        assert_eq!(next_stage(Stage::InitialExtraction, &p), Stage::NetworkWaitRetry);
        assert_eq!(next_stage(Stage::NetworkWaitRetry, &p), Stage::ScrollRetry);
        assert_eq!(next_stage(Stage::ScrollRetry, &p), Stage::OriginalSourceProbe);

        let p = Progress { has_selector: true, ..p };
        assert_eq!(next_stage(Stage::InitialExtraction, &p), Stage::OriginalSourceProbe);
    }

    #[test]
    fn test_failed_extraction_goes_to_finish() {
        assert_eq!(next_stage(Stage::InitialExtraction, &progress(None)), Stage::Finish);
    }

    #[test]
    fn test_cancellation_jumps_to_extraction_once() {
        let p = Progress { cancelled: true, ..progress(None) };
        assert_eq!(next_stage(Stage::ChallengeWait, &p), Stage::InitialExtraction);

        let p = Progress { cancelled: true, ..progress(Some((Quality::Poor, 10))) };
        assert_eq!(next_stage(Stage::InitialExtraction, &p), Stage::Finish);
    }

    #[test]
    fn test_only_guard_and_extraction_ignore_cancel() {
        let ignored: Vec<Stage> = Stage::ORDER.into_iter().filter(|s| !s.cancellable()).collect();
        assert_eq!(ignored, vec![Stage::NoPageGuard, Stage::InitialExtraction, Stage::Finish]);
    }
}
