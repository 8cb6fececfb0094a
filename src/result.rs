//! Result types for extraction output.
//!
//! This module defines what one extractor produces ([`ExtractionResult`]),
//! what the detectors report ([`ChallengeInfo`], [`BlockInfo`]) and the
//! record handed back to callers ([`ContentResponse`]).

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::options::Format;
use crate::quality::Quality;

/// How a container was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    /// First non-trivial `[itemprop=articleBody]`, `article`, `[role=main]` or `main`.
    SemanticLandmark,
    /// Highest-scoring candidate after ancestor expansion.
    Scoring,
    /// Neither candidate was usable; the cleaned body was returned.
    BodyFallback,
}

impl Method {
    /// Snake-case tag used in method strings.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SemanticLandmark => "semantic_landmark",
            Self::Scoring => "scoring",
            Self::BodyFallback => "body_fallback",
        }
    }
}

/// Which document an extractor scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Rendered DOM snapshot taken from the live page.
    Dom,
    /// Served markup, no script execution.
    Markup,
}

impl Strategy {
    /// Short name used as method prefix.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dom => "dom",
            Self::Markup => "markup",
        }
    }
}

/// Output of a single extractor invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionResult {
    /// Inner markup of the chosen container (plus merged siblings).
    pub html: String,

    /// Whitespace-collapsed text of the chosen container.
    pub text: String,

    /// Character count of `text`.
    pub text_length: usize,

    /// How the container was chosen.
    pub method: Method,

    /// Which document was scored.
    pub strategy: Strategy,

    /// Whether following siblings were merged into the container.
    pub merged_siblings: bool,

    /// Text-bearing blocks inside the container.
    pub paragraph_count: usize,

    /// Best-effort page metadata.
    pub metadata: Metadata,
}

impl ExtractionResult {
    /// Method string reported to callers, e.g. `dom:scoring+siblings`.
    #[must_use]
    pub fn method_tag(&self) -> String {
        let mut tag = format!("{}:{}", self.strategy.as_str(), self.method.as_str());
        if self.merged_siblings {
            tag.push_str("+siblings");
        }
        tag
    }
}

/// Metadata extracted from a page.
///
/// All fields are optional as metadata may not be present in all documents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    /// Page title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Page description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Author name(s).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    /// Publication date, RFC 3339 when parseable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_date: Option<String>,

    /// Canonical URL of the document.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub canonical_url: Option<String>,

    /// Document language from `<html lang>`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    /// Site name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site_name: Option<String>,
}

impl Metadata {
    /// True when no field was found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Outcome of waiting through a bot-verification interstitial.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeInfo {
    /// A challenge was observed on entry.
    pub was_challenged: bool,
    /// The challenge signal disappeared before the deadline.
    pub resolved: bool,
    /// Time spent polling.
    pub waited_ms: u64,
    /// Page title when polling ended.
    pub title: String,
}

/// Reason a page is considered blocked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockSignal {
    /// "Disable your ad blocker" interstitial.
    AdBlockerWall,
    /// Subscription required.
    Paywall,
    /// Short page asking the reader to sign in.
    LoginWall,
    /// Short page that only says JavaScript is required.
    JsRequired,
    /// Cookie or consent wall covering the content.
    ConsentWall,
    /// Bot-detection block page.
    BotDetection,
}

impl BlockSignal {
    /// Snake-case name used in responses.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AdBlockerWall => "ad_blocker_wall",
            Self::Paywall => "paywall",
            Self::LoginWall => "login_wall",
            Self::JsRequired => "js_required",
            Self::ConsentWall => "consent_wall",
            Self::BotDetection => "bot_detection",
        }
    }
}

impl fmt::Display for BlockSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Blocked-page verdict.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockInfo {
    /// At least one signal fired.
    pub is_blocked: bool,
    /// Signals that fired.
    pub signals: BTreeSet<BlockSignal>,
    /// Length of the page's visible text.
    pub page_text_length: usize,
    /// Page title.
    pub title: String,
}

impl BlockInfo {
    /// Comma-separated signal names.
    #[must_use]
    pub fn block_type(&self) -> String {
        self.signals
            .iter()
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Terminal status of a `get_content` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// Content was extracted (possibly short, see `warning`).
    Success,
    /// The page needs manual intervention.
    Blocked,
    /// The session has not navigated anywhere.
    NoPage,
    /// An unrecovered failure.
    Error,
}

/// Record returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentResponse {
    /// Terminal status.
    pub status: Status,

    /// Page URL at the end of the call.
    pub url: String,

    /// Page title at the end of the call.
    pub title: String,

    /// Output format of `content`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<Format>,

    /// How the content was chosen, e.g. `dom:semantic_landmark (retry-network)`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extraction_method: Option<String>,

    /// Quality tier of `content`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_quality: Option<Quality>,

    /// Formatted content.
    pub content: String,

    /// Character count of `content`.
    pub content_length: usize,

    /// Present when the content is poor or short.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,

    /// Page metadata, when requested and found.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,

    /// Present when a challenge was observed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub challenge_info: Option<ChallengeInfo>,

    /// Signals for blocked pages, comma separated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_type: Option<String>,

    /// Likely location of the full article on aggregator pages.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_source_url: Option<String>,

    /// Explanation accompanying `original_source_url`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,

    /// Explanation for non-success statuses.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Suggested next step for `error` statuses.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl ContentResponse {
    /// Empty record with the given status.
    #[must_use]
    pub fn new(status: Status, url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            status,
            url: url.into(),
            title: title.into(),
            format: None,
            extraction_method: None,
            content_quality: None,
            content: String::new(),
            content_length: 0,
            warning: None,
            metadata: None,
            challenge_info: None,
            block_type: None,
            original_source_url: None,
            hint: None,
            message: None,
            suggestion: None,
        }
    }

    /// Pretty-printed JSON form of the record.
    pub fn to_json_pretty(&self) -> crate::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
