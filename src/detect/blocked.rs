//! Pages that withhold content until a human acts.

use std::collections::BTreeSet;

use crate::result::{BlockInfo, BlockSignal};

use super::{any_match, char_prefix, PageSnapshot};

/// Only the start of the body text is searched.
pub const BLOCK_TEXT_WINDOW: usize = 3000;

/// A login prompt only counts on pages shorter than this.
pub const LOGIN_WALL_MAX_CHARS: usize = 500;

/// A JavaScript prompt only counts on pages shorter than this.
pub const JS_REQUIRED_MAX_CHARS: usize = 200;

/// Full-page consent overlays.
pub const CONSENT_WALL_SELECTOR: &str = "[class*=\"consent-wall\"], [class*=\"cookie-wall\"], [id*=\"consent-wall\"], [class*=\"gdpr-blocker\"]";

const AD_BLOCKER_TERMS: &[&str] = &["ad blocker", "adblock"];
const AD_BLOCKER_ACTIONS: &[&str] = &["disable", "turn off", "whitelist"];
const PAYWALL_TERMS: &[&str] = &[
    "subscribe to continue",
    "subscription required",
    "premium content",
    "members only",
    "sign in to read",
    "log in to continue",
    "create a free account",
    "to continue reading",
];
const LOGIN_TERMS: &[&str] = &["sign in", "log in"];
const LOGIN_ACTIONS: &[&str] = &["continue", "read", "access"];
const JS_TERMS: &[&str] = &["enable javascript", "javascript is required", "please enable js"];
const BOT_TERMS: &[&str] = &["bot detected", "automated access", "not a robot", "unusual traffic"];

fn mentions(text: &str, terms: &[&str]) -> bool {
    terms.iter().any(|t| text.contains(t))
}

/// Classify the page's blocking signals.
#[must_use]
pub fn detect_blocked(page: &PageSnapshot) -> BlockInfo {
    let text_len = page.body_text.trim().chars().count();
    let head = char_prefix(&page.body_text, BLOCK_TEXT_WINDOW).to_lowercase();

    let mut signals = BTreeSet::new();
    if mentions(&head, AD_BLOCKER_TERMS) && mentions(&head, AD_BLOCKER_ACTIONS) {
        signals.insert(BlockSignal::AdBlockerWall);
    }
    if mentions(&head, PAYWALL_TERMS) {
        signals.insert(BlockSignal::Paywall);
    }
    if text_len < LOGIN_WALL_MAX_CHARS && mentions(&head, LOGIN_TERMS) && mentions(&head, LOGIN_ACTIONS) {
        signals.insert(BlockSignal::LoginWall);
    }
    if text_len < JS_REQUIRED_MAX_CHARS && mentions(&head, JS_TERMS) {
        signals.insert(BlockSignal::JsRequired);
    }
    if any_match(&page.document(), CONSENT_WALL_SELECTOR) {
        signals.insert(BlockSignal::ConsentWall);
    }
    if mentions(&head, BOT_TERMS) {
        signals.insert(BlockSignal::BotDetection);
    }

    BlockInfo {
        is_blocked: !signals.is_empty(),
        signals,
        page_text_length: text_len,
        title: page.title.clone(),
    }
}
