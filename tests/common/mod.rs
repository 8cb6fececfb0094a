//! Scripted page session for driving the controller without a browser.
//!
//! A page is a timeline of frames keyed by virtual time since the session
//! was created, so tests run under `start_paused` see content change at
//! fixed instants regardless of how often the controller polls.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use rs_harvest::format::html_to_text;
use rs_harvest::session::{
    BODY_TEXT_JS, INNER_HTML_JS, RENDERED_HTML_JS, SCROLL_METRICS_JS, SCROLL_TO_TOP_JS,
};
use rs_harvest::{Error, LoadState, PageSession, Result};
use serde_json::{json, Value};
use tokio::time::{sleep, Instant};

/// Page state from `at` onwards.
#[derive(Debug, Clone)]
pub struct Frame {
    pub at: Duration,
    pub title: String,
    pub html: String,
    pub url: Option<String>,
}

impl Frame {
    pub fn new(at_ms: u64, title: &str, html: impl Into<String>) -> Self {
        Self {
            at: Duration::from_millis(at_ms),
            title: title.to_string(),
            html: html.into(),
            url: None,
        }
    }

    /// The page has navigated to `url` by this frame.
    pub fn at_url(mut self, url: &str) -> Self {
        self.url = Some(url.to_string());
        self
    }
}

#[derive(Debug, Default)]
struct Script {
    frames: Vec<Frame>,
    visible: HashSet<String>,
    after_click: HashMap<String, Vec<Frame>>,
    clicks: Vec<String>,
    load_states: Vec<LoadState>,
    scrolls: usize,
}

pub struct FakeSession {
    url: String,
    raw: Option<String>,
    start: Instant,
    fail_snapshots: bool,
    selectors: HashMap<String, String>,
    script: Mutex<Script>,
}

impl FakeSession {
    /// A page that never changes; the served markup equals the rendered one.
    pub fn new(url: &str, title: &str, html: impl Into<String>) -> Self {
        let html = html.into();
        Self {
            url: url.to_string(),
            raw: Some(html.clone()),
            start: Instant::now(),
            fail_snapshots: false,
            selectors: HashMap::new(),
            script: Mutex::new(Script {
                frames: vec![Frame::new(0, title, html)],
                ..Script::default()
            }),
        }
    }

    /// A page whose rendered state follows `frames`.
    pub fn timeline(url: &str, frames: Vec<Frame>) -> Self {
        let first = frames.first().map(|f| f.html.clone()).unwrap_or_default();
        let session = Self::new(url, "", first);
        session.lock().frames = frames;
        session
    }

    /// Served markup, when it differs from the first frame.
    pub fn with_raw(mut self, raw: impl Into<String>) -> Self {
        self.raw = Some(raw.into());
        self
    }

    /// `raw_html` and `rendered_html` both fail.
    pub fn failing_snapshots(mut self) -> Self {
        self.fail_snapshots = true;
        self.raw = None;
        self
    }

    /// `selector` is visible; clicking it replaces the timeline with `then`,
    /// shifted to the click instant.
    pub fn clickable(self, selector: &str, then: Vec<Frame>) -> Self {
        {
            let mut script = self.lock();
            script.visible.insert(selector.to_string());
            script.after_click.insert(selector.to_string(), then);
        }
        self
    }

    /// Inner HTML served for a plain CSS selector.
    pub fn with_selector(mut self, selector: &str, inner_html: &str) -> Self {
        self.selectors.insert(selector.to_string(), inner_html.to_string());
        self
    }

    pub fn clicks(&self) -> Vec<String> {
        self.lock().clicks.clone()
    }

    pub fn load_states(&self) -> Vec<LoadState> {
        self.lock().load_states.clone()
    }

    pub fn scrolls(&self) -> usize {
        self.lock().scrolls
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn frame(&self) -> Frame {
        let elapsed = self.start.elapsed();
        let script = self.lock();
        script
            .frames
            .iter()
            .rfind(|f| f.at <= elapsed)
            .or_else(|| script.frames.first())
            .cloned()
            .unwrap_or_else(|| Frame::new(0, "", ""))
    }
}

#[async_trait]
impl PageSession for FakeSession {
    async fn current_url(&self) -> Result<String> {
        Ok(self.frame().url.unwrap_or_else(|| self.url.clone()))
    }

    async fn current_title(&self) -> Result<String> {
        Ok(self.frame().title)
    }

    async fn raw_html(&self) -> Result<String> {
        self.raw
            .clone()
            .ok_or_else(|| Error::Session("Target page, context or browser has been closed".into()))
    }

    async fn evaluate(&self, script: &str, arg: Value) -> Result<Value> {
        if self.fail_snapshots && (script == RENDERED_HTML_JS || script == BODY_TEXT_JS) {
            return Err(Error::Session("Target page, context or browser has been closed".into()));
        }
        let frame = self.frame();
        Ok(match script {
            RENDERED_HTML_JS => Value::from(frame.html),
            BODY_TEXT_JS => Value::from(html_to_text(&frame.html)),
            SCROLL_METRICS_JS => json!({"scroll_height": 2400.0, "viewport_height": 800.0}),
            SCROLL_TO_TOP_JS => Value::Null,
            INNER_HTML_JS => arg
                .as_str()
                .and_then(|sel| self.selectors.get(sel))
                .map_or(Value::Null, |html| Value::from(html.as_str())),
            _ => Value::Null,
        })
    }

    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> Result<()> {
        if self.selectors.contains_key(selector) {
            return Ok(());
        }
        sleep(timeout).await;
        Err(Error::Session(format!(
            "Timeout {}ms exceeded waiting for {selector}",
            timeout.as_millis()
        )))
    }

    async fn wait_for_load_state(&self, state: LoadState, _timeout: Duration) -> Result<()> {
        self.lock().load_states.push(state);
        Ok(())
    }

    async fn scroll_by(&self, _dx: f64, _dy: f64) -> Result<()> {
        self.lock().scrolls += 1;
        Ok(())
    }

    async fn click(&self, selector: &str, _timeout: Duration) -> Result<()> {
        let elapsed = self.start.elapsed();
        let mut script = self.lock();
        script.clicks.push(selector.to_string());
        script.visible.remove(selector);
        if let Some(frames) = script.after_click.remove(selector) {
            script.frames = frames
                .into_iter()
                .map(|mut f| {
                    f.at += elapsed;
                    f
                })
                .collect();
        }
        Ok(())
    }

    async fn is_visible(&self, selector: &str, _timeout: Duration) -> Result<bool> {
        Ok(self.lock().visible.contains(selector))
    }
}

const SENTENCE: &str = "The council approved the harbour plan after a long debate about costs and tides. ";

/// Prose of exactly `chars` characters, no trailing space.
pub fn prose(chars: usize) -> String {
    let mut text: String = SENTENCE.chars().cycle().take(chars).collect();
    if text.ends_with(' ') {
        text.pop();
        text.push('.');
    }
    text
}

/// A page with one `<article>` holding `chars` characters of prose, plus
/// navigation and footer chrome.
pub fn article_page(title: &str, chars: usize) -> String {
    format!(
        r#"<html><head><title>{title}</title></head><body>
<nav><a href="/">Home</a> <a href="/news">News</a> <a href="/sport">Sport</a></nav>
<article><h1>{title}</h1><p>{body}</p></article>
<footer><p>Copyright Harbour Gazette</p></footer>
</body></html>"#,
        body = prose(chars)
    )
}
