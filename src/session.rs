//! The live page an extraction request works against.
//!
//! Browser drivers implement [`PageSession`]; the engine never launches,
//! navigates or closes pages itself. One session is owned by one request for
//! its whole duration.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use crate::detect::PageSnapshot;
use crate::error::{Error, Result};

/// Serialized rendered DOM.
pub const RENDERED_HTML_JS: &str = "() => document.documentElement ? document.documentElement.outerHTML : ''";

/// Rendered text of the body.
pub const BODY_TEXT_JS: &str = "() => (document.body && document.body.innerText) || ''";

/// Scroll extent and viewport height.
pub const SCROLL_METRICS_JS: &str = "() => ({ scroll_height: document.body ? document.body.scrollHeight : 0, viewport_height: window.innerHeight || 0 })";

/// Scroll back to the top-left corner.
pub const SCROLL_TO_TOP_JS: &str = "() => { window.scrollTo(0, 0); return null; }";

/// Inner HTML of the first element matching the argument.
pub const INNER_HTML_JS: &str = "(sel) => { const el = document.querySelector(sel); return el ? el.innerHTML : null; }";

/// Load milestones a driver can wait for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    /// `DOMContentLoaded` fired.
    DomContentLoaded,
    /// `load` fired.
    Load,
    /// No network activity for a short period.
    NetworkIdle,
}

impl LoadState {
    /// Playwright-style name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DomContentLoaded => "domcontentloaded",
            Self::Load => "load",
            Self::NetworkIdle => "networkidle",
        }
    }
}

impl fmt::Display for LoadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scroll geometry of the page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct ScrollMetrics {
    /// `document.body.scrollHeight`.
    pub scroll_height: f64,
    /// `window.innerHeight`.
    pub viewport_height: f64,
}

/// A navigated browser page.
///
/// Selectors passed to [`click`](Self::click), [`is_visible`](Self::is_visible)
/// and [`wait_for_selector`](Self::wait_for_selector) may use the driver's
/// extended syntax such as `button:has-text('Accept all')`.
///
/// The provided methods are written in terms of [`evaluate`](Self::evaluate);
/// drivers with native equivalents can override them.
#[async_trait]
pub trait PageSession: Send + Sync {
    /// URL of the current document; empty when nothing is loaded.
    async fn current_url(&self) -> Result<String>;

    /// Title of the current document.
    async fn current_title(&self) -> Result<String>;

    /// Markup as served, without script-made changes.
    async fn raw_html(&self) -> Result<String>;

    /// Run a function expression in the page with one JSON argument.
    async fn evaluate(&self, script: &str, arg: Value) -> Result<Value>;

    /// Wait until `selector` matches an attached element.
    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> Result<()>;

    /// Wait for a load milestone.
    async fn wait_for_load_state(&self, state: LoadState, timeout: Duration) -> Result<()>;

    /// Scroll the viewport by a pixel offset.
    async fn scroll_by(&self, dx: f64, dy: f64) -> Result<()>;

    /// Click the first element matching `selector`.
    async fn click(&self, selector: &str, timeout: Duration) -> Result<()>;

    /// Whether the first element matching `selector` is visible.
    async fn is_visible(&self, selector: &str, timeout: Duration) -> Result<bool>;

    /// Serialized rendered DOM.
    async fn rendered_html(&self) -> Result<String> {
        let value = self.evaluate(RENDERED_HTML_JS, Value::Null).await?;
        string_value(value, "rendered_html")
    }

    /// Rendered text of `<body>`.
    async fn body_text(&self) -> Result<String> {
        let value = self.evaluate(BODY_TEXT_JS, Value::Null).await?;
        string_value(value, "body_text")
    }

    /// Scroll height and viewport height.
    async fn scroll_metrics(&self) -> Result<ScrollMetrics> {
        let value = self.evaluate(SCROLL_METRICS_JS, Value::Null).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Scroll back to the top of the page.
    async fn scroll_to_top(&self) -> Result<()> {
        self.evaluate(SCROLL_TO_TOP_JS, Value::Null).await?;
        Ok(())
    }

    /// Inner HTML of the first element matching a plain CSS selector.
    async fn inner_html(&self, selector: &str) -> Result<Option<String>> {
        match self.evaluate(INNER_HTML_JS, Value::from(selector)).await? {
            Value::Null => Ok(None),
            value => string_value(value, "inner_html").map(Some),
        }
    }

    /// Capture what the detectors need.
    async fn snapshot(&self) -> Result<PageSnapshot> {
        Ok(PageSnapshot {
            url: self.current_url().await?,
            title: self.current_title().await?,
            body_text: self.body_text().await?,
            html: self.rendered_html().await?,
        })
    }
}

fn string_value(value: Value, what: &str) -> Result<String> {
    match value {
        Value::String(s) => Ok(s),
        Value::Null => Ok(String::new()),
        other => Err(Error::Session(format!("{what} returned non-string value {other}"))),
    }
}
