//! Configuration options for content extraction.
//!
//! The `Options` struct is the per-call configuration surface. It can be built
//! in code or deserialized from a JSON request body.

use serde::{Deserialize, Serialize};

/// Output format for extracted content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// Paragraph-preserving plain text.
    Text,
    /// GitHub flavored markdown.
    #[default]
    Markdown,
    /// The chosen container's markup, unchanged.
    Html,
}

impl Format {
    /// Lowercase name used in responses.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Markdown => "markdown",
            Self::Html => "html",
        }
    }
}

impl std::str::FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "markdown" | "md" => Ok(Self::Markdown),
            "html" => Ok(Self::Html),
            other => Err(format!("unknown format {other:?}")),
        }
    }
}

/// Configuration options for content extraction.
///
/// All fields are public for easy configuration. Use `Default::default()`
/// for standard settings.
///
/// # Example
///
/// ```rust
/// use rs_harvest::{Format, Options};
///
/// let options = Options {
///     format: Format::Text,
///     scroll_to_load: true,
///     ..Options::default()
/// };
/// assert_eq!(options.wait_timeout_ms, 5000);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[allow(clippy::struct_excessive_bools)]
pub struct Options {
    /// Output format of `content`.
    ///
    /// Default: `Format::Markdown`
    pub format: Format,

    /// CSS selector of the element holding the content.
    ///
    /// When it matches within 10s and holds at least 50 characters of markup,
    /// its inner markup is returned directly and automatic detection is skipped.
    ///
    /// Default: `None`
    pub selector: Option<String>,

    /// Wait for rendered text to stop growing before extracting.
    ///
    /// Default: `true`
    pub wait_for_content: bool,

    /// Budget for the initial stability wait (milliseconds).
    ///
    /// Default: `5000`
    #[serde(alias = "wait_timeout")]
    pub wait_timeout_ms: u64,

    /// Scroll the page to trigger lazy loading before the first extraction.
    ///
    /// Default: `false`
    pub scroll_to_load: bool,

    /// Attach page metadata to the response.
    ///
    /// Default: `false`
    pub include_metadata: bool,

    /// Document URL for offline extraction.
    ///
    /// Used by [`crate::extract_html`] to resolve the canonical URL and
    /// relative links when no session is involved.
    ///
    /// Default: `None`
    pub url: Option<String>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            format: Format::Markdown,
            selector: None,
            wait_for_content: true,
            wait_timeout_ms: 5000,
            scroll_to_load: false,
            include_metadata: false,
            url: None,
        }
    }
}

impl Options {
    /// The custom selector, ignoring blank strings.
    #[must_use]
    pub fn custom_selector(&self) -> Option<&str> {
        self.selector
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = Options::default();
        assert_eq!(options.format, Format::Markdown);
        assert!(options.wait_for_content);
        assert_eq!(options.wait_timeout_ms, 5000);
        assert!(!options.scroll_to_load);
        assert!(!options.include_metadata);
        assert!(options.selector.is_none());
    }

    #[test]
    fn test_deserialize_partial_request() {
        let options: Options =
            serde_json::from_str(r##"{"format":"text","wait_timeout":2000,"selector":"#story"}"##)
                .unwrap_or_else(|err| panic!("expected Ok(_), got Err({err:?})"));
        assert_eq!(options.format, Format::Text);
        assert_eq!(options.wait_timeout_ms, 2000);
        assert_eq!(options.custom_selector(), Some("#story"));
        assert!(options.wait_for_content);
    }

    #[test]
    fn test_blank_selector_is_ignored() {
        let options = Options {
            selector: Some("   ".into()),
            ..Options::default()
        };
        assert_eq!(options.custom_selector(), None);
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!("HTML".parse::<Format>(), Ok(Format::Html));
        assert_eq!("md".parse::<Format>(), Ok(Format::Markdown));
        assert!("pdf".parse::<Format>().is_err());
    }
}
