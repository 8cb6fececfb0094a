//! Error types for rs-harvest.
//!
//! Most failures inside the extraction engine are recovered locally and never
//! reach the caller. The variants here describe what a stage saw so that the
//! controller can log it, and so that user-visible failures can carry a
//! suggestion string.

use std::fmt;

/// Error type for session and extraction operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The session has not navigated anywhere yet.
    #[error("No page is loaded (current url: {url:?})")]
    SessionNotReady {
        /// URL reported by the session, usually `about:blank`.
        url: String,
    },

    /// A caller-supplied selector never appeared.
    #[error("Selector {selector:?} not found within {timeout_ms}ms timeout")]
    SelectorTimeout {
        /// The CSS selector that was awaited.
        selector: String,
        /// Budget that elapsed.
        timeout_ms: u64,
    },

    /// A controller stage ran past its budget.
    #[error("Stage {stage} exceeded its {timeout_ms}ms timeout")]
    StageTimeout {
        /// Stage name as logged by the controller.
        stage: &'static str,
        /// Budget that elapsed.
        timeout_ms: u64,
    },

    /// The request was cancelled while a stage was running.
    #[error("Stage {stage} was cancelled")]
    Cancelled {
        /// Stage name as logged by the controller.
        stage: &'static str,
    },

    /// The page session collaborator reported a failure.
    #[error("Session error: {0}")]
    Session(String),

    /// Scoring or formatting failed.
    #[error("Extraction failed: {0}")]
    Extraction(String),

    /// A value returned by the session could not be decoded.
    #[error("Malformed session value: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for extraction operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of an error's underlying cause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Something took too long.
    Timeout,
    /// A selector did not match anything.
    Selector,
    /// Connectivity problem between the session and the site.
    Network,
    /// Anything else.
    Unknown,
}

impl ErrorKind {
    /// Human-readable hint shown next to user-visible failures.
    #[must_use]
    pub const fn suggestion(self) -> &'static str {
        match self {
            Self::Timeout => "The page took too long to load. Try increasing timeout or check your internet connection.",
            Self::Selector => "The selector may have changed or the element doesn't exist. Try a different selector.",
            Self::Network => "Check your internet connection and try again.",
            Self::Unknown => "Please check the error message and try again with different parameters.",
        }
    }

    /// Classify a free-form error message.
    #[must_use]
    pub fn from_message(message: &str) -> Self {
        let lower = message.to_lowercase();
        if lower.contains("timeout") || lower.contains("timed out") {
            Self::Timeout
        } else if lower.contains("not found") || lower.contains("no element") {
            Self::Selector
        } else if lower.contains("network") || lower.contains("connection") {
            Self::Network
        } else {
            Self::Unknown
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Timeout => "timeout",
            Self::Selector => "selector",
            Self::Network => "network",
            Self::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

impl Error {
    /// Classify this error for suggestion lookup.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::StageTimeout { .. } => ErrorKind::Timeout,
            Self::SelectorTimeout { .. } => ErrorKind::Selector,
            Self::Session(message) => ErrorKind::from_message(message),
            Self::SessionNotReady { .. }
            | Self::Cancelled { .. }
            | Self::Extraction(_)
            | Self::Serialization(_) => {
                ErrorKind::Unknown
            }
        }
    }

    /// Suggestion string for this error.
    #[must_use]
    pub fn suggestion(&self) -> &'static str {
        self.kind().suggestion()
    }
}
