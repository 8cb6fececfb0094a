//! # rs-harvest
//!
//! Main-content extraction for rendered, dynamic and hostile web pages.
//!
//! Given a live browser page, [`get_content`] waits out bot-verification
//! interstitials, dismisses consent banners, refuses paywalled or
//! login-walled pages, waits for the text to settle, scores the rendered
//! DOM and the served markup independently, keeps the better of the two
//! and escalates through retries while the result looks short.
//!
//! The browser itself stays outside the crate: callers implement
//! [`PageSession`] for whatever driver they use.
//!
//! ## Offline use
//!
//! [`extract_html`] runs the markup scorer on a string, with no page
//! behind it:
//!
//! ```rust
//! use rs_harvest::{extract_html, Method, Options};
//!
//! let html = r#"<html><head><title>My Article</title></head>
//! <body><nav><a href="/">Home</a></nav>
//! <article>
//!   <p>Main content here. The article body holds a couple of ordinary paragraphs of prose.</p>
//!   <p>Each paragraph is long enough to count, and together they pass the two hundred character mark.</p>
//!   <p>Navigation links outside the article are left behind.</p>
//! </article>
//! </body></html>"#;
//!
//! let result = extract_html(html, &Options::default())?;
//! assert_eq!(result.method, Method::SemanticLandmark);
//! assert!(result.text.starts_with("Main content here"));
//! # Ok::<(), rs_harvest::Error>(())
//! ```
//!
//! ## Live pages
//!
//! ```rust,ignore
//! let response = rs_harvest::get_content(&session, &Options::default()).await;
//! println!("{}", response.to_json_pretty()?);
//! ```

mod error;
mod options;
mod patterns;
mod quality;
mod result;

/// DOM helpers over `dom_query`.
pub mod dom;

/// Removal of scripts, chrome, ads and hidden elements.
pub mod noise;

/// Block-level text scoring and ancestor propagation.
pub mod scoring;

/// Candidate selection, both extraction strategies and arbitration.
pub mod extractor;

/// Text, Markdown and HTML output.
pub mod format;

/// Title, author, date and related metadata.
pub mod metadata;

/// Pure detectors over page snapshots: challenges, blocks, articles.
pub mod detect;

/// The browser-page collaborator trait.
pub mod session;

/// Polling waits.
pub mod wait;

/// Consent, read-more and scroll interactions.
pub mod interact;

/// Original-source detection for aggregator pages.
pub mod source;

/// The retry and escalation state machine.
pub mod controller;

/// URL parsing and host comparison.
pub mod url_utils;

/// Charset sniffing for served bytes.
pub mod encoding;

pub use controller::{get_content, get_content_cancellable, Extraction, Stage};
pub use error::{Error, ErrorKind, Result};
pub use extractor::{ContentExtractor, DomScoringExtractor, MarkupScoringExtractor};
pub use options::{Format, Options};
pub use quality::{assess_quality, Quality};
pub use result::{
    BlockInfo, BlockSignal, ChallengeInfo, ContentResponse, ExtractionResult, Metadata, Method,
    Status, Strategy,
};
pub use session::{LoadState, PageSession};

/// Extract the main content of served markup.
///
/// Runs the markup strategy only. `options.url` is used to resolve the
/// canonical URL in the metadata; the format and live-page options are
/// ignored.
pub fn extract_html(html: &str, options: &Options) -> Result<ExtractionResult> {
    MarkupScoringExtractor.extract(html, options.url.as_deref())
}

/// [`extract_html`] for undecoded bytes.
///
/// The charset comes from a byte-order mark or a `<meta>` declaration and
/// defaults to UTF-8. Malformed sequences become U+FFFD.
///
/// ```rust
/// use rs_harvest::{extract_html_bytes, Options};
///
/// let html = b"<html><head><meta charset=\"ISO-8859-1\"></head><body><article><p>Caf\xE9 au lait, served every morning in the old town square.</p></article></body></html>";
/// let result = extract_html_bytes(html, &Options::default())?;
/// assert!(result.text.contains("Café"));
/// # Ok::<(), rs_harvest::Error>(())
/// ```
pub fn extract_html_bytes(html: &[u8], options: &Options) -> Result<ExtractionResult> {
    extract_html(&encoding::decode_html(html), options)
}

/// Extract served markup and wrap it in the record [`get_content`] returns.
///
/// `content` is rendered in `options.format`; metadata is attached when
/// `options.include_metadata` is set.
pub fn extract_html_response(html: &str, options: &Options) -> Result<ContentResponse> {
    let result = extract_html(html, options)?;
    Ok(controller::offline_response(
        Extraction::new(result, options.format),
        options,
    ))
}
