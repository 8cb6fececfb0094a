//! Output formatting of the extracted container.

pub mod markdown;
pub mod text;

pub use markdown::html_to_markdown;
pub use text::html_to_text;

use crate::options::Format;

/// Render extracted HTML in the requested format.
///
/// `Html` returns the input unchanged.
#[must_use]
pub fn format_content(html: &str, format: Format) -> String {
    match format {
        Format::Html => html.to_string(),
        Format::Text => html_to_text(html),
        Format::Markdown => html_to_markdown(html),
    }
}
