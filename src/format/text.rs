//! Plain-text rendering that keeps paragraph structure.

use dom_query::NodeRef;

use crate::dom;
use crate::patterns::{EXCESS_NEWLINES, INLINE_WHITESPACE};

/// Elements surrounded by line breaks in the text rendering.
pub const BLOCK_TAGS: &[&str] = &[
    "p", "div", "br", "hr", "h1", "h2", "h3", "h4", "h5", "h6", "li", "tr", "blockquote", "pre",
    "table", "section", "article", "ul", "ol", "dl", "dt", "dd", "figure", "figcaption",
];

/// Table cells, kept on their row but separated by a space.
pub const CELL_TAGS: &[&str] = &["td", "th"];

/// Never rendered.
pub const SKIPPED_TAGS: &[&str] = &["script", "style", "noscript"];

/// Render an HTML fragment as plain text.
///
/// Block elements are separated by newlines, inline whitespace collapses to
/// one space, each line is trimmed and runs of blank lines shrink to one.
#[must_use]
pub fn html_to_text(html: &str) -> String {
    let doc = dom::parse(html);
    let mut raw = String::with_capacity(html.len() / 2);
    for node in dom::body(&doc).nodes() {
        collect(*node, &mut raw);
    }
    tidy(&raw)
}

fn collect(node: NodeRef<'_>, out: &mut String) {
    for child in node.children() {
        if child.is_text() {
            out.push_str(&child.text());
            continue;
        }
        let Some(tag) = dom::node_tag(&child) else { continue };
        if SKIPPED_TAGS.contains(&tag.as_str()) {
            continue;
        }
        let separator = if BLOCK_TAGS.contains(&tag.as_str()) {
            Some('\n')
        } else if CELL_TAGS.contains(&tag.as_str()) {
            Some(' ')
        } else {
            None
        };
        if let Some(sep) = separator {
            out.push(sep);
        }
        collect(child, out);
        if let Some(sep) = separator {
            out.push(sep);
        }
    }
}

fn tidy(raw: &str) -> String {
    let spaced = INLINE_WHITESPACE.replace_all(raw, " ");
    let spaced = EXCESS_NEWLINES.replace_all(&spaced, "\n\n");

    let mut lines: Vec<&str> = Vec::new();
    let mut previous_blank = false;
    for line in spaced.lines().map(str::trim) {
        if line.is_empty() {
            if !previous_blank {
                lines.push("");
            }
            previous_blank = true;
        } else {
            lines.push(line);
            previous_blank = false;
        }
    }
    lines.join("\n").trim().to_string()
}
