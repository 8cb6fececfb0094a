//! Markdown rendering.
//!
//! Block elements are emitted wrapped in blank lines and the final pass
//! collapses the excess, so each renderer only has to care about its own
//! element.

use dom_query::{NodeRef, Selection};

use crate::dom;
use crate::patterns::{CODE_LANGUAGE_CLASS, EXCESS_NEWLINES, SPACES_TABS};

use super::text::SKIPPED_TAGS;

/// Render an HTML fragment as Markdown.
///
/// ```
/// use rs_harvest::format::markdown::html_to_markdown;
///
/// let md = html_to_markdown("<h2>Title</h2><p>Some <strong>bold</strong> text</p>");
/// assert_eq!(md, "## Title\n\nSome **bold** text");
/// ```
#[must_use]
pub fn html_to_markdown(html: &str) -> String {
    let doc = dom::parse(html);
    let rendered: String = dom::body(&doc)
        .nodes()
        .iter()
        .map(|node| children(*node, 0))
        .collect();
    tidy(&rendered)
}

fn tidy(rendered: &str) -> String {
    let collapsed = EXCESS_NEWLINES.replace_all(rendered, "\n\n");
    collapsed
        .lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

fn attr(node: NodeRef<'_>, name: &str) -> Option<String> {
    dom::get_attribute(&Selection::from(node), name)
}

fn inside_pre(node: NodeRef<'_>) -> bool {
    dom::has_ancestor_tag(&node, &["pre"])
}

fn loose_text(node: NodeRef<'_>) -> String {
    let text = node.text();
    if inside_pre(node) {
        text.to_string()
    } else {
        SPACES_TABS.replace_all(&text, " ").into_owned()
    }
}

fn children(node: NodeRef<'_>, depth: usize) -> String {
    node.children()
        .into_iter()
        .map(|child| block(child, depth))
        .collect()
}

fn block(node: NodeRef<'_>, depth: usize) -> String {
    if node.is_text() {
        return loose_text(node);
    }
    let Some(tag) = dom::node_tag(&node) else {
        return String::new();
    };
    match tag.as_str() {
        t if SKIPPED_TAGS.contains(&t) => String::new(),
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
            let level = tag[1..].parse::<usize>().unwrap_or(1);
            let text = inline(node);
            let text = text.trim();
            if text.is_empty() {
                String::new()
            } else {
                format!("\n\n{} {text}\n\n", "#".repeat(level))
            }
        }
        "p" => {
            let text = inline(node);
            let text = text.trim();
            if text.is_empty() {
                String::new()
            } else {
                format!("\n\n{text}\n\n")
            }
        }
        "br" => "\n".to_string(),
        "hr" => "\n\n---\n\n".to_string(),
        "a" | "b" | "strong" | "i" | "em" | "img" => inline_element(node, &tag),
        "code" if !inside_pre(node) => {
            let text = node.text();
            let text = text.trim();
            if text.is_empty() {
                String::new()
            } else {
                format!("`{text}`")
            }
        }
        "pre" => code_block(node),
        "blockquote" => blockquote(node, depth),
        "ul" => list(node, false, depth),
        "ol" => list(node, true, depth),
        "li" => {
            let text = inline(node);
            let text = text.trim();
            if text.is_empty() {
                String::new()
            } else {
                format!("\n- {text}\n")
            }
        }
        "table" => table(node),
        "figure" => figure(node).unwrap_or_else(|| children(node, depth)),
        _ => children(node, depth),
    }
}

/// Children of `node` rendered as inline Markdown.
fn inline(node: NodeRef<'_>) -> String {
    let mut out = String::new();
    for child in node.children() {
        if child.is_text() {
            out.push_str(&loose_text(child));
        } else if let Some(tag) = dom::node_tag(&child) {
            if !SKIPPED_TAGS.contains(&tag.as_str()) {
                out.push_str(&inline_element(child, &tag));
            }
        }
    }
    out
}

fn inline_element(node: NodeRef<'_>, tag: &str) -> String {
    match tag {
        "a" => {
            let text = inline(node);
            let text = text.trim();
            match attr(node, "href") {
                Some(href) if !text.is_empty() && !href.is_empty() && !href.starts_with("javascript:") => {
                    format!("[{text}]({href})")
                }
                _ => text.to_string(),
            }
        }
        "b" | "strong" => wrap_nonempty(&inline(node), "**"),
        "i" | "em" => wrap_nonempty(&inline(node), "*"),
        "code" => wrap_nonempty(&node.text(), "`"),
        "br" => "\n".to_string(),
        "img" => image(node),
        _ => inline(node),
    }
}

fn wrap_nonempty(text: &str, marker: &str) -> String {
    let text = text.trim();
    if text.is_empty() {
        String::new()
    } else {
        format!("{marker}{text}{marker}")
    }
}

fn image(node: NodeRef<'_>) -> String {
    let alt = attr(node, "alt").unwrap_or_default();
    let alt = alt.trim();
    let src = attr(node, "src").unwrap_or_default();
    match (alt.is_empty(), src.is_empty()) {
        (false, false) => format!("![{alt}]({src})"),
        (false, true) => format!("[Image: {alt}]"),
        _ => String::new(),
    }
}

fn code_block(node: NodeRef<'_>) -> String {
    let pre = Selection::from(node);
    let code = pre.select("code");
    let (text, classes) = if code.length() > 0 {
        let first = code.first();
        (first.text().to_string(), dom::get_attribute(&first, "class").unwrap_or_default())
    } else {
        (pre.text().to_string(), String::new())
    };
    let lang = CODE_LANGUAGE_CLASS
        .captures(&classes)
        .and_then(|caps| caps.get(1))
        .map_or("", |m| m.as_str());
    format!("\n\n```{lang}\n{}\n```\n\n", text.trim_end())
}

fn blockquote(node: NodeRef<'_>, depth: usize) -> String {
    let inner = children(node, depth);
    let inner = EXCESS_NEWLINES.replace_all(inner.trim(), "\n\n");
    let quoted = inner
        .lines()
        .map(|line| {
            if line.trim().is_empty() {
                ">".to_string()
            } else {
                format!("> {line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n");
    format!("\n\n{quoted}\n\n")
}

fn list(node: NodeRef<'_>, ordered: bool, depth: usize) -> String {
    let indent = "  ".repeat(depth);
    let mut items: Vec<String> = Vec::new();
    let entries = node
        .children()
        .into_iter()
        .filter(|child| dom::node_tag(child).as_deref() == Some("li"));

    for (idx, li) in entries.enumerate() {
        let mut parts: Vec<String> = Vec::new();
        let mut nested: Vec<(NodeRef<'_>, bool)> = Vec::new();
        for child in li.children() {
            match dom::node_tag(&child).as_deref() {
                Some("ul") => nested.push((child, false)),
                Some("ol") => nested.push((child, true)),
                Some(tag) if !SKIPPED_TAGS.contains(&tag) => {
                    parts.push(inline_element(child, tag).trim().to_string());
                }
                Some(_) => {}
                None if child.is_text() => parts.push(child.text().trim().to_string()),
                None => {}
            }
        }
        let text = parts
            .into_iter()
            .filter(|p| !p.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if ordered {
            items.push(format!("{indent}{}. {text}", idx + 1));
        } else {
            items.push(format!("{indent}- {text}"));
        }
        for (sub, sub_ordered) in nested {
            items.push(list(sub, sub_ordered, depth + 1).trim_matches('\n').to_string());
        }
    }
    format!("\n\n{}\n\n", items.join("\n"))
}

/// Concatenated, individually trimmed text pieces under `node`.
fn stripped_text(node: NodeRef<'_>) -> String {
    node.descendants()
        .into_iter()
        .filter(NodeRef::is_text)
        .map(|text| text.text().trim().to_string())
        .collect()
}

fn cell_text(cell: NodeRef<'_>) -> String {
    stripped_text(cell).replace('|', "\\|")
}

fn table(node: NodeRef<'_>) -> String {
    let mut rows: Vec<Vec<String>> = Selection::from(node)
        .select("tr")
        .nodes()
        .iter()
        .map(|tr| {
            Selection::from(*tr)
                .select("th, td")
                .nodes()
                .iter()
                .map(|cell| cell_text(*cell))
                .collect::<Vec<_>>()
        })
        .filter(|cells| !cells.is_empty())
        .collect();

    let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
    if columns == 0 {
        return String::new();
    }
    for row in &mut rows {
        row.resize(columns, String::new());
    }

    let render = |cells: &[String]| format!("| {} |", cells.join(" | "));
    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(render(&rows[0]));
    lines.push(render(&vec!["---".to_string(); columns]));
    lines.extend(rows[1..].iter().map(|row| render(row)));
    format!("\n\n{}\n\n", lines.join("\n"))
}

fn figure(node: NodeRef<'_>) -> Option<String> {
    let sel = Selection::from(node);
    let mut parts = Vec::new();
    let img = sel.select("img");
    if img.length() > 0 {
        let img = img.first();
        let src = dom::get_attribute(&img, "src").unwrap_or_default();
        if !src.is_empty() {
            let alt = dom::get_attribute(&img, "alt").unwrap_or_default();
            parts.push(format!("![{}]({src})", alt.trim()));
        }
    }
    if let Some(caption) = sel.select("figcaption").nodes().first() {
        parts.push(format!("*{}*", stripped_text(*caption)));
    }
    (!parts.is_empty()).then(|| format!("\n\n{}\n\n", parts.join("\n")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_table() {
        let md = html_to_markdown("<table><tr><th>A</th><th>B</th></tr><tr><td>1</td><td>2</td></tr></table>");
        assert_eq!(md, "| A | B |\n| --- | --- |\n| 1 | 2 |");
    }

    #[test]
    fn test_table_uneven_rows_and_pipes() {
        let md = html_to_markdown("<table><tr><td>a|b</td></tr><tr><td>1</td><td>2</td></tr></table>");
        assert_eq!(md, "| a\\|b |  |\n| --- | --- |\n| 1 | 2 |");
    }

    #[test]
    fn test_headings_and_inline() {
        let md = html_to_markdown(
            r#"<h1>Top</h1><p>Go <a href="https://x.example">here</a>, <em>now</em>. <a href="javascript:void(0)">no</a> <code>x()</code></p>"#,
        );
        assert_eq!(md, "# Top\n\nGo [here](https://x.example), *now*. no `x()`");
    }

    #[test]
    fn test_code_block_language() {
        let md = html_to_markdown("<pre><code class=\"language-rust\">fn main() {}\n</code></pre>");
        assert_eq!(md, "```rust\nfn main() {}\n```");
    }

    #[test]
    fn test_nested_lists() {
        let md = html_to_markdown("<ul><li>one<ul><li>inner</li></ul></li><li>two</li></ul><ol><li>first</li></ol>");
        assert_eq!(md, "- one\n  - inner\n- two\n\n1. first");
    }

    #[test]
    fn test_blockquote() {
        let md = html_to_markdown("<blockquote><p>Line one</p><p>Line two</p></blockquote>");
        assert_eq!(md, "> Line one\n>\n> Line two");
    }

    #[test]
    fn test_images_and_figures() {
        assert_eq!(html_to_markdown(r#"<p><img alt="Cat" src="/c.png"></p>"#), "![Cat](/c.png)");
        assert_eq!(html_to_markdown(r#"<p><img alt="Cat"></p>"#), "[Image: Cat]");
        assert_eq!(html_to_markdown(r#"<p><img src="/c.png"></p>"#), "");
        let md = html_to_markdown(r#"<figure><img src="/m.jpg" alt="Map"><figcaption>The route</figcaption></figure>"#);
        assert_eq!(md, "![Map](/m.jpg)\n*The route*");
    }

    #[test]
    fn test_breaks_and_rules() {
        assert_eq!(html_to_markdown("<p>a<br>b</p><hr><p>c</p>"), "a\nb\n\n---\n\nc");
    }
}
