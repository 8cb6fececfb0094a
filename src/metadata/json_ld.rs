//! Schema.org JSON-LD parsing.

use dom_query::{Document, Selection};
use serde_json::{Map, Value};

use crate::dom;

/// Schema types treated as articles.
const ARTICLE_TYPES: &[&str] = &["article", "newsarticle", "blogposting", "reportagenewsarticle"];

/// Fields recovered from the page's JSON-LD blocks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkedData {
    /// `headline` (or `name`) of the first article object.
    pub headline: Option<String>,
    /// `description` of the first article object.
    pub description: Option<String>,
    /// First author or standalone `Person` name.
    pub author: Option<String>,
    /// `datePublished` of the first article object.
    pub date_published: Option<String>,
    /// Name of the first `Organization`/`WebSite`/`publisher`.
    pub site_name: Option<String>,
    /// Whether any object's `@type` names an article.
    pub has_article: bool,
}

/// Parse all `application/ld+json` scripts; malformed blocks are skipped.
#[must_use]
pub fn extract_json_ld(doc: &Document) -> LinkedData {
    let mut data = LinkedData::default();
    for node in doc.select(r#"script[type="application/ld+json"]"#).nodes() {
        let raw = dom::text_content(&Selection::from(*node));
        let raw = raw.trim();
        if raw.is_empty() {
            continue;
        }
        let Ok(value) = serde_json::from_str::<Value>(raw) else {
            continue;
        };
        visit(&value, &mut data);
    }
    data
}

fn visit(value: &Value, data: &mut LinkedData) {
    match value {
        Value::Array(items) => items.iter().for_each(|item| visit(item, data)),
        Value::Object(map) => {
            let types = schema_types(map);
            if types.iter().any(|t| ARTICLE_TYPES.contains(&t.as_str())) {
                data.has_article = true;
                absorb_article(map, data);
            } else if types.iter().any(|t| t == "person") {
                if data.author.is_none() {
                    data.author = person_name(value);
                }
            } else if types
                .iter()
                .any(|t| matches!(t.as_str(), "organization" | "newsmediaorganization" | "website"))
                && data.site_name.is_none()
            {
                data.site_name = string_field(map, "name");
            }
            // @graph and nested objects
            for (key, nested) in map {
                if key != "author" && key != "publisher" {
                    visit(nested, data);
                }
            }
        }
        _ => {}
    }
}

fn absorb_article(map: &Map<String, Value>, data: &mut LinkedData) {
    if data.headline.is_none() {
        data.headline = string_field(map, "headline").or_else(|| string_field(map, "name"));
    }
    if data.description.is_none() {
        data.description = string_field(map, "description");
    }
    if data.date_published.is_none() {
        data.date_published = string_field(map, "datePublished");
    }
    if data.author.is_none() {
        data.author = map.get("author").and_then(person_name);
    }
    if data.site_name.is_none() {
        data.site_name = map
            .get("publisher")
            .and_then(Value::as_object)
            .and_then(|publisher| string_field(publisher, "name"));
    }
}

fn schema_types(map: &Map<String, Value>) -> Vec<String> {
    match map.get("@type") {
        Some(Value::String(t)) => vec![t.to_lowercase()],
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_lowercase)
            .collect(),
        _ => Vec::new(),
    }
}

fn string_field(map: &Map<String, Value>, key: &str) -> Option<String> {
    let text = match map.get(key)? {
        Value::String(s) => s.trim(),
        Value::Array(items) => items.first()?.as_str()?.trim(),
        _ => return None,
    };
    (!text.is_empty()).then(|| text.to_string())
}

/// Name of a person given as a string, an object or a list of either.
fn person_name(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        Value::Array(items) => items.iter().find_map(person_name),
        Value::Object(map) => string_field(map, "name").or_else(|| {
            let given = string_field(map, "givenName").unwrap_or_default();
            let family = string_field(map, "familyName").unwrap_or_default();
            let full = format!("{given} {family}").trim().to_string();
            (!full.is_empty()).then_some(full)
        }),
        _ => None,
    }
}
