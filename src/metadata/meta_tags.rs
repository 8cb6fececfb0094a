//! `<meta>` tag collection and date normalisation.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use dom_query::{Document, Selection};

use crate::dom;

/// `<meta>` values keyed by lowercased `name`, `property` or `itemprop`.
///
/// The first non-empty occurrence of a key wins.
#[derive(Debug, Clone, Default)]
pub struct MetaTags {
    values: HashMap<String, String>,
}

impl MetaTags {
    /// Collect every `<meta>` with both a key and a non-empty `content`.
    #[must_use]
    pub fn collect(doc: &Document) -> Self {
        let mut values = HashMap::new();
        for node in doc.select("meta").nodes() {
            let meta = Selection::from(*node);
            let key = dom::get_attribute(&meta, "name")
                .or_else(|| dom::get_attribute(&meta, "property"))
                .or_else(|| dom::get_attribute(&meta, "itemprop"))
                .unwrap_or_default()
                .trim()
                .to_lowercase();
            let content = dom::get_attribute(&meta, "content").unwrap_or_default();
            let content = content.trim();
            if key.is_empty() || content.is_empty() {
                continue;
            }
            values.entry(key).or_insert_with(|| content.to_string());
        }
        Self { values }
    }

    /// Value for `key` (lowercase).
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    /// First present value among `keys`.
    #[must_use]
    pub fn first_of(&self, keys: &[&str]) -> Option<String> {
        keys.iter().find_map(|key| self.get(key))
    }
}

/// Parse a date in one of the formats publishers commonly emit.
#[must_use]
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%z") {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt.and_utc());
        }
    }
    for fmt in ["%Y-%m-%d", "%Y/%m/%d", "%B %d, %Y", "%b %d, %Y", "%d %B %Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(raw, fmt) {
            return Some(date.and_hms_opt(0, 0, 0)?.and_utc());
        }
    }
    None
}

/// RFC 3339 rendering of a parseable date, otherwise the trimmed input.
#[must_use]
pub fn normalize_date(raw: &str) -> String {
    parse_date(raw).map_or_else(
        || raw.trim().to_string(),
        |dt| dt.to_rfc3339_opts(SecondsFormat::Secs, true),
    )
}
