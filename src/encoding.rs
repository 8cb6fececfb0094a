//! Charset sniffing for served markup handed over as bytes.
//!
//! Order: byte-order mark, `<meta charset>`, `<meta http-equiv>` content
//! type, then UTF-8.

use std::sync::LazyLock;

use encoding_rs::{Encoding, UTF_8};
use regex::Regex;

/// Bytes inspected for a charset declaration.
pub const SNIFF_WINDOW: usize = 1024;

#[allow(clippy::expect_used)]
static META_CHARSET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta[^>]+charset\s*=\s*["']?([^"'\s/>;]+)"#).expect("valid regex")
});

#[allow(clippy::expect_used)]
static HTTP_EQUIV_CHARSET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta[^>]+http-equiv\s*=\s*["']?content-type["']?[^>]+content\s*=\s*["']?[^"'>]*;\s*charset\s*=\s*([^"'\s>]+)"#)
        .expect("valid regex")
});

fn declared(head: &str) -> Option<&'static Encoding> {
    [&*META_CHARSET, &*HTTP_EQUIV_CHARSET]
        .into_iter()
        .filter_map(|re| re.captures(head)?.get(1))
        .find_map(|label| Encoding::for_label(label.as_str().as_bytes()))
}

/// Pick the encoding of `bytes`. The returned length is the BOM to skip.
#[must_use]
pub fn sniff_encoding(bytes: &[u8]) -> (&'static Encoding, usize) {
    if let Some(found) = Encoding::for_bom(bytes) {
        return found;
    }
    let head = String::from_utf8_lossy(&bytes[..bytes.len().min(SNIFF_WINDOW)]);
    (declared(&head).unwrap_or(UTF_8), 0)
}

/// Decode served markup to UTF-8, replacing malformed sequences.
#[must_use]
pub fn decode_html(bytes: &[u8]) -> String {
    let (encoding, bom) = sniff_encoding(bytes);
    let body = &bytes[bom..];
    if encoding == UTF_8 {
        return String::from_utf8_lossy(body).into_owned();
    }
    let (decoded, malformed) = encoding.decode_without_bom_handling(body);
    if malformed {
        tracing::debug!(target: "harvest.extract", encoding = encoding.name(), "malformed input replaced");
    }
    decoded.into_owned()
}
