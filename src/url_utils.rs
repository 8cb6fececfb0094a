//! URL helpers for host comparison and link resolution.

use url::Url;

/// Hosts that publish their own content and are never reported as the
/// original source of an aggregated page.
pub const PLATFORM_HOSTS: &[&str] = &["microsoft.com", "google.com", "apple.com"];

/// Parse a string as an absolute `http(s)` URL with a host.
#[must_use]
pub fn parse_url(s: &str) -> Option<Url> {
    let s = s.trim();
    if !s.starts_with("http://") && !s.starts_with("https://") {
        return None;
    }
    Url::parse(s).ok().filter(|url| url.host().is_some())
}

/// Resolve `href` against `base`.
///
/// Absolute `http(s)` links are returned as-is; `javascript:`, `mailto:` and
/// fragment-only links, or relative links without a usable base, yield `None`.
#[must_use]
pub fn resolve(href: &str, base: Option<&str>) -> Option<Url> {
    let href = href.trim();
    if href.is_empty()
        || href.starts_with('#')
        || href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }
    if let Some(url) = parse_url(href) {
        return Some(url);
    }
    let base = parse_url(base?)?;
    base.join(href)
        .ok()
        .filter(|url| matches!(url.scheme(), "http" | "https"))
}

/// Lowercase host without a leading `www.`.
#[must_use]
pub fn bare_host(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_ascii_lowercase();
    Some(host.strip_prefix("www.").map(str::to_string).unwrap_or(host))
}

/// Hostname of a URL string, `www.` stripped.
#[must_use]
pub fn extract_hostname(url_str: &str) -> Option<String> {
    parse_url(url_str).as_ref().and_then(bare_host)
}

/// Whether two URLs point at different hosts, ignoring a `www.` prefix.
///
/// Unparseable inputs never count as different.
#[must_use]
pub fn is_different_host(a: &Url, b: &Url) -> bool {
    match (bare_host(a), bare_host(b)) {
        (Some(a), Some(b)) => a != b,
        _ => false,
    }
}

/// Whether the URL belongs to one of the [`PLATFORM_HOSTS`] or a subdomain.
#[must_use]
pub fn is_platform_host(url: &Url) -> bool {
    bare_host(url).is_some_and(|host| {
        PLATFORM_HOSTS
            .iter()
            .any(|p| host == *p || host.ends_with(&format!(".{p}")))
    })
}

/// Whether the string is a blank page placeholder rather than a real page.
#[must_use]
pub fn is_blank_page(url: &str) -> bool {
    let url = url.trim();
    url.is_empty() || url == "about:blank" || url == "about:srcdoc"
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        parse_url(s).unwrap_or_else(|| panic!("invalid test url {s}"))
    }

    #[test]
    fn test_parse_url_requires_http() {
        assert!(parse_url("https://example.com/a").is_some());
        assert!(parse_url("ftp://example.com").is_none());
        assert!(parse_url("/relative").is_none());
        assert!(parse_url("").is_none());
    }

    #[test]
    fn test_resolve_relative() {
        let resolved = resolve("/story/1", Some("https://agg.example/feed/x"));
        assert_eq!(resolved.map(|u| u.to_string()), Some("https://agg.example/story/1".to_string()));
        assert!(resolve("/story/1", None).is_none());
        assert!(resolve("javascript:void(0)", Some("https://a.example")).is_none());
        assert!(resolve("#top", Some("https://a.example")).is_none());
    }

    #[test]
    fn test_host_comparison_ignores_www() {
        assert!(!is_different_host(&url("https://www.news.example/a"), &url("https://news.example/b")));
        assert!(is_different_host(&url("https://news.example/a"), &url("https://other.example/a")));
    }

    #[test]
    fn test_platform_hosts() {
        assert!(is_platform_host(&url("https://www.microsoft.com/en-us")));
        assert!(is_platform_host(&url("https://news.google.com/x")));
        assert!(!is_platform_host(&url("https://notgoogle.com/x")));
    }

    #[test]
    fn test_blank_pages() {
        assert!(is_blank_page(""));
        assert!(is_blank_page("about:blank"));
        assert!(is_blank_page("about:srcdoc"));
        assert!(!is_blank_page("https://example.com"));
    }

    #[test]
    fn test_extract_hostname() {
        assert_eq!(extract_hostname("https://www.Example.com/x"), Some("example.com".to_string()));
        assert_eq!(extract_hostname("nope"), None);
    }
}
