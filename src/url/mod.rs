//! URL handling module for Sumi-Mirror
//!
//! This module provides site-boundary checks, page keys, include/exclude
//! filtering and the mapping of remote URLs onto the local mirror layout.

mod filter;
mod path;

pub use filter::FilterSet;
pub use path::{PathMapper, PAGE_DIR_INDEX};

use url::Url;

/// Returns the `host[:port]` key used to tell internal from external URLs
///
/// Default ports are omitted by the `url` crate, so `http://a.com` and
/// `http://a.com:80` share a key.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use sumi_mirror::url::host_key;
///
/// let url = Url::parse("https://EXAMPLE.com/path").unwrap();
/// assert_eq!(host_key(&url), Some("example.com".to_string()));
///
/// let url = Url::parse("http://127.0.0.1:8080/").unwrap();
/// assert_eq!(host_key(&url), Some("127.0.0.1:8080".to_string()));
/// ```
pub fn host_key(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_lowercase();
    Some(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host,
    })
}

/// Dedup key for pages and internal assets: the URL path, `/` when empty
///
/// Query and fragment are ignored, so `#section` links never produce a new key.
pub fn page_key(url: &Url) -> String {
    match url.path() {
        "" => "/".to_string(),
        path => path.to_string(),
    }
}

/// Returns true for `http` and `https` URLs
pub fn is_web_scheme(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https")
}

/// Returns true for references that are never fetched or rewritten
pub fn is_inline_reference(raw: &str) -> bool {
    let raw = raw.trim_start();
    ["data:", "mailto:"]
        .iter()
        .any(|scheme| raw.get(..scheme.len()).is_some_and(|p| p.eq_ignore_ascii_case(scheme)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_host_key_with_port() {
        assert_eq!(
            host_key(&url("http://localhost:3000/a")),
            Some("localhost:3000".to_string())
        );
        assert_eq!(host_key(&url("http://example.com:80/")), Some("example.com".to_string()));
    }

    #[test]
    fn test_host_key_without_host() {
        assert_eq!(host_key(&url("data:text/plain,hi")), None);
        assert_eq!(host_key(&url("mailto:someone@example.com")), None);
    }

    #[test]
    fn test_page_key_ignores_fragment_and_query() {
        assert_eq!(page_key(&url("https://example.com")), "/");
        assert_eq!(page_key(&url("https://example.com/a.html#top")), "/a.html");
        assert_eq!(page_key(&url("https://example.com/a.html?x=1")), "/a.html");
    }

    #[test]
    fn test_is_web_scheme() {
        assert!(is_web_scheme(&url("http://example.com/")));
        assert!(is_web_scheme(&url("https://example.com/")));
        assert!(!is_web_scheme(&url("ftp://example.com/")));
        assert!(!is_web_scheme(&url("javascript:void(0)")));
    }

    #[test]
    fn test_is_inline_reference() {
        assert!(is_inline_reference("data:image/png;base64,AAAA"));
        assert!(is_inline_reference("mailto:someone@example.com"));
        assert!(is_inline_reference("  MAILTO:someone@example.com"));
        assert!(!is_inline_reference("/img/logo.png"));
        assert!(!is_inline_reference("dat"));
    }
}
