//! URL handling module for Sitecrawl
//!
//! This module provides the canonicalization rules the crawl engine relies on
//! for deduplication and domain scoping: validation, normalization, relative
//! reference resolution and domain extraction. Every function here is pure
//! and safe to call from any number of workers at once.

mod domain;
mod normalize;
mod resolve;
mod validate;

// Re-export main functions
pub use domain::{domain_of, extract_domain, is_same_domain};
pub use normalize::normalize_url;
pub use resolve::resolve_url;
pub use validate::is_valid_url;

/// Returns true if the string starts with an `http://` or `https://` scheme
/// (ASCII case-insensitive)
pub(crate) fn has_http_scheme(url_str: &str) -> bool {
    starts_with_ignore_case(url_str, "http://") || starts_with_ignore_case(url_str, "https://")
}

fn starts_with_ignore_case(value: &str, prefix: &str) -> bool {
    value
        .get(..prefix.len())
        .map_or(false, |head| head.eq_ignore_ascii_case(prefix))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_http_scheme() {
        assert!(has_http_scheme("http://example.com"));
        assert!(has_http_scheme("https://example.com"));
        assert!(has_http_scheme("HTTPS://example.com"));
        assert!(!has_http_scheme("ftp://example.com"));
        assert!(!has_http_scheme("example.com"));
        assert!(!has_http_scheme("http:/"));
        assert!(!has_http_scheme(""));
    }

    #[test]
    fn test_pipeline_resolve_then_normalize() {
        let resolved = resolve_url("https://example.com/docs/", "../about?utm_source=x#top").unwrap();
        let canonical = normalize_url(&resolved).unwrap();
        assert_eq!(canonical, "https://example.com/about/");
        assert!(is_valid_url(&canonical));
    }
}
