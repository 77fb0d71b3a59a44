use crate::url::has_http_scheme;
use crate::UrlError;
use url::Url;

/// Resolves a possibly relative link against the page it was found on
///
/// Links that already carry an `http://` or `https://` scheme are returned
/// unchanged; everything else goes through standard reference resolution
/// against `base`. The base must itself be an absolute URL.
///
/// # Arguments
///
/// * `base` - Absolute URL of the page containing the link
/// * `href` - The link as written in the page
///
/// # Returns
///
/// * `Ok(String)` - The absolute URL
/// * `Err(UrlError)` - The base or the link could not be parsed
///
/// # Examples
///
/// ```
/// use sitecrawl::url::resolve_url;
///
/// let url = resolve_url("https://example.com/docs/intro/", "../setup").unwrap();
/// assert_eq!(url, "https://example.com/docs/setup");
/// ```
pub fn resolve_url(base: &str, href: &str) -> Result<String, UrlError> {
    let base = Url::parse(base).map_err(|e| UrlError::Parse(format!("{}: {}", base, e)))?;

    if has_http_scheme(href) {
        return Ok(href.to_string());
    }

    let resolved = base
        .join(href)
        .map_err(|e| UrlError::Parse(format!("{}: {}", href, e)))?;

    Ok(resolved.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://example.com/a/b/page";

    #[test]
    fn test_absolute_returned_unchanged() {
        let href = "HTTPS://Other.com/x?y=1#z";
        assert_eq!(resolve_url(BASE, href).unwrap(), href);
    }

    #[test]
    fn test_root_relative() {
        assert_eq!(resolve_url(BASE, "/other").unwrap(), "https://example.com/other");
    }

    #[test]
    fn test_path_relative() {
        assert_eq!(resolve_url(BASE, "sibling").unwrap(), "https://example.com/a/b/sibling");
        assert_eq!(resolve_url(BASE, "../up").unwrap(), "https://example.com/a/up");
        assert_eq!(resolve_url(BASE, "./here").unwrap(), "https://example.com/a/b/here");
    }

    #[test]
    fn test_query_and_fragment_relative() {
        assert_eq!(resolve_url(BASE, "?q=1").unwrap(), "https://example.com/a/b/page?q=1");
        assert_eq!(resolve_url(BASE, "#top").unwrap(), "https://example.com/a/b/page#top");
    }

    #[test]
    fn test_scheme_relative() {
        assert_eq!(resolve_url(BASE, "//cdn.example.com/x").unwrap(), "https://cdn.example.com/x");
    }

    #[test]
    fn test_other_schemes_resolve_to_themselves() {
        assert_eq!(
            resolve_url(BASE, "mailto:someone@example.com").unwrap(),
            "mailto:someone@example.com"
        );
    }

    #[test]
    fn test_invalid_base() {
        assert!(matches!(resolve_url("not a url", "/x"), Err(UrlError::Parse(_))));
    }

    #[test]
    fn test_absolute_href_is_not_parsed() {
        assert_eq!(resolve_url(BASE, "http://[::1").unwrap(), "http://[::1");
    }

    #[test]
    fn test_invalid_href() {
        assert!(matches!(resolve_url(BASE, "//exa mple.com/"), Err(UrlError::Parse(_))));
    }
}
