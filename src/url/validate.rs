use url::Url;

/// File extensions that never lead to a crawlable page
const EXCLUDED_EXTENSIONS: &[&str] = &[
    ".pdf", ".jpg", ".jpeg", ".png", ".gif", ".svg", ".css", ".js", ".zip", ".tar", ".gz", ".rar",
    ".exe", ".mp3", ".mp4", ".avi", ".mov", ".mkv", ".doc", ".docx", ".xls", ".xlsx", ".ppt",
    ".pptx",
];

/// Checks whether a URL is acceptable as a crawl target
///
/// A URL is rejected when it is empty, cannot be parsed, uses a scheme other
/// than http or https, or its path ends with one of the excluded file
/// extensions (images, archives, documents, media, stylesheets, scripts).
/// The extension check ignores case.
///
/// # Examples
///
/// ```
/// use sitecrawl::url::is_valid_url;
///
/// assert!(is_valid_url("https://example.com/blog/"));
/// assert!(!is_valid_url("https://example.com/logo.PNG"));
/// assert!(!is_valid_url("mailto:team@example.com"));
/// ```
pub fn is_valid_url(url_str: &str) -> bool {
    if url_str.is_empty() {
        return false;
    }

    let url = match Url::parse(url_str) {
        Ok(url) => url,
        Err(_) => return false,
    };

    if url.scheme() != "http" && url.scheme() != "https" {
        return false;
    }

    let path = url.path().to_ascii_lowercase();
    !EXCLUDED_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_pages() {
        assert!(is_valid_url("https://example.com/"));
        assert!(is_valid_url("http://example.com/about/"));
        assert!(is_valid_url("https://example.com/index.html"));
        assert!(is_valid_url("https://example.com/page.php?id=3"));
    }

    #[test]
    fn test_rejects_empty() {
        assert!(!is_valid_url(""));
    }

    #[test]
    fn test_rejects_non_http_schemes() {
        assert!(!is_valid_url("ftp://example.com/file"));
        assert!(!is_valid_url("javascript:void(0)"));
        assert!(!is_valid_url("tel:+123456"));
    }

    #[test]
    fn test_rejects_relative_and_garbage() {
        assert!(!is_valid_url("/relative/path"));
        assert!(!is_valid_url("not a url"));
    }

    #[test]
    fn test_rejects_excluded_extensions() {
        for ext in EXCLUDED_EXTENSIONS {
            let url = format!("https://example.com/files/asset{}", ext);
            assert!(!is_valid_url(&url), "{} should be rejected", url);
        }
    }

    #[test]
    fn test_extension_check_ignores_case() {
        assert!(!is_valid_url("https://example.com/Report.PDF"));
        assert!(!is_valid_url("https://example.com/photo.JpEg"));
    }

    #[test]
    fn test_extension_only_checked_on_path() {
        assert!(is_valid_url("https://example.com/view?file=report.pdf"));
        assert!(is_valid_url("https://cdn.js.example.com/"));
    }
}
