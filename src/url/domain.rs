use url::Url;

/// Extracts the crawl domain from a URL
///
/// The domain is the lowercase host followed by `:port` when the URL uses a
/// non-default port. Two URLs belong to the same crawl only if these strings
/// are identical, so `www.example.com` and `example.com` are different
/// domains, as are `localhost:8080` and `localhost:9090`.
///
/// # Arguments
///
/// * `url` - The URL to extract the domain from
///
/// # Returns
///
/// * `Some(String)` - The domain
/// * `None` - If the URL has no host
///
/// # Examples
///
/// ```
/// use url::Url;
/// use sitecrawl::url::extract_domain;
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.com".to_string()));
///
/// let url = Url::parse("http://127.0.0.1:8080/").unwrap();
/// assert_eq!(extract_domain(&url), Some("127.0.0.1:8080".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    let host = url.host_str().filter(|h| !h.is_empty())?.to_lowercase();
    match url.port() {
        Some(port) => Some(format!("{}:{}", host, port)),
        None => Some(host),
    }
}

/// Parses a URL string and extracts its crawl domain
pub fn domain_of(url_str: &str) -> Option<String> {
    Url::parse(url_str).ok().as_ref().and_then(extract_domain)
}

/// Returns true if the URL parses and its domain exactly equals `domain`
pub fn is_same_domain(url_str: &str, domain: &str) -> bool {
    domain_of(url_str).map_or(false, |d| d == domain)
}
