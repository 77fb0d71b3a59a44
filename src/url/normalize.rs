use crate::url::has_http_scheme;
use crate::UrlError;
use url::Url;

/// Tracking query parameters removed during normalization
const TRACKING_PARAMS: &[&str] = &[
    "utm_source",
    "utm_medium",
    "utm_campaign",
    "utm_term",
    "utm_content",
];

/// Normalizes a URL into its canonical form
///
/// The canonical form is the crawl's deduplication key, so this function is
/// idempotent: normalizing an already canonical URL returns it unchanged.
///
/// # Normalization Steps
///
/// 1. Add an `https://` scheme when none is present
/// 2. Parse the URL; reject if malformed or hostless
/// 3. Append a trailing slash to paths without a `.` (directory-like paths)
/// 4. Remove tracking query parameters and sort the remaining ones by key
/// 5. Remove empty query string (trailing ?)
/// 6. Remove fragment (everything after #)
///
/// Default ports (80 for http, 443 for https) and host case are handled by
/// the parser itself.
///
/// # Arguments
///
/// * `url_str` - The URL string to normalize
///
/// # Returns
///
/// * `Ok(String)` - Canonical URL
/// * `Err(UrlError)` - Failed to parse or normalize the URL
///
/// # Examples
///
/// ```
/// use sitecrawl::url::normalize_url;
///
/// let url = normalize_url("example.com:443/docs?utm_source=feed#intro").unwrap();
/// assert_eq!(url, "https://example.com/docs/");
/// ```
pub fn normalize_url(url_str: &str) -> Result<String, UrlError> {
    let trimmed = url_str.trim();
    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    // Step 1: Default scheme
    let with_scheme = if has_http_scheme(trimmed) {
        trimmed.to_string()
    } else if let Some(scheme) = explicit_scheme(trimmed) {
        return Err(UrlError::InvalidScheme(scheme.to_string()));
    } else {
        format!("https://{}", trimmed)
    };

    // Step 2: Parse the URL
    let mut url = Url::parse(&with_scheme).map_err(|e| UrlError::Parse(format!("{}: {}", trimmed, e)))?;
    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingDomain);
    }

    // Step 3: Directory-like paths end with a slash
    let path = url.path();
    if !path.contains('.') && !path.ends_with('/') {
        let with_slash = format!("{}/", path);
        url.set_path(&with_slash);
    }

    // Step 4 & 5: Filter and sort query parameters
    if url.query().is_some() {
        let params = filter_and_sort_query_params(&url);

        if params.is_empty() {
            url.set_query(None);
        } else {
            url.query_pairs_mut().clear().extend_pairs(params.iter());
        }
    }

    // Step 6: Remove fragment
    url.set_fragment(None);

    Ok(url.into())
}

/// Returns the scheme of a `scheme://...` string, if it has one
fn explicit_scheme(url_str: &str) -> Option<&str> {
    let (scheme, _) = url_str.split_once("://")?;
    let is_scheme = !scheme.is_empty()
        && scheme
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    is_scheme.then_some(scheme)
}

/// Filters out tracking parameters and sorts remaining query parameters by key
///
/// The sort is stable, so repeated keys keep their original relative order.
fn filter_and_sort_query_params(url: &Url) -> Vec<(String, String)> {
    let mut params: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| !is_tracking_param(key))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    params.sort_by(|a, b| a.0.cmp(&b.0));

    params
}

/// Checks if a query parameter is a tracking parameter
fn is_tracking_param(key: &str) -> bool {
    TRACKING_PARAMS.contains(&key)
}
