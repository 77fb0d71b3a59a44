//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with proper user agent strings
//! - GET requests with a per-request timeout
//! - Redirect handling (followed by the client, bounded)
//! - Rejecting non-2xx and non-HTML responses
//! - Error classification
//!
//! Workers only see the [`Fetcher`] trait, so the crawl engine can run
//! against any page source.

use crate::config::{CrawlConfig, UserAgentConfig};
use crate::crawler::parser::parse_html;
use crate::url::is_valid_url;
use reqwest::{header::CONTENT_TYPE, redirect::Policy, Client};
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

/// Maximum number of redirect hops followed for a single fetch
pub const MAX_REDIRECTS: usize = 10;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// A successfully fetched and parsed HTML page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchedPage {
    /// URL the content was served from, after redirects
    pub final_url: String,

    /// HTTP status code of the final response
    pub status_code: u16,

    /// Declared Content-Length, or the body size when none was declared
    pub content_length: u64,

    /// Content-Type header value
    pub content_type: String,

    /// Page title, empty when the page has none
    pub title: String,

    /// Raw href values in document order
    pub links: Vec<String>,
}

/// Reasons a fetch produced no page
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Request to {url} timed out after {timeout:?}")]
    Timeout { url: String, timeout: Duration },

    #[error("Request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Non-OK status code {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Non-HTML content type '{content_type}' for {url}")]
    NotHtml { url: String, content_type: String },
}

impl FetchError {
    /// Maps a client error onto the timeout/transport distinction
    fn from_reqwest(url: &str, timeout: Duration, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
                timeout,
            }
        } else {
            FetchError::Http {
                url: url.to_string(),
                source: err,
            }
        }
    }
}

/// Source of pages for the crawl workers
///
/// Implementations must give up on a request once `timeout` has elapsed and
/// must only return `Ok` for a successful HTML response.
pub trait Fetcher: Send + Sync + 'static {
    /// Fetches `url` and extracts its title and raw links
    fn fetch(
        &self,
        url: &str,
        timeout: Duration,
    ) -> impl Future<Output = Result<FetchedPage, FetchError>> + Send;
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `user_agent` - The user agent identity sent with every request
/// * `timeout` - Default total timeout for a request
///
/// # Example
///
/// ```no_run
/// use sitecrawl::config::UserAgentConfig;
/// use sitecrawl::crawler::build_http_client;
/// use std::time::Duration;
///
/// let client = build_http_client(&UserAgentConfig::default(), Duration::from_secs(10)).unwrap();
/// ```
pub fn build_http_client(
    user_agent: &UserAgentConfig,
    timeout: Duration,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent.header_value())
        .timeout(timeout)
        .connect_timeout(CONNECT_TIMEOUT.min(timeout))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// [`Fetcher`] backed by a reqwest client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds the client from the user agent and fetch timeout of `config`
    pub fn from_config(config: &CrawlConfig) -> Result<Self, reqwest::Error> {
        let client = build_http_client(&config.user_agent, config.fetch_timeout)?;
        Ok(Self::new(client))
    }
}

impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<FetchedPage, FetchError> {
        if !is_valid_url(url) {
            return Err(FetchError::InvalidUrl(url.to_string()));
        }

        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url, timeout, e))?;

        let status = response.status();
        let final_url = response.url().to_string();

        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        if !is_html(&content_type) {
            return Err(FetchError::NotHtml {
                url: url.to_string(),
                content_type,
            });
        }

        let declared_length = response.content_length();
        let body = response
            .text()
            .await
            .map_err(|e| FetchError::from_reqwest(url, timeout, e))?;

        let parsed = parse_html(&body);

        Ok(FetchedPage {
            final_url,
            status_code: status.as_u16(),
            content_length: declared_length.unwrap_or(body.len() as u64),
            content_type,
            title: parsed.title,
            links: parsed.links,
        })
    }
}

fn is_html(content_type: &str) -> bool {
    content_type.to_ascii_lowercase().contains("text/html")
}
