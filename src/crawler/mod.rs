//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching behind the [`Fetcher`] trait
//! - HTML parsing and link extraction
//! - The job queue with counter-driven termination, and rate limiting
//! - The worker pool and overall crawl coordination

mod coordinator;
mod fetcher;
mod parser;
mod scheduler;
mod worker;

pub use coordinator::{Completion, Coordinator, CrawlOutcome};
pub use fetcher::{build_http_client, FetchError, FetchedPage, Fetcher, HttpFetcher, MAX_REDIRECTS};
pub use parser::{parse_html, ParsedPage};
pub use scheduler::{Job, JobQueue, RateLimiter};

use crate::config::CrawlConfig;
use crate::storage::ResultSink;
use crate::CrawlError;

/// Runs a complete crawl over HTTP
///
/// Convenience wrapper around [`Coordinator`] for callers that never need to
/// stop the crawl early.
///
/// # Arguments
///
/// * `config` - The crawl configuration
/// * `sink` - Where to save the results, if anywhere
pub async fn crawl(
    config: CrawlConfig,
    sink: Option<Box<dyn ResultSink>>,
) -> Result<CrawlOutcome, CrawlError> {
    let mut coordinator = Coordinator::new(config)?;
    if let Some(sink) = sink {
        coordinator = coordinator.with_sink(sink);
    }
    coordinator.start().await
}
