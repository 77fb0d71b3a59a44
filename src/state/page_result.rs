//! Page result definitions
//!
//! A `PageResult` is produced once for every page that was fetched
//! successfully. Field declaration order is the column order used by the
//! CSV sink.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single crawled page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageResult {
    /// Canonical URL of the page
    pub url: String,

    /// Trimmed `<title>` text (empty when the page has none)
    pub title: String,

    /// HTTP status code of the final response
    pub status_code: u16,

    /// Response size in bytes
    pub content_length: u64,

    /// Canonical, crawlable links found on the page, in document order
    pub links: Vec<String>,

    /// Link distance from the seed URL (the seed is depth 0)
    pub depth: usize,

    /// When the page was fetched
    pub timestamp: DateTime<Utc>,
}

impl PageResult {
    /// Creates an empty result for a URL at a depth, stamped with the current time
    pub fn new(url: impl Into<String>, depth: usize) -> Self {
        Self {
            url: url.into(),
            title: String::new(),
            status_code: 0,
            content_length: 0,
            links: Vec::new(),
            depth,
            timestamp: Utc::now(),
        }
    }

    /// Number of links found on the page
    pub fn links_count(&self) -> usize {
        self.links.len()
    }
}
