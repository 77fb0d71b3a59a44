//! Statistics generation from crawl results
//!
//! This module provides functionality for summarizing and displaying the
//! results of a finished crawl.

use crate::state::PageResult;
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

/// Crawl statistics summary
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CrawlStatistics {
    /// Number of pages fetched successfully
    pub total_pages: usize,

    /// Sum of the links found on every page, duplicates included
    pub total_links: usize,

    /// Count of pages by depth
    pub pages_by_depth: BTreeMap<usize, usize>,

    /// Count of pages by HTTP status code
    pub pages_by_status: BTreeMap<u16, usize>,

    /// Wall time of the run
    pub duration: Duration,
}

impl CrawlStatistics {
    /// Summarizes the results of a run that took `duration`
    pub fn from_results(results: &[PageResult], duration: Duration) -> Self {
        let mut stats = CrawlStatistics {
            total_pages: results.len(),
            duration,
            ..Default::default()
        };

        for result in results {
            stats.total_links += result.links_count();
            *stats.pages_by_depth.entry(result.depth).or_insert(0) += 1;
            *stats.pages_by_status.entry(result.status_code).or_insert(0) += 1;
        }

        stats
    }

    /// Average crawl throughput
    pub fn pages_per_second(&self) -> f64 {
        let secs = self.duration.as_secs_f64();
        if secs > 0.0 {
            self.total_pages as f64 / secs
        } else {
            0.0
        }
    }
}

impl fmt::Display for CrawlStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Crawl Statistics ===")?;
        writeln!(f)?;

        writeln!(f, "Overview:")?;
        writeln!(f, "  Pages crawled: {}", self.total_pages)?;
        writeln!(f, "  Links found: {}", self.total_links)?;
        writeln!(
            f,
            "  Duration: {:.2?} ({:.2} pages/sec)",
            self.duration,
            self.pages_per_second()
        )?;

        if !self.pages_by_depth.is_empty() {
            writeln!(f)?;
            writeln!(f, "Pages by Depth:")?;
            for (depth, count) in &self.pages_by_depth {
                writeln!(f, "  {}: {}", depth, count)?;
            }
        }

        if !self.pages_by_status.is_empty() {
            writeln!(f)?;
            writeln!(f, "Pages by Status:")?;
            for (status, count) in &self.pages_by_status {
                writeln!(f, "  {}: {}", status, count)?;
            }
        }

        Ok(())
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CrawlStatistics) {
    print!("{}", stats);
}
