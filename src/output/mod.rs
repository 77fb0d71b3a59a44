//! Output module for reporting crawl progress and results
//!
//! This module handles:
//! - The periodic progress indicator
//! - The summary lines printed when a crawl ends
//! - Run statistics derived from the results

mod progress;
pub mod stats;

pub use progress::{spawn_progress, PROGRESS_INTERVAL};
pub use stats::{print_statistics, CrawlStatistics};

use crate::crawler::{Completion, CrawlOutcome};

/// Builds the end-of-run summary
///
/// # Arguments
///
/// * `outcome` - The finished run
/// * `destination` - Where results were meant to be saved, if anywhere
pub fn summary_lines(outcome: &CrawlOutcome, destination: Option<&str>) -> Vec<String> {
    let mut lines = Vec::with_capacity(3);

    lines.push(match outcome.completion {
        Completion::Finished => format!("Crawling completed in {:.2?}", outcome.elapsed),
        Completion::Cancelled => format!("Crawling interrupted after {:.2?}", outcome.elapsed),
    });
    lines.push(format!("Found {} unique URLs", outcome.results.len()));

    if let Some(destination) = destination {
        lines.push(match &outcome.save_error {
            None => format!("Results saved to {}", destination),
            Some(e) => format!("Failed to save results to {}: {}", destination, e),
        });
    }

    lines
}

/// Prints the end-of-run summary to stdout
pub fn print_summary(outcome: &CrawlOutcome, destination: Option<&str>) {
    for line in summary_lines(outcome, destination) {
        println!("{}", line);
    }
}
