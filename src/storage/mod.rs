//! Storage module for persisting crawl results
//!
//! This module handles writing the results of a finished crawl to disk:
//! - JSON documents with run metadata
//! - CSV tables with one row per page
//! - Choosing a sink from the output file name

mod csv_sink;
mod json_sink;
mod traits;

pub use csv_sink::{write_csv, CsvSink, CSV_HEADER};
pub use json_sink::JsonSink;
pub use traits::{ResultSink, StorageError, StorageResult};

use std::path::Path;

/// Checks if a file path has a `.json` extension (any case)
pub fn is_json_file(path: &Path) -> bool {
    has_extension(path, "json")
}

/// Checks if a file path has a `.csv` extension (any case)
pub fn is_csv_file(path: &Path) -> bool {
    has_extension(path, "csv")
}

fn has_extension(path: &Path, wanted: &str) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| ext.eq_ignore_ascii_case(wanted))
}

/// Picks the result sink for an output file
///
/// `.json` files get the JSON sink; every other name, including `.csv`,
/// gets the CSV sink.
///
/// # Example
///
/// ```
/// use sitecrawl::storage::sink_for_path;
/// use std::path::Path;
///
/// let sink = sink_for_path(Path::new("results.json"));
/// assert_eq!(sink.destination(), "results.json");
/// ```
pub fn sink_for_path(path: &Path) -> Box<dyn ResultSink> {
    if is_json_file(path) {
        Box::new(JsonSink::new(path))
    } else {
        Box::new(CsvSink::new(path))
    }
}
