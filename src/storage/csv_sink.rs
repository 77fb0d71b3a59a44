use crate::state::PageResult;
use crate::storage::traits::{ResultSink, StorageError, StorageResult};
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Column names, in `PageResult` field order with `links` replaced by its count
pub const CSV_HEADER: [&str; 7] = [
    "url",
    "title",
    "status_code",
    "content_length",
    "LinksCount",
    "depth",
    "timestamp",
];

/// Writes results as CSV, one row per page
#[derive(Debug, Clone)]
pub struct CsvSink {
    path: PathBuf,
}

/// One CSV row; field order must match `CSV_HEADER`
#[derive(Serialize)]
struct CsvRow<'a> {
    url: &'a str,
    title: &'a str,
    status_code: u16,
    content_length: u64,
    links_count: usize,
    depth: usize,
    timestamp: String,
}

impl<'a> From<&'a PageResult> for CsvRow<'a> {
    fn from(result: &'a PageResult) -> Self {
        Self {
            url: &result.url,
            title: &result.title,
            status_code: result.status_code,
            content_length: result.content_length,
            links_count: result.links_count(),
            depth: result.depth,
            timestamp: result.timestamp.to_rfc3339(),
        }
    }
}

impl CsvSink {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

/// Writes the header and one row per result to any writer
pub fn write_csv<W: Write>(writer: W, results: &[PageResult]) -> StorageResult<()> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    // Written explicitly so that empty results still produce a header
    csv_writer.write_record(CSV_HEADER)?;
    for result in results {
        csv_writer.serialize(CsvRow::from(result))?;
    }
    csv_writer.flush()?;

    Ok(())
}

impl ResultSink for CsvSink {
    fn save(&self, results: &[PageResult]) -> StorageResult<()> {
        let file = File::create(&self.path).map_err(|source| StorageError::Create {
            path: self.path.clone(),
            source,
        })?;

        write_csv(file, results)?;

        tracing::debug!("Wrote {} results to {}", results.len(), self.path.display());
        Ok(())
    }

    fn destination(&self) -> String {
        self.path.display().to_string()
    }
}
