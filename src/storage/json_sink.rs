use crate::state::PageResult;
use crate::storage::traits::{ResultSink, StorageError, StorageResult};
use chrono::Utc;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Writes results as one pretty-printed JSON document
///
/// The document wraps the results with metadata:
///
/// ```json
/// {
///   "results": [ ... ],
///   "count": 2,
///   "timestamp": "2024-01-01T00:00:00+00:00"
/// }
/// ```
#[derive(Debug, Clone)]
pub struct JsonSink {
    path: PathBuf,
}

#[derive(Serialize)]
struct JsonDocument<'a> {
    results: &'a [PageResult],
    count: usize,
    timestamp: String,
}

impl JsonSink {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl ResultSink for JsonSink {
    fn save(&self, results: &[PageResult]) -> StorageResult<()> {
        let file = File::create(&self.path).map_err(|source| StorageError::Create {
            path: self.path.clone(),
            source,
        })?;
        let mut writer = BufWriter::new(file);

        let document = JsonDocument {
            results,
            count: results.len(),
            timestamp: Utc::now().to_rfc3339(),
        };

        serde_json::to_writer_pretty(&mut writer, &document)?;
        writer.write_all(b"\n")?;
        writer.flush()?;

        tracing::debug!("Wrote {} results to {}", results.len(), self.path.display());
        Ok(())
    }

    fn destination(&self) -> String {
        self.path.display().to_string()
    }
}
