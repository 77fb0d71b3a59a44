use crate::state::PageResult;
use std::sync::{Mutex, PoisonError};

/// Append-only collection of page results shared by all workers
///
/// Results are kept in the order workers finished them, which is not the
/// order pages were discovered.
#[derive(Debug, Default)]
pub struct ResultBuffer {
    results: Mutex<Vec<PageResult>>,
}

impl ResultBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, result: PageResult) {
        self.results
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(result);
    }

    /// Copies the results collected so far
    pub fn snapshot(&self) -> Vec<PageResult> {
        self.results
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
