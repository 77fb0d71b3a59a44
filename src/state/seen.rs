use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

/// Set of canonical URLs that have already been scheduled during a run
///
/// The set only grows. Membership is tested and recorded in one critical
/// section, so two workers discovering the same link at the same time can
/// never both schedule it.
#[derive(Debug, Default)]
pub struct SeenSet {
    urls: Mutex<HashSet<String>>,
}

impl SeenSet {
    /// Creates an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a URL as seen
    ///
    /// # Returns
    ///
    /// * `true` - This call added the URL
    /// * `false` - The URL was already present
    pub fn mark_if_absent(&self, url: &str) -> bool {
        let mut urls = self.urls.lock().unwrap_or_else(PoisonError::into_inner);
        if urls.contains(url) {
            return false;
        }
        urls.insert(url.to_string())
    }

    /// Number of URLs marked so far
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.urls.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}
