//! State module for data shared across crawl workers
//!
//! # Components
//!
//! - `PageResult`: What a crawl records for one fetched page
//! - `SeenSet`: Atomic test-and-set membership of canonical URLs
//! - `ResultBuffer`: Append-only, lock-guarded collection of page results

mod page_result;
mod results;
mod seen;

// Re-export main types
pub use page_result::PageResult;
pub use results::ResultBuffer;
pub use seen::SeenSet;
