//! Configuration module for Sitecrawl
//!
//! This module defines the crawl configuration and its defaults, and loads
//! the optional TOML configuration file.
//!
//! # Example
//!
//! ```no_run
//! use sitecrawl::config::{load_config, CrawlConfig};
//! use std::path::Path;
//!
//! let file = load_config(Path::new("crawl.toml")).unwrap();
//! let mut config = CrawlConfig::new("https://example.com");
//! file.apply_to(&mut config);
//! println!("Crawler will use max depth: {}", config.with_defaults().max_depth);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    CrawlConfig, CrawlerSection, FileConfig, OutputSection, UserAgentConfig, UserAgentSection,
    DEFAULT_CRAWL_TIMEOUT, DEFAULT_FETCH_TIMEOUT, DEFAULT_MAX_DEPTH, DEFAULT_OUTPUT_PATH,
    DEFAULT_RATE_INTERVAL, DEFAULT_WORKERS,
};

// Re-export parser functions
pub use parser::{load_config, parse_config, parse_duration};
