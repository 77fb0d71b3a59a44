use serde::Deserialize;
use std::time::Duration;

/// Default maximum link depth from the seed
pub const DEFAULT_MAX_DEPTH: usize = 2;

/// Default number of concurrent workers
pub const DEFAULT_WORKERS: usize = 5;

/// Default per-request timeout
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Default interval between two fetches across all workers
pub const DEFAULT_RATE_INTERVAL: Duration = Duration::from_millis(100);

/// Default overall crawl timeout used by the command line
pub const DEFAULT_CRAWL_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// Default output file
pub const DEFAULT_OUTPUT_PATH: &str = "results.json";

/// Configuration of one crawl run
///
/// Zero values are not meaningful for any of the numeric settings; call
/// [`CrawlConfig::with_defaults`] (the coordinator does) to replace them.
#[derive(Debug, Clone, PartialEq)]
pub struct CrawlConfig {
    /// The URL the crawl starts from
    pub seed_url: String,

    /// Maximum link depth from the seed (the seed itself is depth 0)
    pub max_depth: usize,

    /// Number of concurrent workers
    pub workers: usize,

    /// Timeout for a single page fetch
    pub fetch_timeout: Duration,

    /// Minimum interval between two fetches, shared by all workers
    pub rate_interval: Duration,

    /// How the crawler identifies itself to servers
    pub user_agent: UserAgentConfig,
}

impl CrawlConfig {
    /// Creates a configuration with default settings for a seed URL
    pub fn new(seed_url: impl Into<String>) -> Self {
        Self {
            seed_url: seed_url.into(),
            max_depth: DEFAULT_MAX_DEPTH,
            workers: DEFAULT_WORKERS,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            rate_interval: DEFAULT_RATE_INTERVAL,
            user_agent: UserAgentConfig::default(),
        }
    }

    /// Replaces zero values with the documented defaults
    ///
    /// A max depth of 0 also falls back to the default, so a crawl always
    /// follows links at least one level.
    pub fn with_defaults(mut self) -> Self {
        if self.max_depth == 0 {
            self.max_depth = DEFAULT_MAX_DEPTH;
        }
        if self.workers == 0 {
            self.workers = DEFAULT_WORKERS;
        }
        if self.fetch_timeout.is_zero() {
            self.fetch_timeout = DEFAULT_FETCH_TIMEOUT;
        }
        if self.rate_interval.is_zero() {
            self.rate_interval = DEFAULT_RATE_INTERVAL;
        }
        if self.user_agent.name.trim().is_empty() {
            self.user_agent.name = UserAgentConfig::default().name;
        }
        if self.user_agent.version.trim().is_empty() {
            self.user_agent.version = UserAgentConfig::default().version;
        }
        self
    }
}

/// User agent identification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAgentConfig {
    /// Name of the crawler
    pub name: String,

    /// Version of the crawler
    pub version: String,

    /// URL or email where site owners can reach the operator
    pub contact: Option<String>,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            contact: None,
        }
    }
}

impl UserAgentConfig {
    /// Formats the `User-Agent` header value
    ///
    /// Format: `Name/Version` or `Name/Version (+Contact)`
    pub fn header_value(&self) -> String {
        match self.contact.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
            Some(contact) => format!("{}/{} (+{})", self.name, self.version, contact),
            None => format!("{}/{}", self.name, self.version),
        }
    }
}

/// Settings that can be provided through a TOML configuration file
///
/// Every value is optional; command line flags take precedence over it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub crawler: CrawlerSection,

    #[serde(default, rename = "user-agent")]
    pub user_agent: UserAgentSection,

    #[serde(default)]
    pub output: OutputSection,
}

/// `[crawler]` table of the configuration file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct CrawlerSection {
    /// Seed URL
    pub url: Option<String>,

    pub max_depth: Option<usize>,

    pub workers: Option<usize>,

    #[serde(default, deserialize_with = "super::parser::deserialize_duration")]
    pub timeout: Option<Duration>,

    #[serde(default, deserialize_with = "super::parser::deserialize_duration")]
    pub rate: Option<Duration>,

    #[serde(default, deserialize_with = "super::parser::deserialize_duration")]
    pub crawl_timeout: Option<Duration>,
}

/// `[user-agent]` table of the configuration file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserAgentSection {
    pub name: Option<String>,
    pub version: Option<String>,
    pub contact: Option<String>,
}

/// `[output]` table of the configuration file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputSection {
    /// Output file; `.json` selects the JSON sink, anything else CSV
    pub path: Option<String>,
}

impl FileConfig {
    /// Copies every value present in the file onto a crawl configuration
    pub fn apply_to(&self, config: &mut CrawlConfig) {
        if let Some(url) = &self.crawler.url {
            config.seed_url = url.clone();
        }
        if let Some(depth) = self.crawler.max_depth {
            config.max_depth = depth;
        }
        if let Some(workers) = self.crawler.workers {
            config.workers = workers;
        }
        if let Some(timeout) = self.crawler.timeout {
            config.fetch_timeout = timeout;
        }
        if let Some(rate) = self.crawler.rate {
            config.rate_interval = rate;
        }
        if let Some(name) = &self.user_agent.name {
            config.user_agent.name = name.clone();
        }
        if let Some(version) = &self.user_agent.version {
            config.user_agent.version = version.clone();
        }
        if let Some(contact) = &self.user_agent.contact {
            config.user_agent.contact = Some(contact.clone());
        }
    }
}
