//! Sitecrawl main entry point
//!
//! This is the command-line interface for the Sitecrawl single-domain crawler.

use anyhow::{bail, Context};
use clap::Parser;
use sitecrawl::config::{
    load_config, parse_duration, CrawlConfig, FileConfig, DEFAULT_CRAWL_TIMEOUT,
    DEFAULT_OUTPUT_PATH,
};
use sitecrawl::output::{
    print_statistics, print_summary, spawn_progress, CrawlStatistics, PROGRESS_INTERVAL,
};
use sitecrawl::storage::sink_for_path;
use sitecrawl::Coordinator;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Sitecrawl: a bounded, single-domain web crawler
///
/// Crawls every page reachable from the seed URL on the same host, up to a
/// maximum link depth, and saves one record per page as JSON or CSV.
#[derive(Parser, Debug)]
#[command(name = "sitecrawl")]
#[command(version)]
#[command(about = "A bounded, single-domain web crawler", long_about = None)]
struct Cli {
    /// Seed URL to start crawling from (scheme defaults to https)
    #[arg(short, long)]
    url: Option<String>,

    /// Maximum link depth from the seed [default: 2]
    #[arg(short, long)]
    depth: Option<usize>,

    /// Number of concurrent workers [default: 5]
    #[arg(short, long)]
    workers: Option<usize>,

    /// Timeout for a single request, e.g. 10s or 500ms [default: 10s]
    #[arg(long, value_parser = parse_duration)]
    timeout: Option<Duration>,

    /// Minimum time between two requests across all workers [default: 100ms]
    #[arg(long, value_parser = parse_duration)]
    rate: Option<Duration>,

    /// Output file; .json writes JSON, anything else CSV [default: results.json]
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Stop the whole crawl after this long; 0 disables [default: 5m]
    #[arg(long, value_parser = parse_duration)]
    crawl_timeout: Option<Duration>,

    /// Path to a TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log file, or - for stderr
    #[arg(long, default_value = "crawler.log")]
    log_file: String,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress progress output and statistics
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Cli {
    /// Copies every flag that was given onto a crawl configuration
    fn apply_to(&self, config: &mut CrawlConfig) {
        if let Some(url) = &self.url {
            config.seed_url = url.clone();
        }
        if let Some(depth) = self.depth {
            config.max_depth = depth;
        }
        if let Some(workers) = self.workers {
            config.workers = workers;
        }
        if let Some(timeout) = self.timeout {
            config.fetch_timeout = timeout;
        }
        if let Some(rate) = self.rate {
            config.rate_interval = rate;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet, &cli.log_file)?;

    let file = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?
        }
        None => FileConfig::default(),
    };

    // Precedence: flags, then the file, then defaults
    let mut config = CrawlConfig::new(String::new());
    file.apply_to(&mut config);
    cli.apply_to(&mut config);

    if config.seed_url.trim().is_empty() {
        bail!("A seed URL is required; pass --url <URL>");
    }

    let output = cli
        .output
        .clone()
        .or_else(|| file.output.path.as_ref().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_PATH));
    let crawl_timeout = cli
        .crawl_timeout
        .or(file.crawler.crawl_timeout)
        .unwrap_or(DEFAULT_CRAWL_TIMEOUT);

    handle_crawl(config, &output, crawl_timeout, cli.quiet).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Logs go to `log_file` so stdout stays free for progress and the summary.
fn setup_logging(verbose: u8, quiet: bool, log_file: &str) -> anyhow::Result<()> {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sitecrawl=info,warn"),
            1 => EnvFilter::new("sitecrawl=debug,info"),
            2 => EnvFilter::new("sitecrawl=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false);

    if log_file == "-" {
        builder.with_writer(std::io::stderr).init();
    } else {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_file)
            .with_context(|| format!("Failed to open log file {}", log_file))?;
        builder.with_ansi(false).with_writer(Mutex::new(file)).init();
    }

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(
    config: CrawlConfig,
    output: &Path,
    crawl_timeout: Duration,
    quiet: bool,
) -> anyhow::Result<()> {
    let sink = sink_for_path(output);
    let destination = sink.destination();

    let coordinator = Arc::new(
        Coordinator::new(config)
            .context("Failed to set up crawler")?
            .with_sink(sink),
    );

    println!(
        "Crawling {} (max depth {}, {} workers)",
        coordinator.config().seed_url,
        coordinator.config().max_depth,
        coordinator.config().workers
    );

    let done = CancellationToken::new();
    let control = tokio::spawn(stop_on_signal(
        Arc::clone(&coordinator),
        crawl_timeout,
        done.clone(),
    ));
    let progress =
        (!quiet).then(|| spawn_progress(std::io::stdout(), PROGRESS_INTERVAL, done.clone()));

    let outcome = coordinator.start().await;

    done.cancel();
    if let Err(e) = control.await {
        tracing::warn!("Stop handler failed: {}", e);
    }
    if let Some(progress) = progress {
        progress
            .await
            .context("Progress task failed")?
            .context("Failed to write progress")?;
    }

    let outcome = outcome.context("Crawl failed")?;

    print_summary(&outcome, Some(&destination));
    if !quiet {
        println!();
        print_statistics(&CrawlStatistics::from_results(
            &outcome.results,
            outcome.elapsed,
        ));
    }

    if let Some(e) = outcome.save_error {
        return Err(anyhow::Error::new(e).context(format!("Failed to save results to {}", destination)));
    }

    Ok(())
}

/// Stops the crawl on Ctrl-C or when the overall crawl timeout expires
///
/// Returns without stopping anything once `done` is cancelled. A zero
/// timeout disables the deadline.
async fn stop_on_signal(
    coordinator: Arc<Coordinator>,
    crawl_timeout: Duration,
    done: CancellationToken,
) {
    let deadline = async {
        if crawl_timeout.is_zero() {
            std::future::pending::<()>().await
        } else {
            tokio::time::sleep(crawl_timeout).await
        }
    };
    tokio::pin!(deadline);

    tokio::select! {
        _ = done.cancelled() => return,
        signal = tokio::signal::ctrl_c() => match signal {
            Ok(()) => println!("\nReceived interrupt signal, stopping crawl..."),
            Err(e) => {
                tracing::warn!("Unable to listen for Ctrl-C: {}", e);
                tokio::select! {
                    _ = done.cancelled() => return,
                    _ = &mut deadline => {
                        println!("\nCrawl timeout of {:?} reached, stopping crawl...", crawl_timeout)
                    }
                }
            }
        },
        _ = &mut deadline => {
            println!("\nCrawl timeout of {:?} reached, stopping crawl...", crawl_timeout)
        }
    }

    coordinator.stop().await;
}
