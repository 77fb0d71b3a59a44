//! Crawler coordinator - main crawl orchestration logic
//!
//! This module owns the lifecycle of one crawl run, including:
//! - Normalizing the seed and deriving the crawl domain
//! - Spawning the worker pool and seeding the job queue
//! - Waiting for natural completion or cancellation
//! - Handing the collected results to the result sink

use crate::config::CrawlConfig;
use crate::crawler::fetcher::{Fetcher, HttpFetcher};
use crate::crawler::scheduler::{Job, JobQueue, RateLimiter};
use crate::crawler::worker::{run_worker, CrawlContext, WorkerExit};
use crate::state::{PageResult, ResultBuffer, SeenSet};
use crate::storage::{ResultSink, StorageError};
use crate::url::{domain_of, normalize_url};
use crate::{CrawlError, UrlError};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// How a crawl run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// Every reachable page within the depth bound was processed
    Finished,

    /// The run was stopped before the job queue drained
    Cancelled,
}

/// Everything a finished run produced
#[derive(Debug)]
pub struct CrawlOutcome {
    /// One entry per successfully fetched page, in completion order
    pub results: Vec<PageResult>,

    pub completion: Completion,

    /// Wall time from start to the last worker exiting
    pub elapsed: Duration,

    /// Set when a result sink was configured and saving failed
    pub save_error: Option<StorageError>,
}

impl CrawlOutcome {
    pub fn is_cancelled(&self) -> bool {
        self.completion == Completion::Cancelled
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunState {
    Idle,
    Running,
    Finished,
}

/// Main crawler coordinator structure
///
/// A coordinator runs a single crawl: `start` may be called once, and `stop`
/// may be called any number of times from any task, before, during or after
/// the run.
///
/// # Example
///
/// ```no_run
/// use sitecrawl::{Coordinator, CrawlConfig};
///
/// # async fn run() -> Result<(), sitecrawl::CrawlError> {
/// let coordinator = Coordinator::new(CrawlConfig::new("https://example.com"))?;
/// let outcome = coordinator.start().await?;
/// println!("Found {} unique URLs", outcome.results.len());
/// # Ok(())
/// # }
/// ```
pub struct Coordinator<F: Fetcher = HttpFetcher> {
    config: CrawlConfig,
    fetcher: Arc<F>,
    sink: Option<Box<dyn ResultSink>>,
    cancel: CancellationToken,
    state: watch::Sender<RunState>,
}

impl Coordinator<HttpFetcher> {
    /// Creates a coordinator that fetches pages over HTTP
    ///
    /// Zero values in `config` are replaced by their defaults.
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to start
    /// * `Err(CrawlError)` - The HTTP client could not be built
    pub fn new(config: CrawlConfig) -> Result<Self, CrawlError> {
        let config = config.with_defaults();
        let fetcher = HttpFetcher::from_config(&config)?;
        Ok(Self::with_fetcher(config, fetcher))
    }
}

impl<F: Fetcher> Coordinator<F> {
    /// Creates a coordinator that uses a custom page source
    pub fn with_fetcher(config: CrawlConfig, fetcher: F) -> Self {
        let (state, _) = watch::channel(RunState::Idle);
        Self {
            config: config.with_defaults(),
            fetcher: Arc::new(fetcher),
            sink: None,
            cancel: CancellationToken::new(),
            state,
        }
    }

    /// Saves the results to `sink` once the run ends
    pub fn with_sink(mut self, sink: Box<dyn ResultSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// The effective configuration, with defaults applied
    pub fn config(&self) -> &CrawlConfig {
        &self.config
    }

    pub fn is_running(&self) -> bool {
        *self.state.borrow() == RunState::Running
    }

    /// Runs the crawl to completion or cancellation
    ///
    /// Blocks until every worker has exited, then saves the results if a
    /// sink is configured. A failed save is reported in
    /// [`CrawlOutcome::save_error`] rather than discarding the results.
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlOutcome)` - The run ended, normally or through `stop`
    /// * `Err(CrawlError::AlreadyStarted)` - `start` was called before
    /// * `Err(CrawlError::Url)` - The seed URL is unusable
    pub async fn start(&self) -> Result<CrawlOutcome, CrawlError> {
        let claimed = self.state.send_if_modified(|state| {
            if *state == RunState::Idle {
                *state = RunState::Running;
                true
            } else {
                false
            }
        });
        if !claimed {
            return Err(CrawlError::AlreadyStarted);
        }

        // Also runs when this future is dropped mid-run, which aborts the workers
        let _finished = FinishOnDrop(&self.state);
        self.run().await
    }

    /// Cancels the crawl and waits until every worker has exited
    ///
    /// Idempotent. Returns immediately when the crawl was never started or
    /// has already ended; a later `start` then ends right away as cancelled.
    pub async fn stop(&self) {
        if !self.cancel.is_cancelled() {
            tracing::info!("Stopping crawl");
            self.cancel.cancel();
        }

        let mut state = self.state.subscribe();
        // The sender lives in self, so this can only end by the predicate
        let _ = state.wait_for(|state| *state != RunState::Running).await;
    }

    async fn run(&self) -> Result<CrawlOutcome, CrawlError> {
        let started = Instant::now();

        let seed = normalize_url(&self.config.seed_url)?;
        let domain = domain_of(&seed).ok_or(UrlError::MissingDomain)?;

        tracing::info!(
            "Starting crawl of {} (domain {}, max depth {}, {} workers, {:?} between requests)",
            seed,
            domain,
            self.config.max_depth,
            self.config.workers,
            self.config.rate_interval
        );

        let ctx = Arc::new(CrawlContext {
            config: self.config.clone(),
            domain,
            fetcher: Arc::clone(&self.fetcher),
            queue: JobQueue::new(),
            seen: SeenSet::new(),
            results: ResultBuffer::new(),
            limiter: RateLimiter::new(self.config.rate_interval),
            cancel: self.cancel.clone(),
        });

        let mut workers = JoinSet::new();
        if self.cancel.is_cancelled() {
            tracing::info!("Crawl cancelled before it started");
        } else {
            for id in 1..=self.config.workers {
                workers.spawn(run_worker(id, Arc::clone(&ctx)));
            }

            ctx.queue.increment();
            ctx.seen.mark_if_absent(&seed);
            if let Err(job) = ctx.queue.push(Job::new(seed, 0)) {
                tracing::error!("Job queue closed before seeding {}", job.url);
                ctx.queue.decrement();
            }
        }

        tokio::select! {
            _ = join_workers(&mut workers) => {}
            _ = self.cancel.cancelled() => {
                tracing::info!("Cancellation requested, waiting for workers to exit");
                join_workers(&mut workers).await;
            }
        }

        // The queue only closes when the pending count reached zero
        let completion = if ctx.queue.is_closed() {
            Completion::Finished
        } else {
            Completion::Cancelled
        };
        let elapsed = started.elapsed();
        let results = ctx.results.snapshot();

        match completion {
            Completion::Finished => tracing::info!(
                "Crawl finished in {:?}: {} pages, {} URLs discovered",
                elapsed,
                results.len(),
                ctx.seen.len()
            ),
            Completion::Cancelled => tracing::info!(
                "Crawl cancelled after {:?}: {} pages, {} jobs abandoned",
                elapsed,
                results.len(),
                ctx.queue.pending()
            ),
        }

        let save_error = self.save(&results);

        Ok(CrawlOutcome {
            results,
            completion,
            elapsed,
            save_error,
        })
    }

    fn save(&self, results: &[PageResult]) -> Option<StorageError> {
        let sink = self.sink.as_ref()?;
        match sink.save(results) {
            Ok(()) => {
                tracing::info!("Saved {} results to {}", results.len(), sink.destination());
                None
            }
            Err(e) => {
                tracing::error!("Failed to save results to {}: {}", sink.destination(), e);
                Some(e)
            }
        }
    }
}

/// Moves the run state to `Finished` when dropped
struct FinishOnDrop<'a>(&'a watch::Sender<RunState>);

impl Drop for FinishOnDrop<'_> {
    fn drop(&mut self) {
        self.0.send_replace(RunState::Finished);
    }
}

async fn join_workers(workers: &mut JoinSet<WorkerExit>) {
    while let Some(joined) = workers.join_next().await {
        match joined {
            Ok(exit) => tracing::trace!("Worker exited: {:?}", exit),
            Err(e) => tracing::error!("Worker task failed: {}", e),
        }
    }
}
