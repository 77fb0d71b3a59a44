//! Crawl worker loop
//!
//! Each worker repeatedly takes a job, waits for the shared rate limiter,
//! fetches the page, records the result and schedules newly discovered
//! same-domain links. Every blocking point also watches the cancellation
//! token, so a stopped crawl never leaves a worker stuck.

use crate::config::CrawlConfig;
use crate::crawler::fetcher::{FetchError, FetchedPage, Fetcher};
use crate::crawler::scheduler::{Job, JobQueue, RateLimiter};
use crate::state::{PageResult, ResultBuffer, SeenSet};
use crate::url::{has_http_scheme, is_same_domain, is_valid_url, normalize_url, resolve_url};
use chrono::Utc;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// State shared by all workers of one crawl
pub(crate) struct CrawlContext<F> {
    pub config: CrawlConfig,
    /// Host (with non-default port) of the seed; only links on it are followed
    pub domain: String,
    pub fetcher: Arc<F>,
    pub queue: JobQueue,
    pub seen: SeenSet,
    pub results: ResultBuffer,
    pub limiter: RateLimiter,
    pub cancel: CancellationToken,
}

/// Why a worker returned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WorkerExit {
    QueueClosed,
    Cancelled,
}

/// Runs one worker until the queue closes or the crawl is cancelled
pub(crate) async fn run_worker<F: Fetcher>(id: usize, ctx: Arc<CrawlContext<F>>) -> WorkerExit {
    tracing::debug!("Worker {} started", id);

    loop {
        let job = tokio::select! {
            biased;
            _ = ctx.cancel.cancelled() => {
                tracing::debug!("Worker {} shutting down due to cancellation", id);
                return WorkerExit::Cancelled;
            }
            job = ctx.queue.next() => match job {
                Some(job) => job,
                None => {
                    tracing::debug!("Worker {} exiting: job queue closed", id);
                    return WorkerExit::QueueClosed;
                }
            },
        };

        tokio::select! {
            biased;
            _ = ctx.cancel.cancelled() => {
                tracing::debug!("Worker {} cancelled while waiting for rate limiter", id);
                return WorkerExit::Cancelled;
            }
            _ = ctx.limiter.acquire() => {}
        }

        tracing::debug!("Worker {} crawling {} (depth {})", id, job.url, job.depth);

        let fetched = tokio::select! {
            biased;
            _ = ctx.cancel.cancelled() => {
                tracing::debug!("Worker {} cancelled during fetch of {}", id, job.url);
                return WorkerExit::Cancelled;
            }
            fetched = fetch_with_timeout(&ctx, &job) => fetched,
        };

        let page = match fetched {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!("Error crawling {}: {}", job.url, e);
                ctx.queue.decrement();
                continue;
            }
        };

        let result = build_result(&job, page);
        tracing::info!(
            "Crawled {} (depth {}, status {}, {} links)",
            result.url,
            result.depth,
            result.status_code,
            result.links_count()
        );

        let links = result.links.clone();
        ctx.results.push(result);

        let scheduled = if job.depth < ctx.config.max_depth {
            schedule_links(id, &ctx, &job, &links)
        } else {
            tracing::debug!("Max depth reached at {}, not following links", job.url);
            Ok(0)
        };

        match scheduled {
            Ok(added) if added > 0 => {
                tracing::debug!("Worker {} added {} new jobs from {}", id, added, job.url)
            }
            Ok(_) => {}
            Err(Cancelled) => {
                tracing::debug!("Worker {} cancelled while adding jobs", id);
                return WorkerExit::Cancelled;
            }
        }

        ctx.queue.decrement();
    }
}

/// Marker for cancellation observed in the middle of scheduling
struct Cancelled;

/// Bounds the fetch by the configured timeout even if the fetcher does not
async fn fetch_with_timeout<F: Fetcher>(
    ctx: &CrawlContext<F>,
    job: &Job,
) -> Result<FetchedPage, FetchError> {
    let timeout = ctx.config.fetch_timeout;
    match tokio::time::timeout(timeout, ctx.fetcher.fetch(&job.url, timeout)).await {
        Ok(result) => result,
        Err(_) => Err(FetchError::Timeout {
            url: job.url.clone(),
            timeout,
        }),
    }
}

/// Converts a fetched page into the result recorded for its job
fn build_result(job: &Job, page: FetchedPage) -> PageResult {
    let base = if page.final_url.is_empty() {
        job.url.as_str()
    } else {
        page.final_url.as_str()
    };

    if base != job.url {
        tracing::debug!("{} was served from {}", job.url, base);
    }

    PageResult {
        url: job.url.clone(),
        title: page.title,
        status_code: page.status_code,
        content_length: page.content_length,
        links: canonicalize_links(base, &page.links),
        depth: job.depth,
        timestamp: Utc::now(),
    }
}

/// Resolves raw hrefs against `base` and keeps the crawlable canonical ones
///
/// Empty and fragment-only hrefs are skipped, as is anything that does not
/// resolve to an http(s) URL or fails to normalize or validate. Order is
/// preserved and duplicates are kept.
pub(crate) fn canonicalize_links(base: &str, hrefs: &[String]) -> Vec<String> {
    hrefs
        .iter()
        .filter_map(|href| {
            let href = href.trim();
            if href.is_empty() || href.starts_with('#') {
                return None;
            }

            let absolute = resolve_url(base, href)
                .map_err(|e| tracing::trace!("Skipping href '{}': {}", href, e))
                .ok()?;
            if !has_http_scheme(&absolute) {
                return None;
            }
            let canonical = normalize_url(&absolute)
                .map_err(|e| tracing::trace!("Skipping link {}: {}", absolute, e))
                .ok()?;

            is_valid_url(&canonical).then_some(canonical)
        })
        .collect()
}

/// Schedules every same-domain link that has not been seen before
///
/// Each accepted link is marked seen and counted as pending before it is
/// pushed, and before the parent job is decremented, so the pending count
/// cannot reach zero while children are still being scheduled.
fn schedule_links<F>(
    id: usize,
    ctx: &CrawlContext<F>,
    parent: &Job,
    links: &[String],
) -> Result<usize, Cancelled> {
    let depth = parent.depth + 1;
    let mut added = 0;

    for link in links {
        if !is_same_domain(link, &ctx.domain) {
            tracing::trace!("Worker {} skipping off-domain link {}", id, link);
            continue;
        }
        if !ctx.seen.mark_if_absent(link) {
            continue;
        }

        ctx.queue.increment();
        if ctx.cancel.is_cancelled() {
            ctx.queue.decrement();
            return Err(Cancelled);
        }

        if let Err(job) = ctx.queue.push(Job::new(link.as_str(), depth)) {
            tracing::warn!("Job queue closed, dropping {}", job.url);
            ctx.queue.decrement();
            continue;
        }
        added += 1;
    }

    Ok(added)
}
