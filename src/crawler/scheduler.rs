//! Job queue and rate limiting shared by the worker pool
//!
//! This module handles:
//! - The queue of (URL, depth) jobs between workers that discover links and
//!   workers that fetch them
//! - Termination detection through a pending-job counter: the queue closes
//!   exactly once, when the last outstanding job has been processed
//! - A single ticking rate limiter that bounds the aggregate fetch rate

use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{Interval, MissedTickBehavior};

/// A URL scheduled for fetching
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    /// Canonical URL to fetch
    pub url: String,

    /// Link distance from the seed
    pub depth: usize,
}

impl Job {
    pub fn new(url: impl Into<String>, depth: usize) -> Self {
        Self {
            url: url.into(),
            depth,
        }
    }
}

/// Multi-consumer job queue with counter-driven closure
///
/// The total number of jobs is unknown upfront because processing a job can
/// create new ones. Instead of counting workers, the queue counts pending
/// jobs, created but not yet fully processed, and closes itself when that
/// count drops to zero. The protocol is:
///
/// 1. `increment` before a job is pushed
/// 2. `decrement` exactly once per job, after any child jobs were incremented
/// 3. the decrement that reaches zero closes the queue; `next` then returns
///    `None` to every waiting worker
///
/// The counter has its own lock, separate from the channel, and closure only
/// ever happens while holding it.
#[derive(Debug)]
pub struct JobQueue {
    sender: Mutex<Option<mpsc::UnboundedSender<Job>>>,
    receiver: tokio::sync::Mutex<mpsc::UnboundedReceiver<Job>>,
    pending: Mutex<usize>,
}

impl Default for JobQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl JobQueue {
    /// Creates an open, empty queue with a pending count of zero
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            sender: Mutex::new(Some(sender)),
            receiver: tokio::sync::Mutex::new(receiver),
            pending: Mutex::new(0),
        }
    }

    /// Records a newly created job
    ///
    /// # Returns
    ///
    /// The pending count after the increment
    pub fn increment(&self) -> usize {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        *pending += 1;
        tracing::trace!("Pending jobs incremented to {}", *pending);
        *pending
    }

    /// Records that a job has been fully processed
    ///
    /// When the count reaches zero the queue is closed. Decrementing an
    /// already-zero counter is a bug in the caller; it is logged and ignored
    /// so the closure still happens only once.
    ///
    /// # Returns
    ///
    /// The pending count after the decrement
    pub fn decrement(&self) -> usize {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        if *pending == 0 {
            tracing::warn!("Pending job counter decremented below zero; ignoring");
            return 0;
        }

        *pending -= 1;
        tracing::trace!("Pending jobs decremented to {}", *pending);

        if *pending == 0 {
            self.close();
        }
        *pending
    }

    /// Makes a job available to workers
    ///
    /// # Returns
    ///
    /// * `Ok(())` - The job was queued
    /// * `Err(Job)` - The queue is already closed; the job is handed back
    pub fn push(&self, job: Job) -> Result<(), Job> {
        let sender = self.sender.lock().unwrap_or_else(PoisonError::into_inner);
        match sender.as_ref() {
            Some(sender) => sender.send(job).map_err(|e| e.0),
            None => Err(job),
        }
    }

    /// Waits for the next job
    ///
    /// Returns `None` once the queue is closed and drained. The future can be
    /// dropped at any time without losing a job.
    pub async fn next(&self) -> Option<Job> {
        let mut receiver = self.receiver.lock().await;
        receiver.recv().await
    }

    /// Current number of pending jobs
    pub fn pending(&self) -> usize {
        *self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns true once the pending count has reached zero
    pub fn is_closed(&self) -> bool {
        self.sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }

    fn close(&self) {
        // Dropping the only sender closes the channel
        let sender = self
            .sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if sender.is_some() {
            tracing::debug!("All jobs completed, closing job queue");
        }
    }
}

/// Global rate limiter shared by all workers
///
/// Every fetch first waits for a tick of one shared interval, so the limit
/// applies to the crawl as a whole rather than to each worker. Waiting
/// workers are served in FIFO order.
#[derive(Debug)]
pub struct RateLimiter {
    interval: tokio::sync::Mutex<Interval>,
    period: Duration,
}

impl RateLimiter {
    /// Creates a limiter that releases one fetch per `period`
    ///
    /// The first tick is available immediately. Must be called from within a
    /// Tokio runtime.
    pub fn new(period: Duration) -> Self {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self {
            interval: tokio::sync::Mutex::new(interval),
            period,
        }
    }

    /// Waits until the next fetch is allowed
    pub async fn acquire(&self) {
        self.interval.lock().await.tick().await;
    }

    pub fn period(&self) -> Duration {
        self.period
    }
}
