//! Progress indicator for long-running crawls
//!
//! Prints a dot at a fixed interval until the crawl ends, breaking the line
//! every ten dots.

use std::io::{self, Write};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Interval between two progress dots on the command line
pub const PROGRESS_INTERVAL: Duration = Duration::from_secs(5);

const DOTS_PER_LINE: usize = 10;

/// Spawns a task writing progress dots to `out` until `done` is cancelled
///
/// The first dot appears after one full interval. When the task ends it
/// terminates an unfinished line, then hands the writer back.
pub fn spawn_progress<W>(
    mut out: W,
    every: Duration,
    done: CancellationToken,
) -> JoinHandle<io::Result<W>>
where
    W: Write + Send + 'static,
{
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(Instant::now() + every, every);
        let mut dots = 0usize;

        loop {
            tokio::select! {
                _ = done.cancelled() => break,
                _ = ticker.tick() => {
                    dots += 1;
                    out.write_all(b".")?;
                    if dots % DOTS_PER_LINE == 0 {
                        out.write_all(b"\n")?;
                    }
                    out.flush()?;
                }
            }
        }

        if dots % DOTS_PER_LINE != 0 {
            out.write_all(b"\n")?;
            out.flush()?;
        }
        Ok(out)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_dots_until_done() {
        let done = CancellationToken::new();
        let handle = spawn_progress(Vec::new(), Duration::from_secs(5), done.clone());

        tokio::time::sleep(Duration::from_secs(26)).await;
        done.cancel();

        let out = handle.await.unwrap().unwrap();
        assert_eq!(out, b".....\n");
    }

    #[tokio::test(start_paused = true)]
    async fn test_line_break_every_ten_dots() {
        let done = CancellationToken::new();
        let handle = spawn_progress(Vec::new(), Duration::from_secs(1), done.clone());

        tokio::time::sleep(Duration::from_millis(12_500)).await;
        done.cancel();

        let out = String::from_utf8(handle.await.unwrap().unwrap()).unwrap();
        assert_eq!(out, "..........\n..\n");
    }

    #[tokio::test]
    async fn test_no_output_when_done_immediately() {
        let done = CancellationToken::new();
        done.cancel();

        let out = spawn_progress(Vec::new(), PROGRESS_INTERVAL, done)
            .await
            .unwrap()
            .unwrap();
        assert!(out.is_empty());
    }
}
