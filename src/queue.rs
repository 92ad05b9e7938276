//! Rate-limited request queue
//!
//! Serializes outbound calls to one external source and keeps a minimum gap
//! between two dispatches. Waiters are served in arrival order because
//! tokio's mutex is fair.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};

/// FIFO, single-flight throttle for one provider
///
/// Clones share the same queue. Each provider gets its own instance so calls
/// to one source never wait on another.
#[derive(Debug, Clone)]
pub struct RequestQueue {
    min_delay: Duration,
    last_dispatch: Arc<Mutex<Option<Instant>>>,
}

impl RequestQueue {
    pub fn new(min_delay: Duration) -> Self {
        Self {
            min_delay,
            last_dispatch: Arc::new(Mutex::new(None)),
        }
    }

    /// Queue without any delay between calls (tests, local sources)
    pub fn unthrottled() -> Self {
        Self::new(Duration::ZERO)
    }

    pub fn min_delay(&self) -> Duration {
        self.min_delay
    }

    /// Run `task` once every earlier task has finished and the minimum delay
    /// since the previous dispatch has passed.
    ///
    /// The task's output, including any error it carries, goes back to this
    /// caller only. A task that never completes blocks the queue; wrap the
    /// task body in a timeout.
    pub async fn execute<F, Fut, T>(&self, task: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let mut last = self.last_dispatch.lock().await;

        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.min_delay {
                let wait = self.min_delay - elapsed;
                log::debug!("Throttling request for {:?}", wait);
                sleep(wait).await;
            }
        }

        *last = Some(Instant::now());
        task().await
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
