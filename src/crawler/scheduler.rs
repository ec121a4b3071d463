//! Request scheduler enforcing the global request budget
//!
//! This module handles:
//! - Global concurrency limiting via a semaphore
//! - A fixed delay between the start of consecutive requests
//!
//! Every fetch the pipeline issues, whether index page, detail page or agent
//! lookup, passes through the same scheduler.

use crate::config::CrawlerConfig;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OwnedSemaphorePermit, Semaphore};
use tokio::time::Instant;

/// Permission to have one request in flight
///
/// Dropping the permit frees the concurrency slot.
pub struct RequestPermit {
    _permit: Option<OwnedSemaphorePermit>,
}

/// Scheduler shared by every in-flight fetch
pub struct RequestScheduler {
    /// Global semaphore for limiting concurrent requests
    semaphore: Arc<Semaphore>,

    /// Minimum spacing between request starts
    delay: Duration,

    /// Earliest instant the next request may start
    next_slot: Mutex<Instant>,
}

impl RequestScheduler {
    /// Creates a new scheduler
    ///
    /// # Arguments
    ///
    /// * `max_concurrent` - Maximum number of requests in flight at once
    /// * `delay` - Fixed delay between consecutive request starts
    pub fn new(max_concurrent: u32, delay: Duration) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(max_concurrent.max(1) as usize)),
            delay,
            next_slot: Mutex::new(Instant::now()),
        }
    }

    /// Creates a scheduler from the crawler configuration
    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self::new(
            config.max_concurrent_requests,
            Duration::from_millis(config.download_delay_ms),
        )
    }

    /// Waits until a request may be issued
    ///
    /// This method:
    /// 1. Acquires a concurrency permit
    /// 2. Reserves the next start slot
    /// 3. Sleeps until that slot arrives
    pub async fn acquire(&self) -> RequestPermit {
        let permit = self.semaphore.clone().acquire_owned().await.ok();

        let wait = self.reserve_slot().await;
        if !wait.is_zero() {
            tracing::trace!("Waiting {:?} for the next request slot", wait);
            tokio::time::sleep(wait).await;
        }

        RequestPermit { _permit: permit }
    }

    /// Claims the next start slot and returns how long to wait for it
    async fn reserve_slot(&self) -> Duration {
        let mut next_slot = self.next_slot.lock().await;
        let now = Instant::now();
        let start = (*next_slot).max(now);
        *next_slot = start + self.delay;
        start - now
    }

    /// Returns the number of free concurrency slots
    pub fn available_permits(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Returns the configured delay between request starts
    pub fn delay(&self) -> Duration {
        self.delay
    }
}
