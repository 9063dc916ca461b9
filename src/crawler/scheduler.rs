//! Request throttling
//!
//! This module handles:
//! - Global concurrency limiting via a semaphore
//! - Respecting the minimum delay between request starts
//!
//! Every request the crawler makes targets the same host, so one shared slot
//! clock replaces per-domain bookkeeping.

use crate::config::CrawlerConfig;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OwnedSemaphorePermit, Semaphore};
use tokio::time::Instant;

/// Permission to issue one request; released on drop
pub struct RequestPermit {
    _permit: OwnedSemaphorePermit,
}

/// Scheduler gates outgoing requests
///
/// The scheduler coordinates:
/// - Global concurrency limits (max requests in flight)
/// - Request spacing (minimum time between request starts)
#[derive(Debug)]
pub struct Scheduler {
    /// Global semaphore for limiting concurrent fetches
    semaphore: Arc<Semaphore>,

    /// Minimum spacing between request starts
    min_interval: Duration,

    /// Earliest instant the next request may start
    next_slot: Mutex<Option<Instant>>,
}

impl Scheduler {
    /// Creates a scheduler from the crawler configuration
    pub fn new(config: &CrawlerConfig) -> Self {
        Self::with_limits(
            config.max_concurrent_requests as usize,
            Duration::from_millis(config.download_delay),
        )
    }

    /// Creates a scheduler with explicit limits
    pub fn with_limits(max_in_flight: usize, min_interval: Duration) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(max_in_flight.max(1))),
            min_interval,
            next_slot: Mutex::new(None),
        }
    }

    /// Waits until a request may be issued
    ///
    /// This method:
    /// 1. Acquires a global semaphore permit
    /// 2. Reserves the next start slot and sleeps until it arrives
    ///
    /// # Returns
    ///
    /// * `Some(RequestPermit)` - The caller may issue its request now
    /// * `None` - The scheduler was shut down
    pub async fn acquire(&self) -> Option<RequestPermit> {
        let permit = self.semaphore.clone().acquire_owned().await.ok()?;

        let wait = {
            let mut next_slot = self.next_slot.lock().await;
            let now = Instant::now();
            let start = match *next_slot {
                Some(slot) if slot > now => slot,
                _ => now,
            };
            *next_slot = Some(start + self.min_interval);
            start.saturating_duration_since(now)
        };

        if !wait.is_zero() {
            tracing::trace!("Throttling request for {:?}", wait);
            tokio::time::sleep(wait).await;
        }

        Some(RequestPermit { _permit: permit })
    }

    /// Stops handing out permits; pending and future `acquire` calls return `None`
    pub fn close(&self) {
        self.semaphore.close();
    }

    /// Number of requests that could start without waiting for a permit
    pub fn available_permits(&self) -> usize {
        self.semaphore.available_permits()
    }
}
