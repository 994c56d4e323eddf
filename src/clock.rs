//! Time source for polling.
//!
//! Every wait in the engine reads time and sleeps through a [`Clock`], so
//! tests can swap in a [`ManualClock`] and simulate seconds of browser
//! latency without sleeping.

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[async_trait]
pub trait Clock: Send + Sync {
    /// Monotonic time elapsed since the clock's origin.
    fn now(&self) -> Duration;

    /// Suspend the caller for `duration`. A zero duration just yields.
    async fn sleep(&self, duration: Duration);
}

/// Wall-clock time backed by `tokio::time`.
#[derive(Debug, Clone)]
pub struct SystemClock {
    origin: tokio::time::Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: tokio::time::Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    async fn sleep(&self, duration: Duration) {
        if duration.is_zero() {
            tokio::task::yield_now().await;
        } else {
            tokio::time::sleep(duration).await;
        }
    }
}

/// Fake clock that only moves when slept on or advanced by hand.
///
/// Clones share the same time, so a test can hand one copy to the engine
/// and another to a scripted driver.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    nanos: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, duration: Duration) {
        self.nanos
            .fetch_add(duration.as_nanos() as u64, Ordering::SeqCst);
    }

    pub fn set(&self, at: Duration) {
        self.nanos.store(at.as_nanos() as u64, Ordering::SeqCst);
    }
}

#[async_trait]
impl Clock for ManualClock {
    fn now(&self) -> Duration {
        Duration::from_nanos(self.nanos.load(Ordering::SeqCst))
    }

    async fn sleep(&self, duration: Duration) {
        // busy polling with a zero interval still has to make progress
        let step = if duration.is_zero() {
            Duration::from_millis(1)
        } else {
            duration
        };
        self.advance(step);
    }
}
