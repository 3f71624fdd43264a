//! Time source for the poll loop.
//!
//! The poller only reads wall-clock time and sleeps through this trait so
//! tests can drive deadlines without waiting.

use chrono::{DateTime, TimeDelta, Utc};
use std::time::Duration;

/// Wall clock plus sleep
#[async_trait::async_trait]
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    async fn sleep(&self, duration: Duration);
}

/// Real time via chrono and tokio
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

#[async_trait::async_trait]
impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// `start + duration`, or `None` when it does not fit in a timestamp.
pub fn add_duration(start: DateTime<Utc>, duration: Duration) -> Option<DateTime<Utc>> {
    TimeDelta::from_std(duration)
        .ok()
        .and_then(|delta| start.checked_add_signed(delta))
}

/// Manually driven clock; `sleep` advances time instantly.
#[cfg(test)]
#[derive(Debug, Clone)]
pub struct ManualClock {
    start: DateTime<Utc>,
    now: std::sync::Arc<std::sync::Mutex<DateTime<Utc>>>,
}

#[cfg(test)]
impl ManualClock {
    pub fn new() -> Self {
        let start = DateTime::from_timestamp(1_714_557_600, 0).unwrap();
        Self {
            start,
            now: std::sync::Arc::new(std::sync::Mutex::new(start)),
        }
    }

    /// Time slept since creation
    pub fn elapsed(&self) -> TimeDelta {
        *self.now.lock().unwrap() - self.start
    }
}

#[cfg(test)]
#[async_trait::async_trait]
impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }

    async fn sleep(&self, duration: Duration) {
        let mut now = self.now.lock().unwrap();
        *now = add_duration(*now, duration).unwrap();
    }
}
