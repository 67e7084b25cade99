//! Artificial pauses
//!
//! Some tools pause before answering to pace the client. The pause is a
//! trait object so tests and batch runs can skip it.

use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

#[async_trait]
pub trait DelayHook: Send + Sync {
    async fn pause(&self, reason: &str);
}

/// Sleeps on the tokio timer
pub struct SleepDelay {
    duration: Duration,
}

impl SleepDelay {
    pub fn new(duration: Duration) -> Self {
        Self { duration }
    }

    pub fn from_millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }
}

#[async_trait]
impl DelayHook for SleepDelay {
    async fn pause(&self, reason: &str) {
        if self.duration.is_zero() {
            return;
        }
        debug!("Pausing {:?} ({})", self.duration, reason);
        tokio::time::sleep(self.duration).await;
    }
}

/// Returns immediately
pub struct NoDelay;

#[async_trait]
impl DelayHook for NoDelay {
    async fn pause(&self, _reason: &str) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[tokio::test]
    async fn test_sleep_delay_waits() {
        let start = Instant::now();
        SleepDelay::from_millis(50).pause("test").await;
        assert!(start.elapsed() >= Duration::from_millis(50));
    }

    #[tokio::test]
    async fn test_zero_delay_returns_immediately() {
        let start = Instant::now();
        SleepDelay::from_millis(0).pause("test").await;
        NoDelay.pause("test").await;
        assert!(start.elapsed() < Duration::from_secs(1));
    }
}
