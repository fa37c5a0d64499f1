//! Backoff policy and sleep abstraction.
//!
//! Campaign pacing and failure backoff go through [`Sleeper`] so the
//! controller's timing behavior is deterministic and testable without real
//! delays.

use async_trait::async_trait;
use std::time::Duration;

/// Delay schedule for failed attempts.
///
/// The default campaign behavior is a fixed interval; an exponential
/// schedule with a cap is available for gateway-heavy deployments.
#[derive(Debug, Clone, Copy)]
pub struct BackoffPolicy {
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    pub exponential_base: f64,
}

impl BackoffPolicy {
    /// Same delay for every failed attempt.
    pub fn fixed(delay_ms: u64) -> Self {
        Self {
            base_delay_ms: delay_ms,
            max_delay_ms: delay_ms,
            exponential_base: 1.0,
        }
    }

    /// Exponentially growing delay, capped.
    pub fn exponential(base_delay_ms: u64, max_delay_ms: u64) -> Self {
        Self {
            base_delay_ms,
            max_delay_ms,
            exponential_base: 2.0,
        }
    }

    /// Delay before retrying after `attempt` consecutive failures.
    pub fn delay(&self, attempt: u32) -> Duration {
        let delay_ms = self.base_delay_ms as f64 * self.exponential_base.powi(attempt as i32);
        Duration::from_millis(delay_ms.min(self.max_delay_ms as f64) as u64)
    }
}

/// Injectable sleep, so tests can run campaigns without waiting.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Production sleeper backed by the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Sleeper that returns immediately. Test use only.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSleeper;

#[async_trait]
impl Sleeper for NoopSleeper {
    async fn sleep(&self, _duration: Duration) {}
}
