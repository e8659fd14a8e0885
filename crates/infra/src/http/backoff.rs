//! Retry budget and backoff delays
//!
//! A [`Backoff`] is created per call and threaded through the retry loop, so
//! no retry state is shared between concurrent calls. Waiting goes through a
//! [`Sleeper`] so tests can record delays instead of sleeping.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use hrlink_domain::RetryConfig;

/// Attempt budget and delay bounds for one vendor call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            base_delay: Duration::from_millis(config.base_delay_ms),
            max_delay: Duration::from_millis(config.max_delay_ms),
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `retry_number` (1-based):
    /// `base_delay * 2^(retry_number - 1)`, capped at `max_delay`.
    pub fn delay_for(&self, retry_number: u32) -> Duration {
        let shift = retry_number.saturating_sub(1).min(16);
        let multiplier = 1u32 << shift;
        self.base_delay.saturating_mul(multiplier).min(self.max_delay)
    }
}

/// Per-call retry state.
#[derive(Debug, Clone)]
pub struct Backoff {
    policy: RetryPolicy,
    attempts: u32,
}

impl Backoff {
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy, attempts: 0 }
    }

    /// Record the start of an attempt and return its 1-based number.
    pub fn begin_attempt(&mut self) -> u32 {
        self.attempts += 1;
        self.attempts
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Delay to wait before the next attempt, or `None` once the budget is
    /// spent.
    pub fn next_delay(&self) -> Option<Duration> {
        if self.attempts >= self.policy.max_attempts {
            return None;
        }
        Some(self.policy.delay_for(self.attempts))
    }
}

#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Sleeper backed by the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            tokio::time::sleep(duration).await;
        }
    }
}

/// Sleeper that returns immediately and remembers every requested delay.
#[derive(Debug, Clone, Default)]
pub struct RecordingSleeper {
    delays: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delays(&self) -> Vec<Duration> {
        self.delays.lock().map(|d| d.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        if let Ok(mut delays) = self.delays.lock() {
            delays.push(duration);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(max_attempts: u32, base_ms: u64, max_ms: u64) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            base_delay: Duration::from_millis(base_ms),
            max_delay: Duration::from_millis(max_ms),
        }
    }

    #[test]
    fn delays_double_until_capped() {
        let policy = policy(10, 100, 1_000);
        let delays: Vec<_> = (1..=6).map(|n| policy.delay_for(n).as_millis()).collect();
        assert_eq!(delays, vec![100, 200, 400, 800, 1_000, 1_000]);
    }

    #[test]
    fn backoff_allows_exactly_max_attempts() {
        let mut backoff = Backoff::new(policy(3, 10, 1_000));

        assert_eq!(backoff.begin_attempt(), 1);
        assert_eq!(backoff.next_delay(), Some(Duration::from_millis(10)));
        assert_eq!(backoff.begin_attempt(), 2);
        assert_eq!(backoff.next_delay(), Some(Duration::from_millis(20)));
        assert_eq!(backoff.begin_attempt(), 3);
        assert_eq!(backoff.next_delay(), None);
    }

    #[test]
    fn single_attempt_never_retries() {
        let mut backoff = Backoff::new(policy(1, 10, 1_000));
        backoff.begin_attempt();
        assert_eq!(backoff.next_delay(), None);
    }

    #[test]
    fn policy_from_config_clamps_zero_attempts() {
        let config = RetryConfig { max_attempts: 0, base_delay_ms: 5, max_delay_ms: 50 };
        assert_eq!(RetryPolicy::from(&config).max_attempts, 1);
    }

    #[tokio::test]
    async fn recording_sleeper_keeps_order() {
        let sleeper = RecordingSleeper::new();
        sleeper.sleep(Duration::from_millis(3)).await;
        sleeper.sleep(Duration::from_millis(1)).await;
        assert_eq!(sleeper.delays(), vec![Duration::from_millis(3), Duration::from_millis(1)]);
    }
}
