//! Retry policy for outbound calls.
//!
//! Implements exponential backoff: the delay after attempt `n` is
//! `base_delay * 2^(n-1)`.

use std::time::Duration;

use super::{FailureKind, HttpMethod};
use crate::core::config::RetryConfig;

/// Retry policy implementing exponential backoff.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of HTTP attempts, including the first.
    pub max_attempts: u32,
    /// Delay before the first retry.
    pub base_delay: Duration,
    /// Whether POST is retried on retryable failures.
    pub retry_non_idempotent: bool,
}

impl RetryPolicy {
    /// Create a new RetryPolicy from configuration settings.
    pub fn new(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            base_delay: Duration::from_millis(config.base_delay_ms),
            retry_non_idempotent: config.retry_non_idempotent,
        }
    }

    /// Delay to wait after the given (1-based) failed attempt.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 1u32
            .checked_shl(attempt.saturating_sub(1))
            .unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor)
    }

    /// Decide whether another attempt follows a failure of `kind` on the
    /// given (1-based) attempt.
    pub fn should_retry(&self, kind: FailureKind, method: HttpMethod, attempt: u32) -> bool {
        kind.is_retryable()
            && (method.is_idempotent() || self.retry_non_idempotent)
            && attempt < self.max_attempts
    }

    /// Total time spent sleeping when every attempt fails.
    pub fn worst_case_delay(&self) -> Duration {
        (1..self.max_attempts)
            .map(|attempt| self.delay_for(attempt))
            .fold(Duration::ZERO, Duration::saturating_add)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(&RetryConfig::default())
    }
}
