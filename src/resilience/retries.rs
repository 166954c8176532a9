//! Retry logic.
//!
//! # Responsibilities
//! - Determine if a failed attempt may be retried
//! - Compute the jittered delay before the retry
//!
//! # Design Decisions
//! - At most one retry (two attempts total)
//! - Only idempotent methods with an empty body are retried
//! - Only unreachable failures (refused connection or deadline) are retried

use std::time::Duration;

use axum::http::Method;

use crate::config::schema::RetryConfig;
use crate::resilience::backoff::calculate_backoff;

/// Compiled retry settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay_ms: u64,
    max_delay_ms: u64,
}

impl RetryPolicy {
    pub fn from_config(config: &RetryConfig) -> Self {
        let max_attempts = if config.enabled {
            config.max_attempts.clamp(1, 2)
        } else {
            1
        };
        Self {
            max_attempts,
            base_delay_ms: config.base_delay_ms,
            max_delay_ms: config.max_delay_ms,
        }
    }

    /// Number of attempts allowed for this request.
    pub fn attempts_for(&self, method: &Method, body_is_empty: bool) -> u32 {
        if method.is_idempotent() && body_is_empty {
            self.max_attempts
        } else {
            1
        }
    }

    /// Delay before attempt number `attempt + 1`.
    pub fn delay(&self, attempt: u32) -> Duration {
        calculate_backoff(attempt, self.base_delay_ms, self.max_delay_ms)
    }
}
