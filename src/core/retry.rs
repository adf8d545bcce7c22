//! Retry policy for language model calls.
//!
//! Rate limited responses (HTTP 429) back off exponentially with jitter,
//! server errors and transport failures retry right away, and everything
//! else (other 4xx, missing API key) stops.

use crate::config::toml_config::GeminiConfig;
use crate::utils::error::ScoutError;
use rand::Rng;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts (including the initial one).
    pub max_attempts: u32,
    /// Unit of the exponential backoff and upper bound of the jitter.
    pub base_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_millis(1000),
        }
    }
}

impl From<&GeminiConfig> for RetryConfig {
    fn from(config: &GeminiConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            base_delay: Duration::from_millis(config.backoff_base_ms),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    Backoff,
    Immediate,
    Stop,
}

impl RetryConfig {
    /// `2^attempt * base + uniform(0, base)`
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let base_ms = self.base_delay.as_millis() as u64;
        let exponential = base_ms.saturating_mul(1u64 << attempt.min(16));
        let jitter = if base_ms > 0 {
            rand::thread_rng().gen_range(0..base_ms)
        } else {
            0
        };
        Duration::from_millis(exponential.saturating_add(jitter))
    }
}

pub fn classify(error: &ScoutError) -> RetryDecision {
    match error {
        ScoutError::UpstreamStatusError { status: 429, .. } => RetryDecision::Backoff,
        ScoutError::UpstreamStatusError { status, .. } if *status >= 500 => {
            RetryDecision::Immediate
        }
        ScoutError::ApiError(_) | ScoutError::UpstreamResponseError { .. } => {
            RetryDecision::Immediate
        }
        _ => RetryDecision::Stop,
    }
}
