//! Retry policies for outbound requests.

use crate::error::FetchError;
use std::time::Duration;

/// How a request is retried.
#[derive(Debug, Clone, Default)]
pub enum RetryPolicy {
    /// One attempt. Used for `POST /market-data`, where the session owns recovery.
    #[default]
    None,
    /// Retry transport failures and 429/502/503/504 with backoff. Used for GET listings.
    Idempotent,
    Custom(RetryConfig),
}

impl RetryPolicy {
    /// The effective config, or `None` for single-shot.
    pub fn config(&self) -> Option<RetryConfig> {
        match self {
            Self::None => None,
            Self::Idempotent => Some(RetryConfig::idempotent()),
            Self::Custom(c) => Some(c.clone()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Retries after the initial attempt.
    pub max_retries: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub backoff_factor: f64,
    /// ±25% around the computed delay.
    pub jitter: bool,
    pub retryable_statuses: Vec<u16>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(5),
            backoff_factor: 2.0,
            jitter: true,
            retryable_statuses: vec![502, 503, 504],
        }
    }
}

impl RetryConfig {
    pub fn idempotent() -> Self {
        Self {
            retryable_statuses: vec![429, 502, 503, 504],
            ..Self::default()
        }
    }

    /// Whether `error` is worth another attempt under this config.
    pub fn should_retry(&self, error: &FetchError) -> bool {
        match error {
            FetchError::Transport(_) => true,
            FetchError::ApiStatus { status, .. } => self.retryable_statuses.contains(status),
            FetchError::Decode(_) => false,
        }
    }

    /// Delay before retry number `attempt` (0-indexed).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let base = self.initial_delay.as_millis() as f64 * self.backoff_factor.powi(attempt as i32);
        let capped = base.min(self.max_delay.as_millis() as f64);

        let ms = if self.jitter {
            let spread = capped * 0.25;
            (capped + (rand::random::<f64>() - 0.5) * 2.0 * spread).max(0.0)
        } else {
            capped
        };

        Duration::from_millis(ms as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat(initial_ms: u64, max_ms: u64, factor: f64) -> RetryConfig {
        RetryConfig {
            max_retries: 4,
            initial_delay: Duration::from_millis(initial_ms),
            max_delay: Duration::from_millis(max_ms),
            backoff_factor: factor,
            jitter: false,
            retryable_statuses: vec![503],
        }
    }

    #[test]
    fn test_default_policy_is_single_shot() {
        assert!(RetryPolicy::default().config().is_none());
    }

    #[test]
    fn test_idempotent_retries_rate_limits() {
        let config = RetryPolicy::Idempotent.config().unwrap();
        for status in [429, 502, 503, 504] {
            assert!(config.should_retry(&FetchError::ApiStatus { status, body: String::new() }));
        }
        assert!(!config.should_retry(&FetchError::ApiStatus { status: 404, body: String::new() }));
        assert!(config.should_retry(&FetchError::Transport("refused".into())));
        assert!(!config.should_retry(&FetchError::Decode("bad json".into())));
    }

    #[test]
    fn test_exponential_delays() {
        let config = flat(100, 10_000, 2.0);
        let delays: Vec<u128> = (0..3).map(|a| config.delay_for_attempt(a).as_millis()).collect();
        assert_eq!(delays, vec![100, 200, 400]);
    }

    #[test]
    fn test_delay_capped() {
        assert_eq!(flat(1000, 2000, 10.0).delay_for_attempt(3).as_millis(), 2000);
    }

    #[test]
    fn test_jitter_stays_in_band() {
        let config = RetryConfig { jitter: true, ..flat(400, 10_000, 1.0) };
        for _ in 0..50 {
            let ms = config.delay_for_attempt(0).as_millis();
            assert!((300..=500).contains(&ms), "{ms}");
        }
    }
}
