//! Retry policy with exponential backoff and jitter
//!
//! The policy is an explicit object rather than a wrapper baked into the
//! HTTP call, so it can be inspected and tested without any network.

use crate::GenerationError;
use rand::Rng;
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::warn;

/// Default maximum number of attempts (first call plus retries)
pub const DEFAULT_MAX_ATTEMPTS: u32 = 4;

/// Default base delay before the first retry
pub const DEFAULT_BASE_DELAY_MS: u64 = 500;

/// Default cap on a single backoff delay
pub const DEFAULT_MAX_DELAY_MS: u64 = 10_000;

/// Default jitter fraction applied to each delay
pub const DEFAULT_JITTER: f64 = 0.25;

/// Default bound on total elapsed time across all attempts
pub const DEFAULT_TOTAL_DEADLINE_SECS: u64 = 120;

/// Bounded retry policy for transient generation failures.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Maximum attempts, including the initial call
    pub max_attempts: u32,
    /// Delay before the first retry; doubles on each subsequent retry
    pub base_delay: Duration,
    /// Cap on any single delay
    pub max_delay: Duration,
    /// Jitter fraction in [0, 1]; each delay is scaled by a random factor
    /// in [1 - jitter, 1 + jitter]
    pub jitter: f64,
    /// Upper bound on total elapsed time, covering all attempts and sleeps
    pub total_deadline: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: Duration::from_millis(DEFAULT_BASE_DELAY_MS),
            max_delay: Duration::from_millis(DEFAULT_MAX_DELAY_MS),
            jitter: DEFAULT_JITTER,
            total_deadline: Duration::from_secs(DEFAULT_TOTAL_DEADLINE_SECS),
        }
    }
}

impl RetryPolicy {
    /// Validate the policy, rejecting out-of-range values.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_attempts == 0 {
            return Err("max_attempts must be at least 1".to_string());
        }
        if !(0.0..=1.0).contains(&self.jitter) {
            return Err(format!("jitter {} out of range [0, 1]", self.jitter));
        }
        if self.base_delay > self.max_delay {
            return Err("base_delay cannot exceed max_delay".to_string());
        }
        if self.total_deadline.is_zero() {
            return Err("total_deadline must be greater than 0".to_string());
        }
        Ok(())
    }

    /// Delay before the retry following the given attempt (1-based).
    ///
    /// Exponential growth from `base_delay`, capped at `max_delay`, then
    /// scaled by a random jitter factor.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exp = self
            .base_delay
            .saturating_mul(2u32.saturating_pow(attempt.saturating_sub(1)))
            .min(self.max_delay);

        if self.jitter == 0.0 {
            return exp;
        }

        let factor = rand::thread_rng().gen_range(1.0 - self.jitter..=1.0 + self.jitter);
        exp.mul_f64(factor).min(self.max_delay.mul_f64(1.0 + self.jitter))
    }
}

/// Drive an operation under the policy, retrying the retryable subset of
/// `GenerationError` with backoff.
///
/// Non-retryable errors propagate immediately. Exhausting the attempt
/// count or the total deadline yields `RetriesExhausted` carrying the last
/// underlying diagnostic. A backend-provided Retry-After hint overrides
/// the computed delay, still capped by `max_delay`.
pub async fn run_with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    mut op: F,
) -> Result<T, GenerationError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, GenerationError>>,
{
    policy.validate().map_err(GenerationError::Config)?;

    let started = Instant::now();
    let mut attempts = 0;
    let mut last_error = String::new();

    while attempts < policy.max_attempts {
        attempts += 1;
        match op(attempts).await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_retryable() => {
                last_error = e.to_string();
                if attempts == policy.max_attempts {
                    break;
                }

                let delay = e
                    .retry_after()
                    .unwrap_or_else(|| policy.delay_for(attempts))
                    .min(policy.max_delay);

                if started.elapsed() + delay >= policy.total_deadline {
                    warn!(
                        "Total deadline would be exceeded after attempt {}; giving up",
                        attempts
                    );
                    break;
                }

                warn!(
                    "Generation attempt {}/{} failed ({}); retrying in {:?}",
                    attempts, policy.max_attempts, last_error, delay
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }

    Err(GenerationError::RetriesExhausted {
        attempts,
        last_error,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(4),
            jitter: 0.0,
            total_deadline: Duration::from_secs(5),
        }
    }

    #[test]
    fn test_default_policy_is_valid() {
        assert!(RetryPolicy::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_policies_rejected() {
        let mut policy = RetryPolicy::default();
        policy.max_attempts = 0;
        assert!(policy.validate().is_err());

        let mut policy = RetryPolicy::default();
        policy.jitter = 1.5;
        assert!(policy.validate().is_err());

        let mut policy = RetryPolicy::default();
        policy.base_delay = policy.max_delay + Duration::from_millis(1);
        assert!(policy.validate().is_err());
    }

    #[test]
    fn test_delay_grows_exponentially_without_jitter() {
        let policy = RetryPolicy {
            jitter: 0.0,
            ..RetryPolicy::default()
        };
        assert_eq!(policy.delay_for(1), Duration::from_millis(500));
        assert_eq!(policy.delay_for(2), Duration::from_millis(1000));
        assert_eq!(policy.delay_for(3), Duration::from_millis(2000));
        // Capped at max_delay
        assert_eq!(policy.delay_for(10), Duration::from_millis(10_000));
    }

    #[test]
    fn test_jittered_delay_stays_in_bounds() {
        let policy = RetryPolicy {
            jitter: 0.5,
            ..RetryPolicy::default()
        };
        for _ in 0..100 {
            let delay = policy.delay_for(2);
            assert!(delay >= Duration::from_millis(500));
            assert!(delay <= Duration::from_millis(1500));
        }
    }

    #[tokio::test]
    async fn test_succeeds_when_failures_below_attempt_budget() {
        let calls = AtomicU32::new(0);
        let result = run_with_retry(&fast_policy(4), |_| {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(GenerationError::Unavailable("flaky".to_string()))
                } else {
                    Ok("done".to_string())
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), "done");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_exhausts_attempts_and_reports_last_error() {
        let calls = AtomicU32::new(0);
        let result: Result<String, _> = run_with_retry(&fast_policy(3), |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(GenerationError::Unavailable("still down".to_string())) }
        })
        .await;

        // Exactly max_attempts calls, no more
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        match result {
            Err(GenerationError::RetriesExhausted {
                attempts,
                last_error,
            }) => {
                assert_eq!(attempts, 3);
                assert!(last_error.contains("still down"));
            }
            other => panic!("Expected RetriesExhausted, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_non_retryable_error_short_circuits() {
        let calls = AtomicU32::new(0);
        let result: Result<String, _> = run_with_retry(&fast_policy(4), |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(GenerationError::Auth("invalid key".to_string())) }
        })
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(result, Err(GenerationError::Auth(_))));
    }

    #[tokio::test]
    async fn test_deadline_stops_retries_early() {
        let policy = RetryPolicy {
            max_attempts: 10,
            base_delay: Duration::from_millis(50),
            max_delay: Duration::from_millis(50),
            jitter: 0.0,
            total_deadline: Duration::from_millis(1),
        };

        let calls = AtomicU32::new(0);
        let result: Result<String, _> = run_with_retry(&policy, |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(GenerationError::Unavailable("slow outage".to_string())) }
        })
        .await;

        // First attempt runs, but no sleep fits inside the deadline
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(
            result,
            Err(GenerationError::RetriesExhausted { attempts: 1, .. })
        ));
    }

    #[tokio::test]
    async fn test_invalid_policy_fails_fast() {
        let mut policy = fast_policy(1);
        policy.jitter = 2.0;

        let result: Result<String, _> =
            run_with_retry(&policy, |_| async { Ok("unreached".to_string()) }).await;
        assert!(matches!(result, Err(GenerationError::Config(_))));
    }
}
