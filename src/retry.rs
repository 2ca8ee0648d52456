//! Retry-until-success for eventually consistent API calls.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tracing::warn;

/// How long and how often to retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Give up once this much time has passed since the first attempt.
    pub timeout: Duration,
    /// Delay before the first retry; doubled after each attempt.
    pub initial_delay: Duration,
    /// Upper bound for the delay between attempts.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(120),
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    pub fn new(timeout: Duration, initial_delay: Duration, max_delay: Duration) -> Self {
        Self {
            timeout,
            initial_delay,
            max_delay,
        }
    }
}

/// Run `op` until it succeeds, fails with an error `retryable` rejects, or
/// the policy's timeout would be exceeded by the next wait.
///
/// The last error is returned when retries run out.
pub async fn retry_until_success<T, E, F, Fut, R>(
    policy: &RetryPolicy,
    operation: &str,
    mut op: F,
    retryable: R,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    R: Fn(&E) -> bool,
    E: Display,
{
    let started = Instant::now();
    let mut delay = policy.initial_delay;
    let mut attempt: u32 = 1;

    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if retryable(&err) && started.elapsed() + delay <= policy.timeout => {
                warn!(
                    operation,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "Operation failed, retrying"
                );
                tokio::time::sleep(delay).await;
                delay = (delay * 2).min(policy.max_delay);
                attempt += 1;
            },
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast() -> RetryPolicy {
        RetryPolicy::new(
            Duration::from_secs(5),
            Duration::from_millis(1),
            Duration::from_millis(4),
        )
    }

    #[tokio::test]
    async fn test_succeeds_after_transient_failures() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let result: Result<&str, String> = retry_until_success(
            &fast(),
            "test",
            move || async move {
                if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err("not yet".to_string())
                } else {
                    Ok("done")
                }
            },
            |_| true,
        )
        .await;

        assert_eq!(result, Ok("done"));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_non_retryable_error_returns_immediately() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let result: Result<(), String> = retry_until_success(
            &fast(),
            "test",
            move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err("fatal".to_string())
            },
            |e: &String| e != "fatal",
        )
        .await;

        assert_eq!(result, Err("fatal".to_string()));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_gives_up_after_timeout() {
        let policy = RetryPolicy::new(
            Duration::from_millis(20),
            Duration::from_millis(5),
            Duration::from_millis(5),
        );
        let result: Result<(), String> = tokio_test::block_on(retry_until_success(
            &policy,
            "test",
            || async { Err("still failing".to_string()) },
            |_| true,
        ));

        assert_eq!(result, Err("still failing".to_string()));
    }

    #[test]
    fn test_default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.timeout, Duration::from_secs(120));
        assert!(policy.initial_delay <= policy.max_delay);
    }
}
