//! The retry envelope shared between this adapter and the wider host
//! (spec §4.5 "Retry envelope").

use crate::error::AdapterError;
use crate::error::Result;
use std::future::Future;
use std::time::Duration;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub retry_all_errors: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(10),
            retry_all_errors: false,
        }
    }
}

impl RetryPolicy {
    fn should_retry(&self, err: &AdapterError) -> bool {
        self.retry_all_errors || err.is_retryable()
    }

    /// `min(maxDelay, baseDelay * 2^attempt)`, unless the error carries a
    /// server-provided retry hint, in which case that wins.
    fn delay_for(&self, err: &AdapterError, attempt: u32) -> Duration {
        if let Some(delay) = header_delay(err) {
            return delay;
        }
        let factor = 2u32.saturating_pow(attempt.min(20));
        let backoff = self.base_delay.saturating_mul(factor);
        backoff.min(self.max_delay)
    }
}

/// Parses `retry-after` / `x-ratelimit-reset` / `ratelimit-reset` off a
/// transient error. A value greater than the current Unix time (in
/// seconds) is treated as an absolute timestamp; otherwise it's a
/// delta in seconds.
fn header_delay(err: &AdapterError) -> Option<Duration> {
    let AdapterError::Transient { retry_after, ratelimit_reset, .. } = err else {
        return None;
    };
    let raw = retry_after.as_deref().or(ratelimit_reset.as_deref())?;
    let value: i64 = raw.trim().parse().ok()?;
    let now_secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64;

    let delay_ms = if value > now_secs {
        (value - now_secs) * 1000
    } else {
        value * 1000
    };
    Some(Duration::from_millis(delay_ms.max(0) as u64))
}

/// Invoked before each retry sleep; callback errors are logged and
/// swallowed rather than propagated (spec §4.5).
pub type OnRetryAttempt<'a> = dyn Fn(u32, u32, Duration, &AdapterError) + 'a;

/// Runs `f` under the retry policy, re-invoking it from scratch on each
/// retryable failure. `f` is an async closure producing a fresh attempt
/// each call — for this adapter that means re-running the entire
/// `create_message` flow, matching spec §4.5's note that the wrapper
/// re-enters the whole operation from attempt zero.
pub async fn with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    on_attempt: Option<&OnRetryAttempt<'_>>,
    mut f: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 0u32;
    loop {
        match f().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if attempt >= policy.max_retries || !policy.should_retry(&err) {
                    return Err(err);
                }
                let delay = policy.delay_for(&err, attempt);
                if let Some(cb) = on_attempt {
                    let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                        cb(attempt + 1, policy.max_retries, delay, &err)
                    }));
                    if let Err(panic) = outcome {
                        let payload = panic
                            .downcast_ref::<&str>()
                            .map(|s| s.to_string())
                            .or_else(|| panic.downcast_ref::<String>().cloned())
                            .unwrap_or_else(|| "non-string panic payload".to_string());
                        tracing::warn!(panic = %payload, "onRetryAttempt callback panicked; swallowing");
                    }
                }
                tracing::debug!(attempt = attempt + 1, delay_ms = delay.as_millis() as u64, "retrying after transient error");
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transient(status: u16) -> AdapterError {
        AdapterError::Transient {
            status: Some(status),
            message: String::new(),
            retry_after: None,
            ratelimit_reset: None,
        }
    }

    #[test]
    fn exponential_backoff_doubles_and_caps() {
        let policy = RetryPolicy::default();
        let err = transient(503);
        assert_eq!(policy.delay_for(&err, 0), Duration::from_secs(1));
        assert_eq!(policy.delay_for(&err, 1), Duration::from_secs(2));
        assert_eq!(policy.delay_for(&err, 2), Duration::from_secs(4));
        assert_eq!(policy.delay_for(&err, 10), policy.max_delay);
    }

    #[test]
    fn retry_after_delta_seconds() {
        let err = AdapterError::Transient {
            status: Some(429),
            message: String::new(),
            retry_after: Some("3".to_string()),
            ratelimit_reset: None,
        };
        assert_eq!(header_delay(&err), Some(Duration::from_millis(3000)));
    }

    #[test]
    fn retry_after_unix_timestamp() {
        let now_secs = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs() as i64;
        let err = AdapterError::Transient {
            status: Some(429),
            message: String::new(),
            retry_after: Some((now_secs + 30).to_string()),
            ratelimit_reset: None,
        };
        let delay = header_delay(&err).unwrap();
        // Allow a little slack for the wall-clock tick between computing
        // now_secs here and inside header_delay.
        assert!(delay.as_millis() >= 28_000 && delay.as_millis() <= 31_000);
    }

    #[tokio::test(start_paused = true)]
    async fn retries_up_to_max_then_raises() {
        let policy = RetryPolicy {
            max_retries: 2,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(5),
            retry_all_errors: false,
        };
        let mut attempts = 0;
        let result: Result<()> = with_retry(&policy, None, || {
            attempts += 1;
            async { Err(transient(503)) }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(attempts, 3); // initial + 2 retries
    }

    #[tokio::test(start_paused = true)]
    async fn non_retryable_error_does_not_retry() {
        let policy = RetryPolicy::default();
        let mut attempts = 0;
        let result: Result<()> = with_retry(&policy, None, || {
            attempts += 1;
            async { Err(AdapterError::ContextOverflow { message: "too long".to_string() }) }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(attempts, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn on_attempt_callback_observes_every_retry() {
        let policy = RetryPolicy {
            max_retries: 2,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(5),
            retry_all_errors: false,
        };
        let seen = std::cell::RefCell::new(Vec::new());
        let on_attempt = |attempt: u32, max: u32, _delay: Duration, _err: &AdapterError| {
            seen.borrow_mut().push((attempt, max));
        };
        let mut attempts = 0;
        let result: Result<()> = with_retry(&policy, Some(&on_attempt), || {
            attempts += 1;
            async { Err(transient(503)) }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(*seen.borrow(), vec![(1, 2), (2, 2)]);
    }

    #[tokio::test(start_paused = true)]
    async fn on_attempt_callback_panic_is_swallowed_and_retry_continues() {
        let policy = RetryPolicy {
            max_retries: 2,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(5),
            retry_all_errors: false,
        };
        let on_attempt = |_attempt: u32, _max: u32, _delay: Duration, _err: &AdapterError| {
            panic!("host callback blew up");
        };
        let mut attempts = 0;
        let result: Result<()> = with_retry(&policy, Some(&on_attempt), || {
            attempts += 1;
            async { Err(transient(503)) }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(attempts, 3); // initial + 2 retries, despite the callback panicking each time
    }
}
