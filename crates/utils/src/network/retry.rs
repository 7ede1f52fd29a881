use std::time::Duration;
use tokio::time::sleep;

/// Configuration for retry behavior
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Total number of attempts, including the first one
    pub max_attempts: u32,
    /// Pause between attempts
    pub delay: Duration,
}

impl RetryConfig {
    /// One extra attempt after a fixed pause
    pub fn once_after(delay: Duration) -> Self {
        Self {
            max_attempts: 2,
            delay,
        }
    }
}

/// Run `operation` until it succeeds, `should_retry` rejects the error, or the
/// attempts are exhausted. The last error is returned unchanged.
pub async fn retry_async<F, Fut, T, E, P>(
    config: &RetryConfig,
    should_retry: P,
    mut operation: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
    E: std::fmt::Display,
    P: Fn(&E) -> bool,
{
    let mut attempt = 0;

    loop {
        attempt += 1;

        match operation().await {
            Ok(result) => return Ok(result),
            Err(err) => {
                if attempt >= config.max_attempts || !should_retry(&err) {
                    return Err(err);
                }

                tracing::warn!(
                    attempt,
                    max_attempts = config.max_attempts,
                    delay_ms = config.delay.as_millis() as u64,
                    "attempt failed: {err}; retrying"
                );

                sleep(config.delay).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_once_after_retries_exactly_once() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = calls.clone();
        let start = tokio::time::Instant::now();

        let result: Result<(), String> = retry_async(
            &RetryConfig::once_after(Duration::from_millis(500)),
            |_| true,
            || {
                let c = c.clone();
                async move {
                    c.fetch_add(1, Ordering::SeqCst);
                    Err("boom".to_string())
                }
            },
        )
        .await;

        assert_eq!(result.unwrap_err(), "boom");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(start.elapsed() >= Duration::from_millis(500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_attempt_success_is_returned() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = calls.clone();

        let result: Result<u32, String> = retry_async(
            &RetryConfig::once_after(Duration::from_millis(500)),
            |_| true,
            || {
                let c = c.clone();
                async move {
                    let n = c.fetch_add(1, Ordering::SeqCst);
                    if n == 0 {
                        Err("transient".to_string())
                    } else {
                        Ok(n)
                    }
                }
            },
        )
        .await;

        assert_eq!(result.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_non_retryable_error_stops_immediately() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = calls.clone();

        let config = RetryConfig {
            max_attempts: 5,
            delay: Duration::from_millis(100),
        };
        let _: Result<(), String> = retry_async(&config, |_| false, || {
            let c = c.clone();
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err("fatal".to_string())
            }
        })
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_is_fixed_between_attempts() {
        let start = tokio::time::Instant::now();
        let config = RetryConfig {
            max_attempts: 3,
            delay: Duration::from_millis(200),
        };

        let result: Result<(), String> =
            retry_async(&config, |_| true, || async { Err("down".to_string()) }).await;

        assert_eq!(result.unwrap_err(), "down");
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(400));
        assert!(elapsed < Duration::from_millis(600));
    }
}
