//! Bounded exponential backoff for remote calls.
//!
//! Only failures the boundary classified as retryable are re-attempted;
//! retries are exhausted silently into the final classified error.

use crate::error::GitResult;
use std::future::Future;
use std::time::Duration;

/// Retry policy for remote-API calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the initial attempt
    pub max_retries: u32,
    /// Base backoff, doubled per attempt
    pub base_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_backoff: Duration::from_millis(100),
        }
    }
}

impl RetryPolicy {
    /// Create a policy with the given bounds.
    pub fn new(max_retries: u32, base_backoff: Duration) -> Self {
        Self {
            max_retries,
            base_backoff,
        }
    }

    /// Calculate exponential backoff duration for an attempt.
    fn backoff(&self, attempt: u32) -> Duration {
        self.base_backoff * 2u32.saturating_pow(attempt)
    }

    /// Run `operation`, re-attempting on retryable classified failures.
    ///
    /// The caller sees a single terminal result; intermediate failures are
    /// logged only.
    pub async fn run<T, F, Fut>(&self, operation: F) -> GitResult<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = GitResult<T>>,
    {
        let mut attempt = 0u32;

        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(err) if err.retryable && attempt < self.max_retries => {
                    let delay = self.backoff(attempt);
                    attempt += 1;
                    tracing::warn!(
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "Retrying remote call after transient failure"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ClassifiedError, ErrorKind};
    use std::sync::atomic::{AtomicU32, Ordering};

    fn policy() -> RetryPolicy {
        RetryPolicy::new(2, Duration::from_millis(1))
    }

    #[tokio::test]
    async fn test_success_needs_no_retry() {
        let calls = AtomicU32::new(0);

        let result: GitResult<u32> = policy()
            .run(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok(7) }
            })
            .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retryable_failures_are_reattempted() {
        let calls = AtomicU32::new(0);

        let result: GitResult<u32> = policy()
            .run(|| {
                let attempt = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if attempt < 2 {
                        Err(ClassifiedError::new(
                            ErrorKind::RepositoryCreationFailed,
                            "rate limited",
                        )
                        .retryable(true))
                    } else {
                        Ok(42)
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_non_retryable_failure_is_terminal() {
        let calls = AtomicU32::new(0);

        let result: GitResult<u32> = policy()
            .run(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                async {
                    Err(ClassifiedError::new(
                        ErrorKind::RepositoryCreationFailed,
                        "name already exists",
                    ))
                }
            })
            .await;

        assert!(!result.unwrap_err().retryable);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_exhaustion_surfaces_final_error_only() {
        let calls = AtomicU32::new(0);

        let result: GitResult<u32> = policy()
            .run(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                async {
                    Err(ClassifiedError::new(
                        ErrorKind::RepositoryCreationFailed,
                        "server error",
                    )
                    .retryable(true))
                }
            })
            .await;

        let err = result.unwrap_err();
        assert_eq!(err.kind, ErrorKind::RepositoryCreationFailed);
        // Initial attempt plus two retries
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_backoff_doubles_per_attempt() {
        let policy = RetryPolicy::new(2, Duration::from_millis(100));
        assert_eq!(policy.backoff(0), Duration::from_millis(100));
        assert_eq!(policy.backoff(1), Duration::from_millis(200));
        assert_eq!(policy.backoff(2), Duration::from_millis(400));
    }
}
