//! Retry logic with a fixed delay
//!
//! Every "fetch with retry" operation goes through [`retry_fixed`]: a fixed number
//! of attempts, a constant pause between them, and no distinction between kinds of
//! failure. The pause is skipped after the last attempt and is cut short when the
//! cancellation token fires.
//!
//! # Example
//!
//! ```no_run
//! use playlist_relay::retry::{RetryPolicy, retry_fixed};
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() {
//! let policy = RetryPolicy::new(3, Duration::from_secs(5));
//! let cancel = CancellationToken::new();
//! let result = retry_fixed(&policy, &cancel, |attempt| async move {
//!     if attempt < 2 { Err("not yet") } else { Ok(attempt) }
//! })
//! .await;
//! assert_eq!(result.ok(), Some(2));
//! # }
//! ```

use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Attempts and delay for a retried operation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first (at least 1)
    pub max_attempts: u32,
    /// Pause between consecutive attempts
    pub delay: Duration,
}

impl RetryPolicy {
    /// Create a policy; `max_attempts` is clamped to at least one attempt
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }
}

/// Final failure of a retried operation
#[derive(Debug)]
pub struct RetryError<E> {
    /// Attempts that were actually made
    pub attempts: u32,
    /// Error of the last attempt
    pub last_error: E,
    /// Whether the retry loop ended early because of cancellation
    pub cancelled: bool,
}

/// Execute an async operation, retrying every failure after a fixed delay
///
/// The closure receives the zero-based attempt number. Returns the first success,
/// or a [`RetryError`] holding the last failure once the attempts are used up or
/// the token is cancelled during a pause.
pub async fn retry_fixed<F, Fut, T, E>(
    policy: &RetryPolicy,
    cancel: &CancellationToken,
    mut operation: F,
) -> Result<T, RetryError<E>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        match operation(attempt).await {
            Ok(result) => {
                if attempt > 0 {
                    tracing::info!(attempts = attempt + 1, "Operation succeeded after retry");
                }
                return Ok(result);
            }
            Err(e) => {
                attempt += 1;

                if attempt >= max_attempts {
                    tracing::error!(
                        error = %e,
                        attempts = attempt,
                        "Operation failed after all retry attempts exhausted"
                    );
                    return Err(RetryError {
                        attempts: attempt,
                        last_error: e,
                        cancelled: false,
                    });
                }

                tracing::warn!(
                    error = %e,
                    attempt,
                    max_attempts,
                    delay_ms = policy.delay.as_millis(),
                    "Attempt failed, retrying"
                );

                tokio::select! {
                    _ = tokio::time::sleep(policy.delay) => {}
                    _ = cancel.cancelled() => {
                        tracing::info!(attempts = attempt, "Retry loop cancelled");
                        return Err(RetryError {
                            attempts: attempt,
                            last_error: e,
                            cancelled: true,
                        });
                    }
                }
            }
        }
    }
}
