//! Bounded exponential-backoff retry loop
//!
//! Loops a request-issuing operation until it succeeds, the retry budget is
//! spent, or a non-retryable failure is raised. Originally after the backoff
//! recipe in the OpenAI cookbook's rate-limit guide.

use super::policy::RetryPolicy;
use crate::api::{ApiError, FailureKind, ERROR_CODES_DOCS};
use std::time::Duration;
use tracing::{debug, warn};

/// Terminal outcomes of the retry loop.
#[derive(Debug, thiserror::Error)]
pub enum RetryError {
    /// The service refused the request; retrying cannot help.
    #[error("Error status {status} raised by OpenAI API: {message}")]
    Rejected { status: u16, message: String },

    /// Transient failures persisted past the retry budget.
    #[error("Maximum number of retries ({max_retries}) exceeded.")]
    Exhausted { max_retries: usize },

    /// A recognized API failure with no finer category.
    #[error("General {0} error raised by OpenAI. {ERROR_CODES_DOCS}")]
    General(String),

    /// A failure outside the API family, passed through unchanged.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Run `op` under `policy`, blocking the calling thread between attempts.
///
/// The operation is any no-argument closure representing a single request
/// attempt; bind its arguments at the call site. Classification happens
/// once per failure, at this boundary:
///
/// - transient failures (timeout, connection, pending fine-tune) are
///   retried with exponentially growing waits until the budget is spent;
/// - rejections (error status, response validation) fail immediately with
///   the status code and the service's own message when it sent one;
/// - other API-family failures fail immediately, wrapped with a pointer to
///   the error-codes documentation;
/// - anything else propagates unchanged.
pub fn retry_with_backoff<T, F>(policy: &RetryPolicy, op: F) -> Result<T, RetryError>
where
    F: FnMut() -> Result<T, ApiError>,
{
    retry_with_backoff_using(policy, op, |d| std::thread::sleep(d))
}

/// [`retry_with_backoff`] with an injectable sleep, the seam tests use to
/// observe waits without spending wall-clock time.
pub fn retry_with_backoff_using<T, F, S>(
    policy: &RetryPolicy,
    mut op: F,
    mut sleep: S,
) -> Result<T, RetryError>
where
    F: FnMut() -> Result<T, ApiError>,
    S: FnMut(Duration),
{
    let max_retries = policy.max_retries();
    let mut num_retries = 0usize;
    let mut delay = policy.initial_delay_secs;
    debug!(max_retries, "retry budget computed");

    loop {
        let err = match op() {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        match err.kind() {
            FailureKind::Rejected => {
                // rejection() is Some for every Rejected-classified variant
                let (status, message) = err
                    .rejection()
                    .unwrap_or((0, ERROR_CODES_DOCS.to_string()));
                return Err(RetryError::Rejected { status, message });
            }
            FailureKind::Transient => {
                num_retries += 1;
                if num_retries > max_retries {
                    return Err(RetryError::Exhausted { max_retries });
                }
                let jitter = if policy.jitter {
                    1.0 + rand::random::<f64>()
                } else {
                    1.0
                };
                delay *= f64::from(policy.exponential_base) * jitter;
                warn!(
                    retry = num_retries,
                    max_retries,
                    delay_secs = delay,
                    "transient failure: {err}, backing off"
                );
                sleep(Duration::from_secs_f64(delay));
            }
            FailureKind::Generic => return Err(RetryError::General(err.to_string())),
            FailureKind::Other => {
                // kind() maps only ApiError::Other here
                let ApiError::Other(inner) = err else {
                    unreachable!("FailureKind::Other from a non-Other variant")
                };
                return Err(RetryError::Other(inner));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::RefCell;

    fn no_sleep(_: Duration) {}

    #[test]
    fn test_success_returns_immediately() {
        let policy = RetryPolicy::default();
        let mut calls = 0;
        let result = retry_with_backoff_using(
            &policy,
            || {
                calls += 1;
                Ok::<_, ApiError>(42)
            },
            |_| panic!("must not sleep on success"),
        );
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_transient_then_success() {
        let policy = RetryPolicy::default();
        let waits = RefCell::new(Vec::new());
        let mut calls = 0;

        let result = retry_with_backoff_using(
            &policy,
            || {
                calls += 1;
                if calls <= 3 {
                    Err(ApiError::Timeout("deadline".into()))
                } else {
                    Ok("ok")
                }
            },
            |d| waits.borrow_mut().push(d),
        );

        assert_eq!(result.unwrap(), "ok");
        assert_eq!(calls, 4);

        // exactly one wait per transient failure, strictly increasing by
        // at least the exponential base when jitter is off
        let waits = waits.into_inner();
        assert_eq!(waits.len(), 3);
        for pair in waits.windows(2) {
            let ratio = pair[1].as_secs_f64() / pair[0].as_secs_f64();
            assert!(ratio >= 2.0, "ratio {ratio} below exponential base");
        }
        assert_eq!(waits[0], Duration::from_secs_f64(2.0));
    }

    #[test]
    fn test_exhaustion_after_budget() {
        let policy = RetryPolicy::default();
        let max_retries = policy.max_retries();
        let mut attempts = 0;

        let result: Result<(), _> = retry_with_backoff_using(
            &policy,
            || {
                attempts += 1;
                Err(ApiError::Connection("refused".into()))
            },
            no_sleep,
        );

        match result.unwrap_err() {
            RetryError::Exhausted { max_retries: m } => assert_eq!(m, max_retries),
            other => panic!("expected Exhausted, got {other:?}"),
        }
        assert_eq!(attempts, max_retries + 1);
    }

    #[test]
    fn test_rejection_fails_without_waiting() {
        let policy = RetryPolicy::default();
        let mut attempts = 0;

        let result: Result<(), _> = retry_with_backoff_using(
            &policy,
            || {
                attempts += 1;
                Err(ApiError::Status {
                    status: 429,
                    body: Some(json!({"message": "Rate limit reached"})),
                })
            },
            |_| panic!("rejections must not wait"),
        );

        match result.unwrap_err() {
            RetryError::Rejected { status, message } => {
                assert_eq!(status, 429);
                assert_eq!(message, "Rate limit reached");
            }
            other => panic!("expected Rejected, got {other:?}"),
        }
        assert_eq!(attempts, 1);
    }

    #[test]
    fn test_rejection_message_falls_back_to_docs() {
        let policy = RetryPolicy::default();
        let result: Result<(), _> = retry_with_backoff_using(
            &policy,
            || {
                Err(ApiError::Status {
                    status: 500,
                    body: None,
                })
            },
            no_sleep,
        );
        match result.unwrap_err() {
            RetryError::Rejected { message, .. } => assert_eq!(message, ERROR_CODES_DOCS),
            other => panic!("expected Rejected, got {other:?}"),
        }
    }

    #[test]
    fn test_generic_api_error_is_wrapped() {
        let policy = RetryPolicy::default();
        let result: Result<(), _> = retry_with_backoff_using(
            &policy,
            || Err(ApiError::Api("InvalidRequestError".into())),
            no_sleep,
        );
        let err = result.unwrap_err();
        assert!(matches!(err, RetryError::General(_)));
        assert!(err.to_string().contains("InvalidRequestError"));
        assert!(err.to_string().contains("error-codes"));
    }

    #[test]
    fn test_unrecognized_error_passes_through() {
        let policy = RetryPolicy::default();
        let result: Result<(), _> = retry_with_backoff_using(
            &policy,
            || Err(ApiError::Other(anyhow::anyhow!("disk full"))),
            no_sleep,
        );
        match result.unwrap_err() {
            RetryError::Other(inner) => assert_eq!(inner.to_string(), "disk full"),
            other => panic!("expected passthrough, got {other:?}"),
        }
    }

    #[test]
    fn test_pending_fine_tune_is_retried() {
        let policy = RetryPolicy::default();
        let mut calls = 0;
        let result = retry_with_backoff_using(
            &policy,
            || {
                calls += 1;
                if calls == 1 {
                    Err(ApiError::PendingFineTune("ft-job-1".into()))
                } else {
                    Ok("succeeded")
                }
            },
            no_sleep,
        );
        assert_eq!(result.unwrap(), "succeeded");
        assert_eq!(calls, 2);
    }

    #[test]
    fn test_jitter_keeps_delays_growing() {
        let policy = RetryPolicy {
            jitter: true,
            ..RetryPolicy::default()
        };
        let waits = RefCell::new(Vec::new());
        let mut calls = 0;

        let _ = retry_with_backoff_using(
            &policy,
            || -> Result<(), _> {
                calls += 1;
                if calls <= 4 {
                    Err(ApiError::Timeout("deadline".into()))
                } else {
                    Ok(())
                }
            },
            |d| waits.borrow_mut().push(d),
        );

        // jitter factor is in [1, 2), so each delay still grows by at
        // least the exponential base
        let waits = waits.into_inner();
        for pair in waits.windows(2) {
            assert!(pair[1].as_secs_f64() / pair[0].as_secs_f64() >= 2.0);
        }
    }
}
