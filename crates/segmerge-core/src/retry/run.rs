//! Retry loop: run a closure until success or policy says stop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use super::classify;
use super::policy::{RetryDecision, RetryPolicy};
use crate::fetch::FetchError;

const CANCEL_POLL: Duration = Duration::from_millis(50);

/// Runs a closure until it succeeds or the retry policy says to stop.
/// On retryable failure, sleeps for the backoff duration then tries again.
/// When `cancel` is raised the backoff sleep ends early and no further attempt is made.
pub fn run_with_retry<T, F>(
    policy: &RetryPolicy,
    cancel: Option<&AtomicBool>,
    mut f: F,
) -> Result<T, FetchError>
where
    F: FnMut() -> Result<T, FetchError>,
{
    let mut attempt = 1u32;
    loop {
        match f() {
            Ok(v) => return Ok(v),
            Err(e) => {
                let kind = classify::classify(&e);
                match policy.decide(attempt, kind) {
                    RetryDecision::NoRetry => return Err(e),
                    RetryDecision::RetryAfter(d) => {
                        tracing::debug!(attempt, ?kind, delay_ms = d.as_millis() as u64, "retrying: {}", e);
                        if !sleep_unless_cancelled(d, cancel) {
                            return Err(e);
                        }
                        attempt += 1;
                    }
                }
            }
        }
    }
}

/// Returns false if `cancel` was raised before `d` elapsed.
fn sleep_unless_cancelled(d: Duration, cancel: Option<&AtomicBool>) -> bool {
    let Some(cancel) = cancel else {
        std::thread::sleep(d);
        return true;
    };
    let deadline = Instant::now() + d;
    loop {
        if cancel.load(Ordering::Relaxed) {
            return false;
        }
        let now = Instant::now();
        if now >= deadline {
            return true;
        }
        std::thread::sleep(CANCEL_POLL.min(deadline - now));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(2),
        }
    }

    #[test]
    fn retries_transient_then_succeeds() {
        let mut calls = 0;
        let res = run_with_retry(&fast_policy(3), None, || {
            calls += 1;
            if calls < 3 {
                Err(FetchError::HttpStatus(503))
            } else {
                Ok(calls)
            }
        });
        assert_eq!(res.unwrap(), 3);
    }

    #[test]
    fn gives_up_after_max_attempts() {
        let mut calls = 0;
        let res: Result<(), _> = run_with_retry(&fast_policy(2), None, || {
            calls += 1;
            Err(FetchError::Timeout)
        });
        assert!(matches!(res, Err(FetchError::Timeout)));
        assert_eq!(calls, 2);
    }

    #[test]
    fn does_not_retry_client_errors() {
        let mut calls = 0;
        let res: Result<(), _> = run_with_retry(&fast_policy(5), None, || {
            calls += 1;
            Err(FetchError::HttpStatus(404))
        });
        assert!(matches!(res, Err(FetchError::HttpStatus(404))));
        assert_eq!(calls, 1);
    }

    #[test]
    fn cancel_stops_backoff() {
        let cancel = AtomicBool::new(true);
        let policy = RetryPolicy {
            max_attempts: 5,
            base_delay: Duration::from_secs(30),
            max_delay: Duration::from_secs(30),
        };
        let start = Instant::now();
        let mut calls = 0;
        let res: Result<(), _> = run_with_retry(&policy, Some(&cancel), || {
            calls += 1;
            Err(FetchError::Timeout)
        });
        assert!(res.is_err());
        assert_eq!(calls, 1);
        assert!(start.elapsed() < Duration::from_secs(5));
    }
}
