//! Retry and backoff policy.
//!
//! Classifies fetch failures (timeouts, throttling, connection failures) and
//! decides exponential backoff so the playlist fetch and the segment workers
//! share one policy.

mod classify;
mod policy;
mod run;

pub use classify::{classify, classify_curl_error, classify_http_status};
pub use policy::{ErrorKind, RetryDecision, RetryPolicy};
pub use run::run_with_retry;
