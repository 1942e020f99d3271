//! Single HTTP GET of a playlist or segment.
//!
//! Uses the curl crate (libcurl). Runs in the current thread; call from
//! `spawn_blocking` if used from async code. No retries here: callers wrap
//! this in `retry::run_with_retry`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use thiserror::Error;

/// Per-request settings.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Whole-transfer timeout.
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub user_agent: Option<String>,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
            connect_timeout: Duration::from_secs(30),
            user_agent: None,
        }
    }
}

/// Why a GET did not produce a body.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request timed out")]
    Timeout,
    #[error("network error: {0}")]
    Network(#[source] curl::Error),
    #[error("HTTP {0}")]
    HttpStatus(u32),
    #[error("cancelled")]
    Cancelled,
}

impl FetchError {
    fn from_curl(e: curl::Error) -> Self {
        if e.is_operation_timedout() {
            FetchError::Timeout
        } else if e.is_aborted_by_callback() {
            FetchError::Cancelled
        } else {
            FetchError::Network(e)
        }
    }
}

impl From<curl::Error> for FetchError {
    fn from(e: curl::Error) -> Self {
        FetchError::from_curl(e)
    }
}

/// GETs `url` and returns the full body on any 2xx status.
///
/// If `cancel` is set while the transfer is running, curl's progress callback
/// aborts it and `FetchError::Cancelled` is returned.
pub fn fetch(
    url: &str,
    opts: &FetchOptions,
    cancel: Option<&AtomicBool>,
) -> Result<Vec<u8>, FetchError> {
    if cancel.is_some_and(|c| c.load(Ordering::Relaxed)) {
        return Err(FetchError::Cancelled);
    }

    let mut body: Vec<u8> = Vec::new();

    let mut easy = curl::easy::Easy::new();
    easy.url(url)?;
    easy.follow_location(true)?;
    easy.max_redirections(10)?;
    easy.connect_timeout(opts.connect_timeout)?;
    easy.timeout(opts.timeout)?;
    if let Some(ua) = &opts.user_agent {
        easy.useragent(ua)?;
    }
    // Needed for the progress callback to fire.
    easy.progress(true)?;

    {
        let mut transfer = easy.transfer();
        transfer.write_function(|data| {
            body.extend_from_slice(data);
            Ok(data.len())
        })?;
        transfer.progress_function(|_, _, _, _| {
            !cancel.is_some_and(|c| c.load(Ordering::Relaxed))
        })?;
        transfer.perform()?;
    }

    let code = easy.response_code()?;
    if !(200..300).contains(&code) {
        return Err(FetchError::HttpStatus(code));
    }

    Ok(body)
}
