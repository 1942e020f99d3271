//! Concurrent segment downloader.
//!
//! Fetches every resolved segment with a bounded pool of worker threads and
//! writes each one to `{dir}/{index}.ts`. Each unit of work carries its index,
//! so the on-disk name never depends on completion order. The first failure
//! cancels the rest of the group: queued work is dropped, in-flight transfers
//! abort, and all workers are joined before the error is returned.

mod progress;
mod run;

use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::fetch::{FetchError, FetchOptions};
use crate::resolver::SegmentRef;
use crate::retry::RetryPolicy;
use crate::storage::{DownloadedSegment, SegmentStore};

pub use progress::{DownloadProgress, ProgressStats};

/// Default number of concurrent segment transfers.
pub const DEFAULT_MAX_CONCURRENT: usize = 8;

#[derive(Debug, Clone)]
pub struct DownloadOptions {
    /// Upper bound on simultaneous transfers (values below 1 are treated as 1).
    pub max_concurrent: usize,
    pub fetch: FetchOptions,
    pub retry: RetryPolicy,
}

impl Default for DownloadOptions {
    fn default() -> Self {
        Self {
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            fetch: FetchOptions::default(),
            retry: RetryPolicy::default(),
        }
    }
}

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("segment {index} ({url}): {source}")]
    Fetch {
        index: usize,
        url: String,
        #[source]
        source: FetchError,
    },
    #[error("segment {index}: cannot write {}: {source}", .path.display())]
    Storage {
        index: usize,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("segment {0} is missing")]
    MissingSegment(usize),
    #[error("segment index {0} appears more than once")]
    DuplicateIndex(usize),
    #[error("download worker panicked")]
    WorkerPanicked,
}

impl DownloadError {
    /// True for the secondary errors siblings report after the group was cancelled.
    pub fn is_cancellation(&self) -> bool {
        matches!(
            self,
            DownloadError::Fetch {
                source: FetchError::Cancelled,
                ..
            }
        )
    }
}

/// All segments of one job, sorted by index with no gaps.
#[derive(Debug, Clone, Default)]
pub struct DownloadReport {
    pub segments: Vec<DownloadedSegment>,
}

impl DownloadReport {
    pub fn count(&self) -> usize {
        self.segments.len()
    }

    pub fn total_bytes(&self) -> u64 {
        self.segments.iter().map(|s| s.byte_len).sum()
    }
}

/// Downloads every segment in `refs` into `store`.
///
/// Succeeds only if all segments were fetched and written; the report then
/// holds exactly the indices `0..refs.len()`.
pub fn download_all(
    refs: &[SegmentRef],
    store: &SegmentStore,
    opts: &DownloadOptions,
    progress: Option<&DownloadProgress>,
) -> Result<DownloadReport, DownloadError> {
    check_indices(refs)?;
    if refs.is_empty() {
        return Ok(DownloadReport::default());
    }

    let arena = run::run_pool(refs, store, opts, progress)?;

    let mut segments = Vec::with_capacity(arena.len());
    for (index, slot) in arena.into_iter().enumerate() {
        match slot {
            Some(seg) => segments.push(seg),
            None => return Err(DownloadError::MissingSegment(index)),
        }
    }
    Ok(DownloadReport { segments })
}

/// Indices must be exactly `0..refs.len()` in some order.
fn check_indices(refs: &[SegmentRef]) -> Result<(), DownloadError> {
    let mut seen = vec![false; refs.len()];
    for r in refs {
        match seen.get_mut(r.index) {
            Some(s) if *s => return Err(DownloadError::DuplicateIndex(r.index)),
            Some(s) => *s = true,
            None => {}
        }
    }
    match seen.iter().position(|s| !s) {
        Some(missing) => Err(DownloadError::MissingSegment(missing)),
        None => Ok(()),
    }
}
