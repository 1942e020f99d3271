//! Job-level errors.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::downloader::DownloadError;
use crate::fetch::FetchError;
use crate::merge::MergeError;
use crate::resolver::ResolveError;

use super::JobState;

#[derive(Debug, Error)]
pub enum JobError {
    #[error("output {} already exists (enable overwrite to replace it)", .0.display())]
    OutputExists(PathBuf),
    #[error("fetch playlist {url}: {source}")]
    Playlist {
        url: String,
        #[source]
        source: FetchError,
    },
    #[error("read playlist {url}: {source}")]
    Resolve {
        url: String,
        #[source]
        source: ResolveError,
    },
    #[error("playlist {url} has no segment references")]
    EmptyPlaylist { url: String },
    #[error(transparent)]
    Download(#[from] DownloadError),
    #[error("{action} {}: {source}", .path.display())]
    Filesystem {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("merge failed: {0}")]
    Merge(#[from] MergeError),
    #[error("background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl JobError {
    pub(super) fn fs(action: &'static str, path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> JobError {
        let path = path.into();
        move |source| JobError::Filesystem {
            action,
            path,
            source,
        }
    }
}

/// A failed job: which job, the state it failed in, and why.
#[derive(Debug, Error)]
#[error("job `{job}` failed while {state}: {error}")]
pub struct JobFailure {
    pub job: String,
    pub state: JobState,
    #[source]
    pub error: JobError,
}
