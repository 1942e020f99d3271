//! Per-job state machine.

use std::fmt;

/// Where a job is in its pipeline. Transitions are strictly sequential; a
/// failed job is reported with the state it stopped in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    FetchingPlaylist,
    Resolving,
    Downloading,
    WritingManifest,
    Merging,
    CleaningUp,
    Done,
}

impl JobState {
    /// The state that follows a successful step; None after `Done`.
    pub fn next(self) -> Option<JobState> {
        match self {
            JobState::FetchingPlaylist => Some(JobState::Resolving),
            JobState::Resolving => Some(JobState::Downloading),
            JobState::Downloading => Some(JobState::WritingManifest),
            JobState::WritingManifest => Some(JobState::Merging),
            JobState::Merging => Some(JobState::CleaningUp),
            JobState::CleaningUp => Some(JobState::Done),
            JobState::Done => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            JobState::FetchingPlaylist => "fetching playlist",
            JobState::Resolving => "resolving",
            JobState::Downloading => "downloading",
            JobState::WritingManifest => "writing manifest",
            JobState::Merging => "merging",
            JobState::CleaningUp => "cleaning up",
            JobState::Done => "done",
        }
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
