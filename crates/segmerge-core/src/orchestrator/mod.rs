//! Job orchestrator.
//!
//! Drives one job at a time through
//! fetch playlist → resolve → download → write manifest → merge → clean up,
//! and a batch of jobs with a configurable failure policy. Jobs never overlap:
//! they all share the same segments directory and manifest path.

mod batch;
mod error;
mod layout;
mod state;

use std::path::PathBuf;
use std::sync::Arc;

use crate::config::SegmergeConfig;
use crate::downloader::{self, DownloadOptions, DownloadProgress, ProgressStats};
use crate::fetch::{self, FetchOptions};
use crate::joblist::Job;
use crate::manifest;
use crate::merge::Merger;
use crate::resolver::{self, SegmentRef};
use crate::retry::{run_with_retry, RetryPolicy};
use crate::storage::SegmentStore;

pub use batch::BatchSummary;
pub use error::{JobError, JobFailure};
pub use layout::WorkLayout;
pub use state::JobState;

/// A job that reached `Done`.
#[derive(Debug, Clone)]
pub struct JobOutcome {
    pub name: String,
    pub output_path: PathBuf,
    pub segment_count: usize,
    pub bytes: u64,
}

pub struct Orchestrator {
    cfg: SegmergeConfig,
    layout: WorkLayout,
    merger: Arc<dyn Merger>,
    progress_tx: Option<tokio::sync::mpsc::Sender<ProgressStats>>,
}

impl Orchestrator {
    /// Resolves the working directory from `cfg` (current dir if unset).
    pub fn new(cfg: SegmergeConfig, merger: Arc<dyn Merger>) -> anyhow::Result<Self> {
        let work_dir = cfg.resolved_work_dir()?;
        let layout = WorkLayout::new(work_dir, &cfg);
        Ok(Self {
            cfg,
            layout,
            merger,
            progress_tx: None,
        })
    }

    /// Send download progress snapshots to `tx`.
    pub fn with_progress(mut self, tx: tokio::sync::mpsc::Sender<ProgressStats>) -> Self {
        self.progress_tx = Some(tx);
        self
    }

    pub fn layout(&self) -> &WorkLayout {
        &self.layout
    }

    pub fn config(&self) -> &SegmergeConfig {
        &self.cfg
    }

    fn download_options(&self) -> DownloadOptions {
        DownloadOptions {
            max_concurrent: self.cfg.max_concurrent.max(1),
            fetch: self.cfg.fetch_options(),
            retry: self.cfg.retry_policy(),
        }
    }

    /// Creates the output directory. Called once per batch.
    pub async fn prepare(&self) -> Result<(), JobError> {
        let out = self.layout.output_dir();
        tokio::fs::create_dir_all(&out)
            .await
            .map_err(JobError::fs("create output directory", &out))
    }

    /// Runs one job to completion. On failure the segments directory is left
    /// in place for inspection; the next job recreates it.
    pub async fn run_job(&self, job: &Job) -> Result<JobOutcome, JobFailure> {
        let mut state = JobState::FetchingPlaylist;
        match self.run_job_inner(job, &mut state).await {
            Ok(outcome) => Ok(outcome),
            Err(error) => {
                tracing::error!(job = %job.name, state = %state, "job failed: {}", error);
                Err(JobFailure {
                    job: job.name.clone(),
                    state,
                    error,
                })
            }
        }
    }

    async fn run_job_inner(&self, job: &Job, state: &mut JobState) -> Result<JobOutcome, JobError> {
        let output_rel = self.layout.output_file_rel(&job.name);
        let output_path = self.layout.output_file(&job.name);
        if !self.cfg.overwrite
            && tokio::fs::try_exists(&output_path)
                .await
                .map_err(JobError::fs("check output", &output_path))?
        {
            return Err(JobError::OutputExists(output_path));
        }

        tracing::debug!(job = %job.name, state = %state, "job state");
        let body = fetch_playlist(
            job.playlist_url.clone(),
            self.cfg.fetch_options(),
            self.cfg.retry_policy(),
        )
        .await?;

        advance(job, state);
        let text = resolver::decode_playlist(body).map_err(|source| JobError::Resolve {
            url: job.playlist_url.clone(),
            source,
        })?;
        let refs = resolver::resolve(&text, &job.playlist_url);
        if refs.is_empty() {
            return Err(JobError::EmptyPlaylist {
                url: job.playlist_url.clone(),
            });
        }
        tracing::info!(job = %job.name, segments = refs.len(), "resolved playlist");

        advance(job, state);
        let segments_dir = self.layout.segments_dir();
        let manifest_path = self.layout.manifest_path();
        // A manifest left by an earlier failed job must not outlive its segments.
        remove_if_present(&manifest_path).await?;
        reset_dir(&segments_dir).await?;
        let report = self.download(job, refs, segments_dir.clone()).await?;
        let segment_count = report.count();
        let bytes = report.total_bytes();

        advance(job, state);
        let text = manifest::render_manifest(segment_count, &self.layout.segments_rel);
        tokio::fs::write(&manifest_path, text)
            .await
            .map_err(JobError::fs("write manifest", &manifest_path))?;

        advance(job, state);
        let out_dir = self.layout.output_dir();
        tokio::fs::create_dir_all(&out_dir)
            .await
            .map_err(JobError::fs("create output directory", &out_dir))?;
        let merger = Arc::clone(&self.merger);
        let work_dir = self.layout.work_dir.clone();
        let manifest_rel = self.layout.manifest_rel.clone();
        let merge_out = output_rel.clone();
        tokio::task::spawn_blocking(move || merger.merge(&work_dir, &manifest_rel, &merge_out))
            .await??;

        advance(job, state);
        if self.cfg.keep_segments {
            tracing::debug!(job = %job.name, "keeping segments and manifest");
        } else {
            tokio::fs::remove_dir_all(&segments_dir)
                .await
                .map_err(JobError::fs("remove segments directory", &segments_dir))?;
            tokio::fs::remove_file(&manifest_path)
                .await
                .map_err(JobError::fs("remove manifest", &manifest_path))?;
        }

        advance(job, state);
        tracing::info!(
            job = %job.name,
            segments = segment_count,
            bytes,
            "job completed: {}",
            output_path.display()
        );
        Ok(JobOutcome {
            name: job.name.clone(),
            output_path,
            segment_count,
            bytes,
        })
    }

    async fn download(
        &self,
        job: &Job,
        refs: Vec<SegmentRef>,
        segments_dir: PathBuf,
    ) -> Result<downloader::DownloadReport, JobError> {
        let progress = DownloadProgress::new(job.name.clone(), refs.len(), self.progress_tx.clone());
        let opts = self.download_options();
        let store = SegmentStore::new(segments_dir);
        let report = tokio::task::spawn_blocking(move || {
            downloader::download_all(&refs, &store, &opts, Some(&progress))
        })
        .await??;
        Ok(report)
    }
}

fn advance(job: &Job, state: &mut JobState) {
    if let Some(next) = state.next() {
        *state = next;
        tracing::debug!(job = %job.name, state = %next, "job state");
    }
}

async fn fetch_playlist(
    url: String,
    opts: FetchOptions,
    policy: RetryPolicy,
) -> Result<Vec<u8>, JobError> {
    let fetch_url = url.clone();
    tokio::task::spawn_blocking(move || {
        run_with_retry(&policy, None, || fetch::fetch(&fetch_url, &opts, None))
    })
    .await?
    .map_err(|source| JobError::Playlist { url, source })
}

async fn remove_if_present(path: &std::path::Path) -> Result<(), JobError> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => {
            tracing::debug!(path = %path.display(), "removed stale manifest");
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(JobError::fs("remove manifest", path)(e)),
    }
}

/// Removes a stale directory left by an earlier failed job, then recreates it empty.
async fn reset_dir(dir: &std::path::Path) -> Result<(), JobError> {
    match tokio::fs::remove_dir_all(dir).await {
        Ok(()) => tracing::debug!(path = %dir.display(), "removed stale segments directory"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(JobError::fs("remove segments directory", dir)(e)),
    }
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(JobError::fs("create segments directory", dir))
}
