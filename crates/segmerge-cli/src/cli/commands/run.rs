//! `segmerge run` – process a job list.

use anyhow::{bail, Result};
use segmerge_core::config::{FailurePolicy, SegmergeConfig};
use segmerge_core::downloader::ProgressStats;
use segmerge_core::joblist;
use segmerge_core::merge::FfmpegConcat;
use segmerge_core::orchestrator::{BatchSummary, Orchestrator};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

/// Command-line flags that take precedence over the config file.
#[derive(Debug, Default)]
pub struct RunOverrides {
    pub work_dir: Option<PathBuf>,
    pub concurrency: Option<usize>,
    pub timeout: Option<u64>,
    pub abort_on_error: bool,
    pub overwrite: bool,
    pub keep_segments: bool,
}

impl RunOverrides {
    pub fn apply(self, cfg: &mut SegmergeConfig) {
        if let Some(dir) = self.work_dir {
            cfg.work_dir = Some(dir);
        }
        if let Some(n) = self.concurrency {
            cfg.max_concurrent = n.max(1);
        }
        if let Some(secs) = self.timeout {
            cfg.timeout_secs = secs;
        }
        if self.abort_on_error {
            cfg.on_job_failure = FailurePolicy::Abort;
        }
        cfg.overwrite |= self.overwrite;
        cfg.keep_segments |= self.keep_segments;
    }
}

pub async fn run_batch(mut cfg: SegmergeConfig, job_file: &Path, overrides: RunOverrides) -> Result<()> {
    overrides.apply(&mut cfg);
    let jobs = joblist::load_job_list(job_file)?;
    if jobs.is_empty() {
        println!("No jobs in {}.", job_file.display());
        return Ok(());
    }

    let merger = Arc::new(FfmpegConcat::from_config(&cfg.merge_config()));
    let (progress_tx, mut progress_rx) = tokio::sync::mpsc::channel::<ProgressStats>(16);
    let orch = Orchestrator::new(cfg, merger)?.with_progress(progress_tx);
    tracing::info!(jobs = jobs.len(), work_dir = %orch.layout().work_dir.display(), "starting batch");

    const PROGRESS_INTERVAL_MS: u64 = 500;
    let progress_handle = tokio::spawn(async move {
        let mut last_print = Instant::now();
        while let Some(stats) = progress_rx.recv().await {
            let now = Instant::now();
            if now.duration_since(last_print).as_millis() as u64 >= PROGRESS_INTERVAL_MS
                || stats.is_done()
            {
                let done_mib = stats.bytes_done as f64 / 1_048_576.0;
                let rate_mib = stats.bytes_per_sec() / 1_048_576.0;
                let eta = stats
                    .eta_secs()
                    .map(|s| format!("{:.0}s", s))
                    .unwrap_or_else(|| "?".to_string());
                println!(
                    "  {}: {}/{} segments ({:.1}%)  {:.1} MiB  {:.2} MiB/s  ETA {}",
                    stats.job,
                    stats.segments_done,
                    stats.segment_count,
                    stats.fraction() * 100.0,
                    done_mib,
                    rate_mib,
                    eta
                );
                last_print = now;
            }
        }
    });

    let result = orch.run_batch(&jobs).await;
    // Closes the progress channel so the printer task ends.
    drop(orch);
    let _ = progress_handle.await;
    let summary = result?;

    print_summary(&summary);
    if !summary.is_success() {
        bail!(
            "{} of {} job(s) did not complete",
            summary.failed.len() + summary.not_attempted.len(),
            summary.total()
        );
    }
    Ok(())
}

fn print_summary(summary: &BatchSummary) {
    for outcome in &summary.completed {
        println!(
            "done    {}  ({} segments) -> {}",
            outcome.name,
            outcome.segment_count,
            outcome.output_path.display()
        );
    }
    for failure in &summary.failed {
        println!("failed  {}  [{}] {}", failure.job, failure.state, failure.error);
    }
    for name in &summary.not_attempted {
        println!("skipped {}", name);
    }
}
