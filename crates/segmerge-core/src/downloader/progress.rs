//! Progress reporting for a job's segment downloads (segments done, bytes, ETA).
//!
//! Counters only ever increase. Snapshots are pushed to an optional tokio
//! channel with `try_send`, so a slow consumer loses updates instead of
//! stalling the workers.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Instant;

/// Snapshot of download progress for one job (CLI-friendly).
#[derive(Debug, Clone)]
pub struct ProgressStats {
    /// Job the snapshot belongs to.
    pub job: String,
    /// Number of segments written so far.
    pub segments_done: usize,
    /// Total number of segments.
    pub segment_count: usize,
    /// Bytes written so far.
    pub bytes_done: u64,
    /// Elapsed time since download start (seconds).
    pub elapsed_secs: f64,
}

impl ProgressStats {
    /// Download rate in bytes per second (0 if elapsed is 0).
    pub fn bytes_per_sec(&self) -> f64 {
        if self.elapsed_secs <= 0.0 {
            return 0.0;
        }
        self.bytes_done as f64 / self.elapsed_secs
    }

    /// Estimated seconds remaining from the average time per segment so far.
    pub fn eta_secs(&self) -> Option<f64> {
        let remaining = self.segment_count.saturating_sub(self.segments_done);
        if remaining == 0 {
            return Some(0.0);
        }
        if self.segments_done == 0 || self.elapsed_secs <= 0.0 {
            return None;
        }
        let per_segment = self.elapsed_secs / self.segments_done as f64;
        Some(per_segment * remaining as f64)
    }

    /// Fraction complete in [0.0, 1.0].
    pub fn fraction(&self) -> f64 {
        if self.segment_count == 0 {
            return 1.0;
        }
        (self.segments_done as f64 / self.segment_count as f64).min(1.0)
    }

    pub fn is_done(&self) -> bool {
        self.segments_done >= self.segment_count
    }
}

/// Shared progress counters for one download group.
#[derive(Debug)]
pub struct DownloadProgress {
    job: String,
    total: usize,
    completed: AtomicUsize,
    bytes: AtomicU64,
    started: Instant,
    tx: Option<tokio::sync::mpsc::Sender<ProgressStats>>,
}

impl DownloadProgress {
    pub fn new(
        job: impl Into<String>,
        total: usize,
        tx: Option<tokio::sync::mpsc::Sender<ProgressStats>>,
    ) -> Self {
        Self {
            job: job.into(),
            total,
            completed: AtomicUsize::new(0),
            bytes: AtomicU64::new(0),
            started: Instant::now(),
            tx,
        }
    }

    /// Count one finished segment of `bytes` length and publish a snapshot.
    pub fn record(&self, bytes: u64) {
        self.completed.fetch_add(1, Ordering::Relaxed);
        self.bytes.fetch_add(bytes, Ordering::Relaxed);
        if let Some(tx) = &self.tx {
            let _ = tx.try_send(self.snapshot());
        }
    }

    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> ProgressStats {
        ProgressStats {
            job: self.job.clone(),
            segments_done: self.completed(),
            segment_count: self.total,
            bytes_done: self.bytes.load(Ordering::Relaxed),
            elapsed_secs: self.started.elapsed().as_secs_f64(),
        }
    }
}
