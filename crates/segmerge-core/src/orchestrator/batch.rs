//! Sequential batch driver with a final summary.

use crate::config::FailurePolicy;
use crate::joblist::Job;

use super::{JobError, JobFailure, JobOutcome, Orchestrator};

/// Result of a batch run.
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub completed: Vec<JobOutcome>,
    pub failed: Vec<JobFailure>,
    /// Jobs never started because the batch was aborted.
    pub not_attempted: Vec<String>,
}

impl BatchSummary {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty() && self.not_attempted.is_empty()
    }

    pub fn total(&self) -> usize {
        self.completed.len() + self.failed.len() + self.not_attempted.len()
    }
}

impl Orchestrator {
    /// Runs `jobs` one after another. What happens after a failure is decided
    /// by `on_job_failure` in the config. Only output directory creation is
    /// fatal for the whole batch.
    pub async fn run_batch(&self, jobs: &[Job]) -> Result<BatchSummary, JobError> {
        self.prepare().await?;
        let policy = self.config().on_job_failure;
        let mut summary = BatchSummary::default();

        for (i, job) in jobs.iter().enumerate() {
            tracing::info!(job = %job.name, "starting job {}/{}", i + 1, jobs.len());
            match self.run_job(job).await {
                Ok(outcome) => summary.completed.push(outcome),
                Err(failure) => {
                    summary.failed.push(failure);
                    if policy == FailurePolicy::Abort {
                        summary.not_attempted = jobs[i + 1..].iter().map(|j| j.name.clone()).collect();
                        if !summary.not_attempted.is_empty() {
                            tracing::warn!(
                                skipped = summary.not_attempted.len(),
                                "aborting batch after failed job"
                            );
                        }
                        break;
                    }
                }
            }
        }

        tracing::info!(
            completed = summary.completed.len(),
            failed = summary.failed.len(),
            not_attempted = summary.not_attempted.len(),
            "batch finished"
        );
        Ok(summary)
    }
}
