//! `segmerge jobs` – validate and list a job file.

use anyhow::Result;
use segmerge_core::joblist;
use std::path::Path;

pub fn run_jobs(job_file: &Path) -> Result<()> {
    let jobs = joblist::load_job_list(job_file)?;
    if jobs.is_empty() {
        println!("No jobs in {}.", job_file.display());
    }
    for job in jobs {
        println!("{}\t{}", job.name, job.playlist_url);
    }
    Ok(())
}
