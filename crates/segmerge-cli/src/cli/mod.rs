//! CLI for segmerge: batch playlist download and merge.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use segmerge_core::config;
use std::path::PathBuf;

use commands::{run_batch, run_jobs, run_manifest, run_resolve, RunOverrides};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "segmerge")]
#[command(about = "Download segmented playlists in batches and merge them with ffmpeg", long_about = None)]
pub struct Cli {
    /// Config file to use instead of ~/.config/segmerge/config.toml.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Download and merge every job in a job list file.
    Run {
        /// Job list: alternating lines of output name and playlist URL.
        job_file: PathBuf,
        /// Directory holding segments, manifest and outputs (default: current directory).
        #[arg(long, value_name = "DIR")]
        work_dir: Option<PathBuf>,
        /// Maximum concurrent segment downloads per job.
        #[arg(long, value_name = "N")]
        concurrency: Option<usize>,
        /// Per-request timeout in seconds.
        #[arg(long, value_name = "SECS")]
        timeout: Option<u64>,
        /// Stop the batch at the first failed job.
        #[arg(long)]
        abort_on_error: bool,
        /// Replace existing output files.
        #[arg(long)]
        overwrite: bool,
        /// Keep the segments directory and manifest after merging.
        #[arg(long)]
        keep_segments: bool,
    },

    /// Fetch a playlist and print its resolved segment URLs.
    Resolve {
        /// Playlist URL.
        url: String,
    },

    /// Parse a job list and print `name<TAB>url` per job.
    Jobs {
        /// Job list file.
        job_file: PathBuf,
    },

    /// Print the concat manifest for COUNT segments.
    Manifest {
        /// Number of segments.
        count: usize,
        /// Segments directory as written in each entry.
        #[arg(long, value_name = "DIR", default_value = "video_parts")]
        segments_dir: String,
    },
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = match &cli.config {
            Some(path) => config::load_from_path(path)?,
            None => config::load_or_init()?,
        };
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Run {
                job_file,
                work_dir,
                concurrency,
                timeout,
                abort_on_error,
                overwrite,
                keep_segments,
            } => {
                let overrides = RunOverrides {
                    work_dir,
                    concurrency,
                    timeout,
                    abort_on_error,
                    overwrite,
                    keep_segments,
                };
                run_batch(cfg, &job_file, overrides).await?;
            }
            CliCommand::Resolve { url } => run_resolve(&cfg, &url).await?,
            CliCommand::Jobs { job_file } => run_jobs(&job_file)?,
            CliCommand::Manifest {
                count,
                segments_dir,
            } => run_manifest(count, &segments_dir),
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
