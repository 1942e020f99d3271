use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::fetch::FetchOptions;
use crate::retry::RetryPolicy;

/// Retry policy parameters (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts per request (including the first).
    pub max_attempts: u32,
    /// Base delay in seconds for exponential backoff (e.g. 0.25 = 250ms).
    pub base_delay_secs: f64,
    /// Maximum backoff delay in seconds.
    pub max_delay_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_secs: 0.25,
            max_delay_secs: 10,
        }
    }
}

/// External merge tool settings (optional `[merge]` section).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeConfig {
    /// Executable to run; looked up on PATH when not absolute.
    pub program: String,
    /// Extra arguments placed before the output path.
    #[serde(default)]
    pub extra_args: Vec<String>,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            program: "ffmpeg".to_string(),
            extra_args: Vec::new(),
        }
    }
}

/// What the batch does after a job fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Record the failure and move on to the next job.
    #[default]
    Continue,
    /// Stop the batch; remaining jobs are reported as not attempted.
    Abort,
}

/// Global configuration loaded from `~/.config/segmerge/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmergeConfig {
    /// Root for the segments directory, manifest and output directory.
    /// None = current directory at run time.
    #[serde(default)]
    pub work_dir: Option<PathBuf>,
    /// Per-job segments directory, relative to `work_dir`. Recreated for every job.
    pub segments_dir: String,
    /// Output directory, relative to `work_dir`. Created once and retained.
    pub output_dir: String,
    /// Concat manifest file name, relative to `work_dir`.
    pub manifest_file: String,
    /// Extension of merged output files (without the dot).
    pub output_extension: String,
    /// Maximum number of segment downloads in flight per job.
    pub max_concurrent: usize,
    /// Whole-request timeout in seconds for playlist and segment GETs.
    pub timeout_secs: u64,
    /// Connect timeout in seconds.
    pub connect_timeout_secs: u64,
    /// Optional User-Agent header value.
    #[serde(default)]
    pub user_agent: Option<String>,
    /// Batch behaviour after a failed job.
    #[serde(default)]
    pub on_job_failure: FailurePolicy,
    /// Replace existing output files instead of failing the job.
    #[serde(default)]
    pub overwrite: bool,
    /// Leave the segments directory and manifest in place after a successful merge.
    #[serde(default)]
    pub keep_segments: bool,
    /// Optional retry policy; if missing, built-in defaults are used.
    #[serde(default)]
    pub retry: Option<RetryConfig>,
    /// Optional merge tool override; if missing, plain `ffmpeg` is used.
    #[serde(default)]
    pub merge: Option<MergeConfig>,
}

impl Default for SegmergeConfig {
    fn default() -> Self {
        Self {
            work_dir: None,
            segments_dir: "video_parts".to_string(),
            output_dir: "downloaded_videos".to_string(),
            manifest_file: "ts_files.txt".to_string(),
            output_extension: "mp4".to_string(),
            max_concurrent: 8,
            timeout_secs: 60,
            connect_timeout_secs: 30,
            user_agent: None,
            on_job_failure: FailurePolicy::Continue,
            overwrite: false,
            keep_segments: false,
            retry: None,
            merge: None,
        }
    }
}

impl SegmergeConfig {
    /// Working directory: configured value or the process current directory.
    pub fn resolved_work_dir(&self) -> Result<PathBuf> {
        match &self.work_dir {
            Some(dir) => Ok(dir.clone()),
            None => std::env::current_dir().context("current directory unavailable"),
        }
    }

    pub fn fetch_options(&self) -> FetchOptions {
        FetchOptions {
            timeout: Duration::from_secs(self.timeout_secs.max(1)),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs.max(1)),
            user_agent: self.user_agent.clone(),
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
            .as_ref()
            .map(|r| RetryPolicy {
                max_attempts: r.max_attempts.max(1),
                base_delay: Duration::from_secs_f64(r.base_delay_secs.max(0.0)),
                max_delay: Duration::from_secs(r.max_delay_secs),
            })
            .unwrap_or_default()
    }

    pub fn merge_config(&self) -> MergeConfig {
        self.merge.clone().unwrap_or_default()
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("segmerge")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<SegmergeConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = SegmergeConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }
    load_from_path(&path)
}

/// Load configuration from an explicit file.
pub fn load_from_path(path: &Path) -> Result<SegmergeConfig> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("read config {}", path.display()))?;
    let cfg: SegmergeConfig =
        toml::from_str(&data).with_context(|| format!("parse config {}", path.display()))?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = SegmergeConfig::default();
        assert_eq!(cfg.segments_dir, "video_parts");
        assert_eq!(cfg.output_dir, "downloaded_videos");
        assert_eq!(cfg.manifest_file, "ts_files.txt");
        assert_eq!(cfg.max_concurrent, 8);
        assert_eq!(cfg.timeout_secs, 60);
        assert_eq!(cfg.on_job_failure, FailurePolicy::Continue);
        assert!(!cfg.overwrite);
    }

    #[test]
    fn config_toml_roundtrip() {
        let cfg = SegmergeConfig::default();
        let toml = toml::to_string_pretty(&cfg).unwrap();
        let parsed: SegmergeConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.segments_dir, cfg.segments_dir);
        assert_eq!(parsed.max_concurrent, cfg.max_concurrent);
        assert_eq!(parsed.timeout_secs, cfg.timeout_secs);
        assert_eq!(parsed.on_job_failure, cfg.on_job_failure);
    }

    #[test]
    fn config_toml_custom_values() {
        let toml = r#"
            segments_dir = "parts"
            output_dir = "out"
            manifest_file = "list.txt"
            output_extension = "mkv"
            max_concurrent = 4
            timeout_secs = 20
            connect_timeout_secs = 5
            on_job_failure = "abort"
        "#;
        let cfg: SegmergeConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.segments_dir, "parts");
        assert_eq!(cfg.output_extension, "mkv");
        assert_eq!(cfg.max_concurrent, 4);
        assert_eq!(cfg.on_job_failure, FailurePolicy::Abort);
        assert!(cfg.retry.is_none());
        assert!(cfg.merge.is_none());
        assert!(cfg.work_dir.is_none());
        assert_eq!(cfg.fetch_options().timeout, Duration::from_secs(20));
    }

    #[test]
    fn config_toml_retry_and_merge_sections() {
        let toml = r#"
            segments_dir = "video_parts"
            output_dir = "downloaded_videos"
            manifest_file = "ts_files.txt"
            output_extension = "mp4"
            max_concurrent = 16
            timeout_secs = 60
            connect_timeout_secs = 30

            [retry]
            max_attempts = 5
            base_delay_secs = 0.5
            max_delay_secs = 15

            [merge]
            program = "/usr/local/bin/ffmpeg"
            extra_args = ["-movflags", "+faststart"]
        "#;
        let cfg: SegmergeConfig = toml::from_str(toml).unwrap();
        let policy = cfg.retry_policy();
        assert_eq!(policy.max_attempts, 5);
        assert_eq!(policy.base_delay, Duration::from_millis(500));
        assert_eq!(policy.max_delay, Duration::from_secs(15));
        let merge = cfg.merge_config();
        assert_eq!(merge.program, "/usr/local/bin/ffmpeg");
        assert_eq!(merge.extra_args, vec!["-movflags", "+faststart"]);
    }

    #[test]
    fn zero_attempts_clamped_to_one() {
        let mut cfg = SegmergeConfig::default();
        cfg.retry = Some(RetryConfig {
            max_attempts: 0,
            base_delay_secs: 0.1,
            max_delay_secs: 1,
        });
        assert_eq!(cfg.retry_policy().max_attempts, 1);
    }

    #[test]
    fn load_from_path_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut cfg = SegmergeConfig::default();
        cfg.max_concurrent = 3;
        fs::write(&path, toml::to_string_pretty(&cfg).unwrap()).unwrap();
        let loaded = load_from_path(&path).unwrap();
        assert_eq!(loaded.max_concurrent, 3);
    }
}
