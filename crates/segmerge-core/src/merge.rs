//! External merge step.
//!
//! The orchestrator only depends on the `Merger` trait; `FfmpegConcat` runs
//! `ffmpeg -f concat` on the manifest and reports the exit status. The tool's
//! own output is not interpreted.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use thiserror::Error;

use crate::config::MergeConfig;

#[derive(Debug, Error)]
pub enum MergeError {
    #[error("cannot start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{program} exited with {}", exit_label(.code))]
    ExitStatus { program: String, code: Option<i32> },
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!("status {}", c),
        None => "a signal".to_string(),
    }
}

/// Joins the segments listed in `manifest` into `output`.
/// `manifest` and `output` are interpreted relative to `work_dir`.
pub trait Merger: Send + Sync {
    fn merge(&self, work_dir: &Path, manifest: &Path, output: &Path) -> Result<(), MergeError>;
}

/// `ffmpeg -f concat -i <manifest> -c copy <output>`.
#[derive(Debug, Clone)]
pub struct FfmpegConcat {
    pub program: PathBuf,
    pub extra_args: Vec<String>,
}

impl Default for FfmpegConcat {
    fn default() -> Self {
        Self::from_config(&MergeConfig::default())
    }
}

impl FfmpegConcat {
    pub fn from_config(cfg: &MergeConfig) -> Self {
        Self {
            program: PathBuf::from(&cfg.program),
            extra_args: cfg.extra_args.clone(),
        }
    }

    /// Full argument list (without the program).
    pub fn args(&self, manifest: &Path, output: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = [
            "-hide_banner",
            "-loglevel",
            "error",
            // Overwrite decisions are made before the job starts.
            "-y",
            "-f",
            "concat",
            "-i",
        ]
        .into_iter()
        .map(OsString::from)
        .collect();
        args.push(manifest.as_os_str().to_owned());
        args.push("-c".into());
        args.push("copy".into());
        args.extend(self.extra_args.iter().map(OsString::from));
        args.push(output.as_os_str().to_owned());
        args
    }
}

impl Merger for FfmpegConcat {
    fn merge(&self, work_dir: &Path, manifest: &Path, output: &Path) -> Result<(), MergeError> {
        let program = self.program.display().to_string();
        tracing::debug!(program = %program, manifest = %manifest.display(), output = %output.display(), "running merge tool");
        let status = Command::new(&self.program)
            .args(self.args(manifest, output))
            .current_dir(work_dir)
            .stdin(Stdio::null())
            .status()
            .map_err(|source| MergeError::Spawn {
                program: program.clone(),
                source,
            })?;
        if !status.success() {
            return Err(MergeError::ExitStatus {
                program,
                code: status.code(),
            });
        }
        Ok(())
    }
}
