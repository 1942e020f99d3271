//! Working directory layout shared by all jobs of a batch.

use std::path::{Path, PathBuf};

use crate::config::SegmergeConfig;

/// Resolved paths. Relative forms are what the merge tool sees (it runs in
/// `work_dir`); absolute forms are what the orchestrator touches.
#[derive(Debug, Clone)]
pub struct WorkLayout {
    pub work_dir: PathBuf,
    /// Segments directory as written into the manifest.
    pub segments_rel: String,
    pub manifest_rel: PathBuf,
    pub output_rel: PathBuf,
    pub output_extension: String,
}

impl WorkLayout {
    pub fn new(work_dir: PathBuf, cfg: &SegmergeConfig) -> Self {
        Self {
            work_dir,
            segments_rel: cfg.segments_dir.clone(),
            manifest_rel: PathBuf::from(&cfg.manifest_file),
            output_rel: PathBuf::from(&cfg.output_dir),
            output_extension: cfg.output_extension.trim_start_matches('.').to_string(),
        }
    }

    pub fn segments_dir(&self) -> PathBuf {
        self.work_dir.join(&self.segments_rel)
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.work_dir.join(&self.manifest_rel)
    }

    pub fn output_dir(&self) -> PathBuf {
        self.work_dir.join(&self.output_rel)
    }

    /// `{output_dir}/{name}.{ext}` relative to `work_dir`.
    pub fn output_file_rel(&self, name: &str) -> PathBuf {
        self.output_rel
            .join(format!("{}.{}", name, self.output_extension))
    }

    pub fn output_file(&self, name: &str) -> PathBuf {
        self.work_dir.join(self.output_file_rel(name))
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }
}
