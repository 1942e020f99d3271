//! Index-addressed segment writer.

use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use super::{segment_file_name, temp_path};

/// One segment persisted on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedSegment {
    pub index: usize,
    pub path: PathBuf,
    pub byte_len: u64,
}

/// Writer for the segments directory of one job. Cheap to clone and safe to
/// share between workers: distinct indices never touch the same file.
#[derive(Debug, Clone)]
pub struct SegmentStore {
    dir: PathBuf,
}

impl SegmentStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `{dir}/{index}.ts`.
    pub fn path_for(&self, index: usize) -> PathBuf {
        self.dir.join(segment_file_name(index))
    }

    /// Writes `data` as segment `index`: `.part` file, fsync, rename.
    pub fn write(&self, index: usize, data: &[u8]) -> io::Result<DownloadedSegment> {
        let final_path = self.path_for(index);
        let tmp = temp_path(&final_path);
        let res = write_synced(&tmp, data).and_then(|()| std::fs::rename(&tmp, &final_path));
        if let Err(e) = res {
            let _ = std::fs::remove_file(&tmp);
            return Err(e);
        }
        Ok(DownloadedSegment {
            index,
            path: final_path,
            byte_len: data.len() as u64,
        })
    }
}

fn write_synced(path: &Path, data: &[u8]) -> io::Result<()> {
    let mut f = File::create(path)?;
    f.write_all(data)?;
    f.sync_all()
}
