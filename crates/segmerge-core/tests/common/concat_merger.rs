//! Stand-in for ffmpeg: reads the concat manifest and appends the listed
//! files into the output, recording every manifest it was given.

use std::path::Path;
use std::sync::Mutex;

use segmerge_core::merge::{MergeError, Merger};

#[derive(Default)]
pub struct ConcatMerger {
    pub manifests: Mutex<Vec<String>>,
}

impl ConcatMerger {
    pub fn manifests(&self) -> Vec<String> {
        self.manifests.lock().unwrap().clone()
    }
}

fn io_err(e: std::io::Error) -> MergeError {
    MergeError::Spawn {
        program: "concat-merger".into(),
        source: e,
    }
}

impl Merger for ConcatMerger {
    fn merge(&self, work_dir: &Path, manifest: &Path, output: &Path) -> Result<(), MergeError> {
        let text = std::fs::read_to_string(work_dir.join(manifest)).map_err(io_err)?;
        let mut joined = Vec::new();
        for line in text.lines() {
            let rel = line
                .strip_prefix("file '")
                .and_then(|l| l.strip_suffix('\''))
                .expect("manifest line format");
            joined.extend(std::fs::read(work_dir.join(rel)).map_err(io_err)?);
        }
        std::fs::write(work_dir.join(output), joined).map_err(io_err)?;
        self.manifests.lock().unwrap().push(text);
        Ok(())
    }
}
