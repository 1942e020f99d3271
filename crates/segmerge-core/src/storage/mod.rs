//! Segment files on disk.
//!
//! Each segment lives at `{dir}/{index}.ts`; the path is a pure function of the
//! index. Bytes are written to a `.part` sibling first and atomically renamed
//! so a crashed or cancelled write never leaves a truncated `{index}.ts`.

mod writer;

pub use writer::{DownloadedSegment, SegmentStore};

/// Extension of segment files.
pub const SEGMENT_EXT: &str = "ts";

/// Temporary file suffix used before atomic rename.
pub const TEMP_SUFFIX: &str = ".part";

/// File name of segment `index`: decimal, no padding (`0.ts`, `1.ts`, …).
pub fn segment_file_name(index: usize) -> String {
    format!("{}.{}", index, SEGMENT_EXT)
}

/// Path for the temp file: appends `.part` to the final path (e.g. `3.ts` → `3.ts.part`).
pub fn temp_path(final_path: &std::path::Path) -> std::path::PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(TEMP_SUFFIX);
    std::path::PathBuf::from(o)
}
