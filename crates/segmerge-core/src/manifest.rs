//! Concat manifest for the merge step.
//!
//! One line per segment, index ascending: `file '<segments_dir>/<n>.ts'\n`.
//! The path is relative to the directory ffmpeg runs in and is always joined
//! with `/`.

use std::io;
use std::path::Path;

use crate::storage::segment_file_name;

/// Quotes `path` for the concat demuxer: `'` becomes `'\''`.
fn quote(path: &str) -> String {
    format!("'{}'", path.replace('\'', r"'\''"))
}

/// Manifest text for segments `0..segment_count` under `segments_dir`.
pub fn render_manifest(segment_count: usize, segments_dir: &str) -> String {
    let dir = segments_dir.trim_end_matches('/');
    let mut out = String::new();
    for n in 0..segment_count {
        let path = if dir.is_empty() {
            segment_file_name(n)
        } else {
            format!("{}/{}", dir, segment_file_name(n))
        };
        out.push_str("file ");
        out.push_str(&quote(&path));
        out.push('\n');
    }
    out
}

/// Writes (or overwrites) the manifest at `path`.
pub fn write_manifest(path: &Path, segment_count: usize, segments_dir: &str) -> io::Result<()> {
    std::fs::write(path, render_manifest(segment_count, segments_dir))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_format_for_three_segments() {
        assert_eq!(
            render_manifest(3, "video_parts"),
            "file 'video_parts/0.ts'\nfile 'video_parts/1.ts'\nfile 'video_parts/2.ts'\n"
        );
    }

    #[test]
    fn ascending_without_padding() {
        let text = render_manifest(12, "p");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 12);
        assert_eq!(lines[9], "file 'p/9.ts'");
        assert_eq!(lines[10], "file 'p/10.ts'");
        assert_eq!(lines[11], "file 'p/11.ts'");
    }

    #[test]
    fn zero_segments_is_empty() {
        assert_eq!(render_manifest(0, "video_parts"), "");
    }

    #[test]
    fn trailing_slash_and_quotes() {
        assert_eq!(render_manifest(1, "parts/"), "file 'parts/0.ts'\n");
        assert_eq!(render_manifest(1, "it's"), "file 'it'\\''s/0.ts'\n");
    }

    #[test]
    fn write_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ts_files.txt");
        write_manifest(&path, 5, "video_parts").unwrap();
        let first = std::fs::read(&path).unwrap();
        write_manifest(&path, 5, "video_parts").unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), first);

        write_manifest(&path, 2, "video_parts").unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "file 'video_parts/0.ts'\nfile 'video_parts/1.ts'\n"
        );
    }
}
