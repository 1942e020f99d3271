//! Playlist resolution: raw playlist text + its source URL → ordered segment URLs.
//!
//! Relative references are resolved by plain string concatenation onto the
//! playlist's "directory" (everything before the last `/`), which is what
//! generated playlists use in practice. `..`, query strings on the base and
//! protocol-relative forms are not handled.

use thiserror::Error;

const RELATIVE_PREFIX: char = '.';
const ABSOLUTE_PREFIX: &str = "https://";
const UTF8_BOM: char = '\u{feff}';

/// One segment reference, in playback order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentRef {
    /// Dense 0-based position among the playlist's segment lines.
    pub index: usize,
    /// Absolute download URL.
    pub url: String,
}

/// Classification of a single playlist line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentLine {
    /// The line references a segment at this absolute URL.
    Absolute(String),
    /// Not a segment reference (directive, comment, blank, unsupported form).
    Skip,
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("playlist is not valid UTF-8 text (byte {valid_up_to})")]
    NotUtf8 { valid_up_to: usize },
}

/// Decodes a fetched playlist body. A leading byte-order mark is dropped.
pub fn decode_playlist(bytes: Vec<u8>) -> Result<String, ResolveError> {
    let text = String::from_utf8(bytes).map_err(|e| ResolveError::NotUtf8 {
        valid_up_to: e.utf8_error().valid_up_to(),
    })?;
    match text.strip_prefix(UTF8_BOM) {
        Some(rest) => Ok(rest.to_string()),
        None => Ok(text),
    }
}

/// Portion of `url` before its final `/`; empty if there is none.
pub fn base_directory(url: &str) -> &str {
    match url.rfind('/') {
        Some(pos) => &url[..pos],
        None => "",
    }
}

/// Classifies one line against an already computed base directory.
pub fn classify_line(line: &str, base_dir: &str) -> SegmentLine {
    let line = line.trim_end();
    if line.is_empty() {
        return SegmentLine::Skip;
    }
    if let Some(rest) = line.strip_prefix(RELATIVE_PREFIX) {
        return SegmentLine::Absolute(format!("{}{}", base_dir, rest));
    }
    if line.starts_with(ABSOLUTE_PREFIX) {
        return SegmentLine::Absolute(line.to_string());
    }
    SegmentLine::Skip
}

/// Resolves every segment line of `playlist` against `base_url`, in order.
/// Indices count surviving lines only, so they are always `0..len`.
pub fn resolve(playlist: &str, base_url: &str) -> Vec<SegmentRef> {
    let base_dir = base_directory(base_url);
    playlist
        .split('\n')
        .filter_map(|line| match classify_line(line, base_dir) {
            SegmentLine::Absolute(url) => Some(url),
            SegmentLine::Skip => None,
        })
        .enumerate()
        .map(|(index, url)| SegmentRef { index, url })
        .collect()
}
