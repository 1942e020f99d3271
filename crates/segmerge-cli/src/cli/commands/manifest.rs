//! `segmerge manifest` – print a concat manifest.

use segmerge_core::manifest;

pub fn run_manifest(count: usize, segments_dir: &str) {
    print!("{}", manifest::render_manifest(count, segments_dir));
}
