//! Job list: alternating lines of job name and playlist URL.
//!
//! ```text
//! # lectures
//! intro
//! https://media.example.com/intro/index.m3u8
//! chapter-1
//! https://media.example.com/ch1/index.m3u8
//! ```
//!
//! Lines are trimmed; blank lines and `#` comments are ignored. Order is kept.

use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

/// One named download: the output file is named after `name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub name: String,
    pub playlist_url: String,
}

#[derive(Debug, Error)]
pub enum JobListError {
    #[error("cannot read job list {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("line {line}: job `{name}` has no playlist URL")]
    MissingUrl { name: String, line: usize },
    #[error("line {line}: `{url}` is not an http(s) URL")]
    InvalidUrl { url: String, line: usize },
    #[error("line {line}: job name `{name}` is not usable as a file name")]
    InvalidName { name: String, line: usize },
    #[error("line {line}: duplicate job name `{name}`")]
    DuplicateName { name: String, line: usize },
}

fn valid_name(name: &str) -> bool {
    !name.contains(['/', '\\', '\0']) && name != "." && name != ".."
}

fn valid_url(raw: &str) -> bool {
    match url::Url::parse(raw) {
        Ok(u) => matches!(u.scheme(), "http" | "https") && u.has_host(),
        Err(_) => false,
    }
}

/// Parses job list text into ordered jobs.
pub fn parse_job_list(text: &str) -> Result<Vec<Job>, JobListError> {
    let mut entries = text
        .lines()
        .enumerate()
        .map(|(i, l)| (i + 1, l.trim()))
        .filter(|(_, l)| !l.is_empty() && !l.starts_with('#'));

    let mut jobs = Vec::new();
    let mut names = HashSet::new();
    while let Some((name_line, name)) = entries.next() {
        let Some((url_line, url)) = entries.next() else {
            return Err(JobListError::MissingUrl {
                name: name.to_string(),
                line: name_line,
            });
        };
        if !valid_name(name) {
            return Err(JobListError::InvalidName {
                name: name.to_string(),
                line: name_line,
            });
        }
        if !valid_url(url) {
            return Err(JobListError::InvalidUrl {
                url: url.to_string(),
                line: url_line,
            });
        }
        if !names.insert(name.to_string()) {
            return Err(JobListError::DuplicateName {
                name: name.to_string(),
                line: name_line,
            });
        }
        jobs.push(Job {
            name: name.to_string(),
            playlist_url: url.to_string(),
        });
    }
    Ok(jobs)
}

/// Reads and parses a job list file.
pub fn load_job_list(path: &Path) -> Result<Vec<Job>, JobListError> {
    let text = std::fs::read_to_string(path).map_err(|source| JobListError::Read {
        path: path.display().to_string(),
        source,
    })?;
    parse_job_list(&text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pairs_in_order() {
        let jobs = parse_job_list(
            "intro\nhttps://media.example.com/intro/index.m3u8\n\n# next\nchapter-1\n  https://media.example.com/ch1/index.m3u8  \n",
        )
        .unwrap();
        assert_eq!(
            jobs,
            vec![
                Job {
                    name: "intro".into(),
                    playlist_url: "https://media.example.com/intro/index.m3u8".into(),
                },
                Job {
                    name: "chapter-1".into(),
                    playlist_url: "https://media.example.com/ch1/index.m3u8".into(),
                },
            ]
        );
    }

    #[test]
    fn empty_list_has_no_jobs() {
        assert!(parse_job_list("").unwrap().is_empty());
        assert!(parse_job_list("# nothing yet\n\n").unwrap().is_empty());
    }

    #[test]
    fn dangling_name_is_rejected() {
        let err = parse_job_list("a\nhttps://x.example/a.m3u8\nb\n").unwrap_err();
        assert!(matches!(err, JobListError::MissingUrl { ref name, line: 3 } if name == "b"));
    }

    #[test]
    fn url_must_be_http() {
        let err = parse_job_list("a\nnot a url\n").unwrap_err();
        assert!(matches!(err, JobListError::InvalidUrl { line: 2, .. }));
        let err = parse_job_list("a\nftp://x.example/a.m3u8\n").unwrap_err();
        assert!(matches!(err, JobListError::InvalidUrl { .. }));
        assert!(parse_job_list("a\nhttp://127.0.0.1:8080/a.m3u8\n").is_ok());
    }

    #[test]
    fn names_must_be_unique_and_path_free() {
        let err = parse_job_list("a\nhttps://x.example/1\na\nhttps://x.example/2\n").unwrap_err();
        assert!(matches!(err, JobListError::DuplicateName { line: 3, .. }));
        let err = parse_job_list("../a\nhttps://x.example/1\n").unwrap_err();
        assert!(matches!(err, JobListError::InvalidName { .. }));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("video_urls.txt");
        std::fs::write(&path, "clip\nhttps://x.example/clip/index.m3u8\n").unwrap();
        let jobs = load_job_list(&path).unwrap();
        assert_eq!(jobs.len(), 1);
        assert!(load_job_list(&dir.path().join("missing.txt")).is_err());
    }
}
