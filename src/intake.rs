//! New-record intake from issue-tracker submissions.
//!
//! A submission is a title carrying a kind marker plus a body that is
//! already a complete record. The body is written verbatim under the next
//! free numeric id:
//!
//! ```text
//! [NEW-PREDICTION] ...   →  <posts>/<bucket>/<id>.md
//! [NEW-AUTHOR] ...       →  <authors>/<bucket>/<id>.md
//! ```
//!
//! Ids are allocated as one more than the largest id already present in any
//! bucket directory. See [`crate::naming`] for the bucket layout.

use crate::config::SiteConfig;
use crate::naming::{bucket_for, is_bucket_name, parse_record_id, record_file_name};
use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IntakeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Unrecognized submission title '{0}': expected [NEW-PREDICTION] or [NEW-AUTHOR]")]
    UnrecognizedMarker(String),
}

/// Which record tree a submission belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionKind {
    Prediction,
    Author,
}

impl SubmissionKind {
    pub const PREDICTION_MARKER: &'static str = "[NEW-PREDICTION]";
    pub const AUTHOR_MARKER: &'static str = "[NEW-AUTHOR]";

    /// Detect the kind from a marker anywhere in the title.
    pub fn from_title(title: &str) -> Result<Self, IntakeError> {
        if title.contains(Self::PREDICTION_MARKER) {
            Ok(SubmissionKind::Prediction)
        } else if title.contains(Self::AUTHOR_MARKER) {
            Ok(SubmissionKind::Author)
        } else {
            Err(IntakeError::UnrecognizedMarker(title.to_string()))
        }
    }

    /// Record directory for this kind, relative to the project root.
    pub fn directory<'a>(&self, config: &'a SiteConfig) -> &'a Path {
        match self {
            SubmissionKind::Prediction => config.paths.posts.as_path(),
            SubmissionKind::Author => config.paths.authors.as_path(),
        }
    }
}

/// A record written by [`save_submission`].
#[derive(Debug, Clone, PartialEq)]
pub struct SavedSubmission {
    pub kind: SubmissionKind,
    pub id: u64,
    pub path: PathBuf,
}

/// Next free id under `kind_dir`: the largest `<digits>.<ext>` in any bucket
/// directory plus one. An empty or missing directory starts at 1.
///
/// Files outside bucket directories are not counted.
pub fn next_record_id(kind_dir: &Path, extension: &str) -> Result<u64, IntakeError> {
    if !kind_dir.exists() {
        return Ok(1);
    }

    let mut max_id = 0;
    for bucket in fs::read_dir(kind_dir)? {
        let bucket = bucket?;
        let name = bucket.file_name();
        let is_bucket = name.to_str().is_some_and(is_bucket_name);
        if !is_bucket || !bucket.file_type()?.is_dir() {
            continue;
        }
        for entry in fs::read_dir(bucket.path())? {
            let entry = entry?;
            let file_name = entry.file_name();
            if let Some(id) = file_name.to_str().and_then(|n| parse_record_id(n, extension)) {
                max_id = max_id.max(id);
            }
        }
    }
    Ok(max_id + 1)
}

/// Write `body` verbatim as the next record of the kind named in `title`.
///
/// `root` is the project root; the record directory comes from `config`.
pub fn save_submission(
    root: &Path,
    config: &SiteConfig,
    title: &str,
    body: &str,
) -> Result<SavedSubmission, IntakeError> {
    let kind = SubmissionKind::from_title(title)?;
    let kind_dir = root.join(kind.directory(config));
    let extension = &config.record_extension;

    let id = next_record_id(&kind_dir, extension)?;
    let bucket_dir = kind_dir.join(bucket_for(id).to_string());
    fs::create_dir_all(&bucket_dir)?;
    debug!("Allocated id {} in {}", id, bucket_dir.display());

    let path = bucket_dir.join(record_file_name(id, extension));
    fs::write(&path, body)?;
    info!("Saved {:?} submission to {}", kind, path.display());

    Ok(SavedSubmission { kind, id, path })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn title_markers() {
        assert_eq!(
            SubmissionKind::from_title("[NEW-PREDICTION] rates").unwrap(),
            SubmissionKind::Prediction
        );
        assert_eq!(
            SubmissionKind::from_title("Add: [NEW-AUTHOR]").unwrap(),
            SubmissionKind::Author
        );
    }

    #[test]
    fn unknown_title_is_rejected() {
        let err = SubmissionKind::from_title("New prediction").unwrap_err();
        assert!(matches!(err, IntakeError::UnrecognizedMarker(ref t) if t == "New prediction"));
    }

    #[test]
    fn next_id_in_missing_dir_is_one() {
        let tmp = TempDir::new().unwrap();
        assert_eq!(next_record_id(&tmp.path().join("posts"), "md").unwrap(), 1);
        assert_eq!(next_record_id(tmp.path(), "md").unwrap(), 1);
    }

    #[test]
    fn next_id_scans_all_buckets() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("1000")).unwrap();
        fs::create_dir_all(tmp.path().join("2000")).unwrap();
        fs::write(tmp.path().join("1000/998.md"), "").unwrap();
        fs::write(tmp.path().join("2000/1003.md"), "").unwrap();
        fs::write(tmp.path().join("2000/1005.txt"), "").unwrap();
        fs::write(tmp.path().join("2000/draft.md"), "").unwrap();

        assert_eq!(next_record_id(tmp.path(), "md").unwrap(), 1004);
    }

    #[test]
    fn next_id_ignores_non_bucket_dirs() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("archive")).unwrap();
        fs::create_dir_all(tmp.path().join("1000")).unwrap();
        fs::write(tmp.path().join("archive/5000.md"), "").unwrap();
        fs::write(tmp.path().join("1000/7.md"), "").unwrap();
        fs::write(tmp.path().join("9000.md"), "").unwrap();

        assert_eq!(next_record_id(tmp.path(), "md").unwrap(), 8);
    }

    #[test]
    fn save_places_record_in_bucket() {
        let tmp = TempDir::new().unwrap();
        let config = SiteConfig::default();
        let posts = tmp.path().join("data/posts/1000");
        fs::create_dir_all(&posts).unwrap();
        fs::write(posts.join("999.md"), "### id\n999\n").unwrap();

        let body = "### id\n1000\n### author-id\n1\n";
        let saved = save_submission(tmp.path(), &config, "[NEW-PREDICTION] x", body).unwrap();

        assert_eq!(saved.kind, SubmissionKind::Prediction);
        assert_eq!(saved.id, 1000);
        assert_eq!(saved.path, tmp.path().join("data/posts/2000/1000.md"));
        assert_eq!(fs::read_to_string(&saved.path).unwrap(), body);
    }

    #[test]
    fn save_author_starts_at_one() {
        let tmp = TempDir::new().unwrap();
        let config = SiteConfig::default();
        let saved = save_submission(tmp.path(), &config, "[NEW-AUTHOR]", "### id\n1\n").unwrap();
        assert_eq!(saved.path, tmp.path().join("data/authors/1000/1.md"));
    }

    #[test]
    fn save_rejects_unknown_title_without_writing() {
        let tmp = TempDir::new().unwrap();
        let config = SiteConfig::default();
        let err = save_submission(tmp.path(), &config, "hello", "body").unwrap_err();
        assert!(matches!(err, IntakeError::UnrecognizedMarker(_)));
        assert!(!tmp.path().join("data").exists());
    }
}
