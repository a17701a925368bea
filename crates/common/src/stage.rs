use std::fs;
use std::path::{Path, PathBuf};

use bytes::Bytes;

use crate::sanitize::{sanitize_relative_path, secure_filename};

/// One uploaded file paired with the path its client claims for it.
///
/// The pairing is explicit: whatever transport delivered the file is
///  responsible for attaching the right hint before it gets here.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Filename as sent by the client, unsanitized
    pub file_name: String,
    /// Relative path from a folder upload, unsanitized
    pub relative_path: Option<String>,
    pub contents: Bytes,
}

impl UploadedFile {
    pub fn new(file_name: impl Into<String>, contents: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            relative_path: None,
            contents: contents.into(),
        }
    }

    pub fn with_relative_path(mut self, relative_path: impl Into<String>) -> Self {
        self.relative_path = Some(relative_path.into());
        self
    }

    /// Where this file lands relative to the uploads root, if anywhere.
    ///
    /// A non-blank hint wins; otherwise the sanitized filename is used.
    ///  `None` means the entry is skipped: either it had no filename at
    ///  all, or nothing usable was left after sanitizing.
    pub fn target_path(&self) -> Option<PathBuf> {
        if self.file_name.is_empty() {
            return None;
        }

        let hinted = self
            .relative_path
            .as_deref()
            .filter(|hint| !hint.trim().is_empty())
            .and_then(sanitize_relative_path);

        hinted.or_else(|| {
            let fallback = secure_filename(&self.file_name);
            (!fallback.is_empty()).then(|| PathBuf::from(fallback))
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StageError {
    #[error("failed to create directory {path:?}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write {path:?}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Write uploads into `uploads_dir`, returning how many were staged.
///
/// Entries without a usable target are skipped and not counted. A file
///  already present at the same path is overwritten.
pub fn stage_uploads<'a, I>(uploads_dir: &Path, files: I) -> Result<usize, StageError>
where
    I: IntoIterator<Item = &'a UploadedFile>,
{
    let mut staged = 0;

    for file in files {
        let Some(rel) = file.target_path() else {
            tracing::debug!(file_name = %file.file_name, "skipping upload with no usable name");
            continue;
        };

        let target = uploads_dir.join(&rel);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|source| StageError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        fs::write(&target, &file.contents).map_err(|source| StageError::Write {
            path: target.clone(),
            source,
        })?;

        tracing::debug!(path = %rel.display(), size = file.contents.len(), "staged upload");
        staged += 1;
    }

    Ok(staged)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_path_prefers_hint() {
        let file = UploadedFile::new("readme.md", "x").with_relative_path("docs/readme.md");
        assert_eq!(file.target_path(), Some(PathBuf::from("docs/readme.md")));
    }

    #[test]
    fn test_target_path_falls_back_to_filename() {
        let blank = UploadedFile::new("notes.txt", "x").with_relative_path("   ");
        assert_eq!(blank.target_path(), Some(PathBuf::from("notes.txt")));

        let hostile = UploadedFile::new("notes.txt", "x").with_relative_path("../..");
        assert_eq!(hostile.target_path(), Some(PathBuf::from("notes.txt")));
    }

    #[test]
    fn test_target_path_skips() {
        assert_eq!(UploadedFile::new("", "x").target_path(), None);
        assert_eq!(
            UploadedFile::new("", "x")
                .with_relative_path("docs/a.txt")
                .target_path(),
            None
        );
        assert_eq!(UploadedFile::new("..", "x").target_path(), None);
    }

    #[test]
    fn test_stage_counts_only_usable_entries() {
        let temp = tempfile::TempDir::new().unwrap();
        let uploads = temp.path().join("uploads");
        fs::create_dir_all(&uploads).unwrap();

        let files = vec![
            UploadedFile::new("a.txt", "aaa"),
            UploadedFile::new("", "ignored"),
            UploadedFile::new("b.bin", "bb").with_relative_path("nested/deeper/b.bin"),
            UploadedFile::new("...", "ignored"),
            UploadedFile::new("", ""),
        ];

        let staged = stage_uploads(&uploads, &files).unwrap();
        assert_eq!(staged, 2);
        assert_eq!(fs::read(uploads.join("a.txt")).unwrap(), b"aaa");
        assert_eq!(
            fs::read(uploads.join("nested/deeper/b.bin")).unwrap(),
            b"bb"
        );
    }

    #[test]
    fn test_stage_overwrites_within_job() {
        let temp = tempfile::TempDir::new().unwrap();
        let uploads = temp.path().to_path_buf();

        let files = vec![
            UploadedFile::new("dup.txt", "first"),
            UploadedFile::new("other", "second").with_relative_path("dup.txt"),
        ];
        assert_eq!(stage_uploads(&uploads, &files).unwrap(), 2);
        assert_eq!(fs::read(uploads.join("dup.txt")).unwrap(), b"second");
    }

    #[test]
    fn test_stage_traversal_lands_inside_root() {
        let temp = tempfile::TempDir::new().unwrap();
        let uploads = temp.path().join("job").join("uploads");
        fs::create_dir_all(&uploads).unwrap();

        let files = vec![UploadedFile::new("passwd", "root:x")
            .with_relative_path("../../../etc/passwd")];
        assert_eq!(stage_uploads(&uploads, &files).unwrap(), 1);
        assert!(uploads.join("etc/passwd").is_file());
        assert!(!temp.path().join("etc").exists());
    }

    #[test]
    fn test_stage_nothing() {
        let temp = tempfile::TempDir::new().unwrap();
        let files: Vec<UploadedFile> = Vec::new();
        assert_eq!(stage_uploads(temp.path(), &files).unwrap(), 0);
    }
}
