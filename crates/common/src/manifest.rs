use std::fs;
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use crate::job::{is_sidecar, Action};
use crate::sanitize::to_posix;
use crate::tool::ToolOutcome;

/// A processed output file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// Forward-slash path relative to the uploads root
    pub path: String,
    /// Size in bytes when the manifest was built
    pub size: u64,
}

/// The result listing of a job.
///
/// Once persisted, a job exists as far as every reader is concerned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub action: Action,
    pub files: Vec<ManifestEntry>,
    /// How the tool run ended. Absent in manifests written before a
    ///  tool ran (or by older versions).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool: Option<ToolOutcome>,
}

#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed manifest: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to persist manifest: {0}")]
    Persist(#[from] tempfile::PersistError),
}

impl Manifest {
    /// Walk `uploads_dir` and list every regular file that is not a sidecar.
    ///
    /// Symlinks are neither followed nor listed. Entries that vanish
    ///  mid-walk are skipped, and a size that can't be read is recorded
    ///  as 0 rather than failing the whole listing.
    pub fn build(uploads_dir: &Path, action: Action) -> Self {
        let mut files = Vec::new();

        for entry in WalkDir::new(uploads_dir).min_depth(1).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("skipping unreadable entry while building manifest: {}", e);
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }

            let Ok(rel) = entry.path().strip_prefix(uploads_dir) else {
                continue;
            };
            let path = to_posix(rel);
            if is_sidecar(&path) {
                continue;
            }

            let size = size_or_zero(entry.path(), entry.metadata());
            files.push(ManifestEntry { path, size });
        }

        Self {
            action,
            files,
            tool: None,
        }
    }

    pub fn with_tool_outcome(mut self, outcome: ToolOutcome) -> Self {
        self.tool = Some(outcome);
        self
    }

    pub fn total_size(&self) -> u64 {
        self.files.iter().map(|f| f.size).sum()
    }

    /// Read a manifest, `None` if there is none at `path`
    pub fn load(path: &Path) -> Result<Option<Self>, ManifestError> {
        match fs::read(path) {
            Ok(data) => Ok(Some(serde_json::from_slice(&data)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Persist to `path`, replacing whatever was there in one rename
    pub fn save(&self, path: &Path) -> Result<(), ManifestError> {
        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        let mut tmp = tempfile::Builder::new()
            .prefix(".manifest-")
            .suffix(".json")
            .tempfile_in(dir)?;
        serde_json::to_writer(&mut tmp, self)?;
        tmp.flush()?;
        tmp.persist(path)?;
        Ok(())
    }
}

/// Size from a metadata lookup, 0 when the lookup failed
fn size_or_zero<E: std::fmt::Display>(path: &Path, metadata: Result<fs::Metadata, E>) -> u64 {
    match metadata {
        Ok(metadata) => metadata.len(),
        Err(e) => {
            tracing::warn!(path = %path.display(), "could not read file size: {}", e);
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(root: &Path, rel: &str, data: &[u8]) {
        let p = root.join(rel);
        fs::create_dir_all(p.parent().unwrap()).unwrap();
        fs::write(p, data).unwrap();
    }

    #[test]
    fn test_build_filters_sidecars() {
        let temp = tempfile::TempDir::new().unwrap();
        let root = temp.path();
        write(root, "a.txt", b"hello");
        write(root, "b/c.bin", b"0123456789");
        write(root, "b/c.bin.lock", b"tag");

        let manifest = Manifest::build(root, Action::Encrypt);
        assert_eq!(
            manifest.files,
            vec![
                ManifestEntry {
                    path: "a.txt".into(),
                    size: 5
                },
                ManifestEntry {
                    path: "b/c.bin".into(),
                    size: 10
                },
            ]
        );
        assert_eq!(manifest.total_size(), 15);
        assert_eq!(manifest.action, Action::Encrypt);
    }

    #[test]
    fn test_unreadable_size_is_recorded_as_zero() {
        let temp = tempfile::TempDir::new().unwrap();
        write(temp.path(), "kept.txt", b"1234");
        let gone = temp.path().join("gone.txt");

        assert_eq!(size_or_zero(&gone, fs::metadata(&gone)), 0);
        let kept = temp.path().join("kept.txt");
        assert_eq!(size_or_zero(&kept, fs::metadata(&kept)), 4);
    }

    #[test]
    fn test_build_empty_and_missing_roots() {
        let temp = tempfile::TempDir::new().unwrap();
        assert!(Manifest::build(temp.path(), Action::Decrypt).files.is_empty());
        assert!(Manifest::build(&temp.path().join("nope"), Action::Decrypt)
            .files
            .is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_build_ignores_symlinks() {
        let temp = tempfile::TempDir::new().unwrap();
        let root = temp.path().join("uploads");
        write(&root, "real.txt", b"r");
        write(temp.path(), "outside.txt", b"secret");
        std::os::unix::fs::symlink(temp.path().join("outside.txt"), root.join("link.txt"))
            .unwrap();

        let manifest = Manifest::build(&root, Action::Encrypt);
        let paths: Vec<_> = manifest.files.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, vec!["real.txt"]);
    }

    #[test]
    fn test_save_and_load() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("manifest.json");
        assert!(Manifest::load(&path).unwrap().is_none());

        let manifest = Manifest {
            action: Action::Decrypt,
            files: vec![ManifestEntry {
                path: "x/y".into(),
                size: 3,
            }],
            tool: Some(ToolOutcome {
                exit_code: Some(2),
                success: false,
            }),
        };
        manifest.save(&path).unwrap();
        assert_eq!(Manifest::load(&path).unwrap(), Some(manifest.clone()));

        // overwrite in place
        let replaced = Manifest::build(temp.path().join("empty").as_path(), Action::Encrypt);
        replaced.save(&path).unwrap();
        assert_eq!(Manifest::load(&path).unwrap(), Some(replaced));
    }

    #[test]
    fn test_load_without_tool_field() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("manifest.json");
        fs::write(
            &path,
            r#"{"action":"encrypt","files":[{"path":"notes.txt","size":12}]}"#,
        )
        .unwrap();
        let manifest = Manifest::load(&path).unwrap().unwrap();
        assert_eq!(manifest.tool, None);
        assert_eq!(manifest.files[0].size, 12);
    }
}
