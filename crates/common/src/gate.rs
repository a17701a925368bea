use std::io;
use std::path::{Component, Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum GateError {
    #[error("no path requested")]
    EmptyPath,
    #[error("path escapes the job sandbox: {0:?}")]
    Escapes(String),
    #[error("no such file: {0:?}")]
    NotFound(String),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Resolve a client requested path against a job's uploads root.
///
/// This check is independent of whatever sanitizing happened at upload
///  time. It runs twice: lexically first, so `..` and absolute paths are
///  rejected even when their target doesn't exist, then on the
///  canonical path, so a symlink can't lead out of the root either.
///  Returns the canonical path of a regular file inside the root.
pub fn resolve_download(uploads_dir: &Path, requested: &str) -> Result<PathBuf, GateError> {
    if requested.trim().is_empty() {
        return Err(GateError::EmptyPath);
    }
    if requested.contains('\0') || !lexically_contained(Path::new(requested)) {
        return Err(GateError::Escapes(requested.to_string()));
    }

    let root = match uploads_dir.canonicalize() {
        Ok(root) => root,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(GateError::NotFound(requested.to_string()))
        }
        Err(e) => return Err(e.into()),
    };

    let target = match root.join(requested).canonicalize() {
        Ok(target) => target,
        Err(e) if is_missing(&e) => return Err(GateError::NotFound(requested.to_string())),
        Err(e) => return Err(e.into()),
    };

    if !target.starts_with(&root) {
        tracing::warn!(requested, "download path resolved outside its job root");
        return Err(GateError::Escapes(requested.to_string()));
    }
    if !target.is_file() {
        return Err(GateError::NotFound(requested.to_string()));
    }

    Ok(target)
}

/// A relative path whose `..` segments never climb above where it starts
fn lexically_contained(path: &Path) -> bool {
    let mut depth: usize = 0;
    for component in path.components() {
        match component {
            Component::Normal(_) => depth += 1,
            Component::CurDir => {}
            Component::ParentDir => match depth.checked_sub(1) {
                Some(d) => depth = d,
                None => return false,
            },
            Component::RootDir | Component::Prefix(_) => return false,
        }
    }
    true
}

// a file standing in for a directory mid-path is just as missing
fn is_missing(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::NotFound | io::ErrorKind::NotADirectory
    )
}
