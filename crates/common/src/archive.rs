use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

use crate::job::{is_sidecar, Job};
use crate::sanitize::to_posix;

#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("failed to walk {0}")]
    Walk(#[from] walkdir::Error),
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("failed to persist archive: {0}")]
    Persist(#[from] tempfile::PersistError),
}

/// Make sure the job's archive exists, building it on first use.
///
/// Returns the archive path and whether this call built it. The cache
///  is keyed on existence alone and never refreshed. Callers that can
///  race on the same job must hold the job's guard around this.
pub fn ensure_archive(job: &Job) -> Result<(PathBuf, bool), ArchiveError> {
    let archive_path = job.archive_path();
    if archive_path.is_file() {
        return Ok((archive_path, false));
    }

    let entries = build_archive(&job.uploads_dir(), job.root(), &archive_path)?;
    tracing::info!(job_id = %job.id(), entries, "built results archive");
    Ok((archive_path, true))
}

/// Zip everything under `uploads_dir` except sidecars into `archive_path`.
///
/// The tree is first copied into a scratch directory under
///  `scratch_parent`, sidecars are deleted from the copy, and the copy is
///  what gets compressed. Entries are sorted and carry a fixed timestamp,
///  so the same tree always yields the same bytes. The archive is written
///  next to its destination and renamed into place, so a half-written
///  file is never mistaken for a cached one. Returns the entry count.
pub fn build_archive(
    uploads_dir: &Path,
    scratch_parent: &Path,
    archive_path: &Path,
) -> Result<usize, ArchiveError> {
    let stage = tempfile::Builder::new()
        .prefix(".stage-")
        .tempdir_in(scratch_parent)?;

    copy_tree(uploads_dir, stage.path())?;
    prune_sidecars(stage.path())?;

    let dir = archive_path.parent().unwrap_or_else(|| Path::new("."));
    let tmp = tempfile::Builder::new()
        .prefix(".results-")
        .suffix(".zip")
        .tempfile_in(dir)?;

    let entries = write_zip(stage.path(), BufWriter::new(tmp.as_file()))?;
    tmp.persist(archive_path)?;

    Ok(entries)
}

fn copy_tree(from: &Path, to: &Path) -> Result<(), ArchiveError> {
    for entry in WalkDir::new(from).min_depth(1).sort_by_file_name() {
        let entry = entry?;
        let Ok(rel) = entry.path().strip_prefix(from) else {
            continue;
        };
        let target = to.join(rel);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else if entry.file_type().is_file() {
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

fn prune_sidecars(root: &Path) -> Result<(), ArchiveError> {
    let sidecars: Vec<PathBuf> = WalkDir::new(root)
        .min_depth(1)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter(|e| is_sidecar(&e.file_name().to_string_lossy()))
        .map(|e| e.into_path())
        .collect();

    for path in sidecars {
        match fs::remove_file(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

fn write_zip<W: Write + io::Seek>(root: &Path, writer: W) -> Result<usize, ArchiveError> {
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(DateTime::default())
        .unix_permissions(0o644);

    let mut zip = ZipWriter::new(writer);
    let mut entries = 0;

    for entry in WalkDir::new(root).min_depth(1).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(rel) = entry.path().strip_prefix(root) else {
            continue;
        };

        zip.start_file(to_posix(rel), options)?;
        let mut source = File::open(entry.path())?;
        io::copy(&mut source, &mut zip)?;
        entries += 1;
    }

    let mut writer = zip.finish()?;
    writer.flush()?;
    Ok(entries)
}
