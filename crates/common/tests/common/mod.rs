//! Shared test utilities for job service integration tests
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use common::prelude::{FsJobRegistry, JobService, ToolInvoker};
use tempfile::TempDir;

/// A stub tool that leaves the tree as it found it
pub const NOOP_TOOL: &str = "echo \"processing $1 in $2\"";

/// A stub tool that "encrypts" by dropping a sidecar next to every file
pub const SIDECAR_TOOL: &str = r#"find "$2" -type f | while read -r f; do echo tag > "$f.lock"; done
echo "done""#;

/// A stub tool that fails after partially touching the tree
pub const FAILING_TOOL: &str = r#"echo "bad key" >&2
exit 1"#;

/// A stub tool that takes long enough for a caller to give up on it
pub const SLOW_TOOL: &str = r#"sleep 1
echo "slow done""#;

/// Write an executable shell script standing in for the external binary
#[cfg(unix)]
pub fn stub_tool(dir: &Path, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("encrypt_decrypt");
    fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// Set up a job service over a fresh jobs root, using `tool_body` as the tool
#[cfg(unix)]
pub fn setup_service(tool_body: &str) -> (JobService<FsJobRegistry>, TempDir) {
    let temp = TempDir::new().unwrap();
    let project = temp.path().join("project");
    fs::create_dir_all(&project).unwrap();

    let tool = ToolInvoker::new(stub_tool(&project, tool_body), project, 2);
    let registry = FsJobRegistry::new(temp.path().join("jobs"));
    (JobService::new(registry, tool), temp)
}

/// Set up a job service whose tool binary does not exist
pub fn setup_service_without_tool() -> (JobService<FsJobRegistry>, TempDir) {
    let temp = TempDir::new().unwrap();
    let tool = ToolInvoker::new(
        temp.path().join("missing").join("encrypt_decrypt"),
        temp.path().to_path_buf(),
        1,
    );
    let registry = FsJobRegistry::new(temp.path().join("jobs"));
    (JobService::new(registry, tool), temp)
}

/// Names of the job directories that exist under the jobs root
pub fn job_dirs(temp: &TempDir) -> Vec<String> {
    match fs::read_dir(temp.path().join("jobs")) {
        Ok(entries) => entries
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect(),
        Err(_) => Vec::new(),
    }
}

/// Poll until some job under the jobs root has a manifest, returning its id
pub async fn wait_for_published(temp: &TempDir, limit: Duration) -> String {
    let deadline = tokio::time::Instant::now() + limit;
    loop {
        let published = job_dirs(temp)
            .into_iter()
            .find(|id| temp.path().join("jobs").join(id).join("manifest.json").is_file());
        if let Some(id) = published {
            return id;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "no job was published within {:?}",
            limit
        );
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
}

/// Entry names of a zip archive, in archive order
pub fn zip_entries(path: &Path) -> Vec<String> {
    let mut archive = zip::ZipArchive::new(fs::File::open(path).unwrap()).unwrap();
    (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect()
}
